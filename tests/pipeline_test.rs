use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cv_tailor::browser::BrowserSession;
use cv_tailor::config::Config;
use cv_tailor::error::AppResult;
use cv_tailor::models::{
    parse_cv, Cv, JobDescription, PageDimensions, PageMeasurement, ResponseId, ScoredAchievement,
    ScoredStackItem, TailoredFragment, TailoredProfile, TailoredTitles, TailoredWorkExperience,
};
use cv_tailor::services::{
    ChromeMeasurer, CvTailor, HtmlRenderer, MarkupRenderer, PageMeasurer,
};
use cv_tailor::workflow::{
    fit_to_page, merge, PageFitOutcome, PipelineOutcome, Presenter, ReviewDecision, Reviewer,
    Section, TailoringPipeline,
};

const CV_YAML: &str = r#"
name: Jane Doe
titles: [Software Engineer, Team Lead]
contacts:
  - type: email
    value: jane@example.com
  - type: github
    value: janedoe
location: London
profile: Engineer with a decade of backend experience.
work:
  - company: Acme
    position: Senior Engineer
    location: Remote
    start: 2021
    end: Present
    achievements: [Old A1, Old A2, Old A3]
    stack: [Go]
  - company: Beta
    position: Engineer
    start: 2017
    end: 2021
    achievements: [Old B1, Old B2]
education:
  - title: BSc Computer Science
    school: Uni
    end: 2016
"#;

fn jd() -> JobDescription {
    serde_json::from_value(serde_json::json!({
        "structured": {
            "jobTitle": "Rust Engineer",
            "jobDescription": "Build distributed systems in Rust",
            "techStack": ["Rust", "Tokio", "Postgres"],
            "keyRequirements": ["5+ years backend"],
            "keySkills": ["Rust"],
            "industryContext": "Life sciences",
            "companyName": "Causaly",
            "companyCountry": "UK",
            "officeCountry": "UK",
            "location": "London",
            "language": "EN_UK",
            "atsKeywords": ["Rust", "distributed systems"],
            "atsType": "ashby"
        },
        "raw": "Rust Engineer at Causaly",
        "createdAt": "2025-01-02T03:04:05.000Z"
    }))
    .unwrap()
}

/// 每条工作经历返回 5 条带分数的成就
#[derive(Default)]
struct FakeTailor {
    work_calls: AtomicUsize,
}

#[async_trait]
impl CvTailor for FakeTailor {
    async fn seed(&self, _jd: &JobDescription) -> AppResult<ResponseId> {
        Ok(ResponseId::new("chatcmpl-seed"))
    }

    async fn tailor_titles(
        &self,
        _previous: &ResponseId,
        _cv: &Cv,
        _jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredTitles>> {
        let titles = match feedback {
            Some(_) => vec!["Rust Engineer".to_string(), "Backend Lead".to_string()],
            None => vec!["Rust Developer".to_string()],
        };
        Ok(TailoredFragment::new(
            ResponseId::new("chatcmpl-titles"),
            TailoredTitles {
                original_match_score_pct: 35.0,
                optimised_match_score_pct: 85.0,
                optimised_titles: titles,
                gaps: vec!["No Postgres".to_string()],
                suggestions: vec![],
            },
        ))
    }

    async fn tailor_profile(
        &self,
        _previous: &ResponseId,
        _cv: &Cv,
        _jd: &JobDescription,
        _feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredProfile>> {
        Ok(TailoredFragment::new(
            ResponseId::new("chatcmpl-profile"),
            TailoredProfile {
                original_match_score_pct: 40.0,
                optimised_match_score_pct: 88.0,
                optimised_profile: "Rust engineer building distributed systems.".to_string(),
                gaps: vec![],
                suggestions: vec![],
                ats_perfect_match: "Rust distributed systems engineer".to_string(),
            },
        ))
    }

    async fn tailor_work_entry(
        &self,
        _previous: &ResponseId,
        _cv: &Cv,
        entry_index: usize,
        _jd: &JobDescription,
        _feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredWorkExperience>> {
        self.work_calls.fetch_add(1, Ordering::SeqCst);
        let scores = [30.0, 90.0, 50.0, 70.0, 10.0];
        Ok(TailoredFragment::new(
            ResponseId::new(format!("chatcmpl-work-{}", entry_index)),
            TailoredWorkExperience {
                original_match_score_pct: 30.0,
                optimised_match_score_pct: 80.0,
                optimised_achievements: scores
                    .iter()
                    .map(|score| ScoredAchievement {
                        match_score_pct: *score,
                        optimised_achievement: format!("E{} scored {}", entry_index, score),
                    })
                    .collect(),
                optimised_stack: vec![
                    ScoredStackItem {
                        match_score_pct: 60.0,
                        optimised_stack: "Tokio".to_string(),
                    },
                    ScoredStackItem {
                        match_score_pct: 95.0,
                        optimised_stack: "Rust".to_string(),
                    },
                ],
            },
        ))
    }
}

#[derive(Default)]
struct CountingPresenter {
    presented: AtomicUsize,
}

impl Presenter for CountingPresenter {
    fn present_titles(&self, _cv: &Cv, _fragment: &TailoredFragment<TailoredTitles>) {
        self.presented.fetch_add(1, Ordering::SeqCst);
    }

    fn present_profile(&self, _cv: &Cv, _fragment: &TailoredFragment<TailoredProfile>) {
        self.presented.fetch_add(1, Ordering::SeqCst);
    }

    fn present_work(&self, _cv: &Cv, _fragments: &[TailoredFragment<TailoredWorkExperience>]) {
        self.presented.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedReviewer(Mutex<VecDeque<ReviewDecision>>);

impl ScriptedReviewer {
    fn new(decisions: Vec<ReviewDecision>) -> Self {
        Self(Mutex::new(decisions.into()))
    }
}

#[async_trait]
impl Reviewer for ScriptedReviewer {
    async fn review(&self, _section: &str) -> AppResult<ReviewDecision> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ReviewDecision::Accept))
    }
}

/// 列表项超过上限即视为超出一页
struct ListItemMeasurer {
    max_items: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl PageMeasurer for ListItemMeasurer {
    async fn measure(&self, markup: &str) -> AppResult<PageMeasurement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = markup.matches("<li>").count();
        let height = if items > self.max_items { 1400.0 } else { 900.0 };
        Ok(PageMeasurement::measure(height, &PageDimensions::A4))
    }
}

#[tokio::test]
async fn test_tailor_merge_and_fit() {
    let cv = parse_cv(CV_YAML, "cv.yaml").unwrap();
    let tailor = FakeTailor::default();
    let presenter = CountingPresenter::default();
    let reviewer = ScriptedReviewer::new(vec![
        ReviewDecision::Feedback(vec!["Mention backend leadership".to_string()]),
        ReviewDecision::Accept,
        ReviewDecision::Accept,
        ReviewDecision::Accept,
    ]);

    let outcome = TailoringPipeline::new(&tailor, &presenter, &reviewer, false)
        .run(&cv, &jd())
        .await
        .unwrap();
    let PipelineOutcome::Completed(tailored) = outcome else {
        panic!("pipeline should complete");
    };
    assert_eq!(presenter.presented.load(Ordering::SeqCst), 4);
    assert_eq!(tailor.work_calls.load(Ordering::SeqCst), 2);

    let merged = merge(&cv, &tailored);
    assert_eq!(merged.titles, vec!["Rust Engineer", "Backend Lead"]);
    assert_eq!(merged.work[0].achievements[0], "E0 scored 90");
    assert_eq!(merged.work[0].achievements[4], "E0 scored 10");
    assert_eq!(
        merged.work[1].stack,
        Some(vec!["Rust".to_string(), "Tokio".to_string()])
    );
    assert_eq!(merged.education, cv.education);

    // 10 条成就 + 1 条教育经历，上限 7 条：第二条经历先收缩到 2，再收缩第一条
    let measurer = ListItemMeasurer {
        max_items: 7,
        calls: AtomicUsize::new(0),
    };
    let fitted = fit_to_page(&merged, &HtmlRenderer::default(), &measurer, false)
        .await
        .unwrap();

    let PageFitOutcome::Fits(page) = fitted else {
        panic!("expected the CV to fit");
    };
    assert_eq!(page.attempt, 4);
    assert_eq!(measurer.calls.load(Ordering::SeqCst), 5);
    assert_eq!(page.document.work[0].achievements.len(), 4);
    assert_eq!(page.document.work[1].achievements.len(), 2);
    assert_eq!(
        page.document.work[1].achievements,
        vec!["E1 scored 90", "E1 scored 70"]
    );
    assert!(!page.measurement.exceeds_one_page);
}

#[tokio::test]
async fn test_rejected_profile_abandons_pipeline() {
    let cv = parse_cv(CV_YAML, "cv.yaml").unwrap();
    let tailor = FakeTailor::default();
    let presenter = CountingPresenter::default();
    let reviewer = ScriptedReviewer::new(vec![ReviewDecision::Accept, ReviewDecision::Reject]);

    let outcome = TailoringPipeline::new(&tailor, &presenter, &reviewer, false)
        .run(&cv, &jd())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PipelineOutcome::Abandoned {
            section: Section::Profile
        }
    );
    assert_eq!(tailor.work_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_generate_only_render_is_unchanged() {
    let cv = parse_cv(CV_YAML, "cv.yaml").unwrap();
    let measurer = ListItemMeasurer {
        max_items: 100,
        calls: AtomicUsize::new(0),
    };

    let fitted =
        tokio_test::block_on(fit_to_page(&cv, &HtmlRenderer::default(), &measurer, false)).unwrap();

    assert_eq!(fitted.page().attempt, 0);
    assert_eq!(fitted.page().document, cv);
    assert!(fitted.page().markup.contains("Engineer with a decade of backend experience."));
}

#[tokio::test]
#[ignore] // 需要本地 Chromium：cargo test -- --ignored
async fn test_chrome_measures_rendered_cv() {
    let config = Config::default();
    let session = BrowserSession::acquire(&config, true)
        .await
        .expect("启动浏览器失败");

    let cv = parse_cv(CV_YAML, "cv.yaml").unwrap();
    let markup = HtmlRenderer::default().render(&cv).unwrap();
    let measurer = ChromeMeasurer::new(&session, PageDimensions::A4);
    let measurement = measurer.measure(&markup).await;
    session.shutdown().await;

    let measurement = measurement.expect("测量失败");
    assert!(measurement.content_height > 0.0);
    assert!(!measurement.exceeds_one_page, "短简历应当放得下一页");
}
