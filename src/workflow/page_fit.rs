//! 页面适配循环 - 流程层
//!
//! 每次尝试：收缩当前文档 → 渲染 → 测量；放得下即停止，
//! 允许多页时第一次超出就接受，否则直到尝试次数用尽

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{Cv, PageMeasurement};
use crate::services::{MarkupRenderer, PageMeasurer};
use crate::workflow::shrink::{shrink, MAX_SHRINK_ATTEMPTS};

/// 某次尝试的产物
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPage {
    pub document: Cv,
    pub markup: String,
    pub measurement: PageMeasurement,
    /// 从 0 开始
    pub attempt: usize,
}

/// 适配结果
#[derive(Debug, Clone, PartialEq)]
pub enum PageFitOutcome {
    /// 放进了一页
    Fits(FittedPage),
    /// 超出一页，但调用方允许多页
    AcceptedOverflow(FittedPage),
    /// 尝试次数用尽仍超出一页；携带最后一次尝试
    Failed(FittedPage),
}

impl PageFitOutcome {
    pub fn page(&self) -> &FittedPage {
        match self {
            PageFitOutcome::Fits(page)
            | PageFitOutcome::AcceptedOverflow(page)
            | PageFitOutcome::Failed(page) => page,
        }
    }
}

/// 运行页面适配循环
///
/// # 参数
/// - `cv`: 合并后的文档
/// - `renderer`: 渲染能力
/// - `measurer`: 测量能力（每次测量自行获取并释放页面）
/// - `allow_multipage`: 是否接受超出一页
pub async fn fit_to_page(
    cv: &Cv,
    renderer: &dyn MarkupRenderer,
    measurer: &dyn PageMeasurer,
    allow_multipage: bool,
) -> AppResult<PageFitOutcome> {
    let mut current = cv.clone();
    let mut attempt = 0;

    loop {
        current = shrink(&current, attempt)?;
        let markup = renderer.render(&current)?;
        let measurement = measurer.measure(&markup).await?;
        let exceeds = measurement.exceeds_one_page;
        let page = FittedPage {
            document: current.clone(),
            markup,
            measurement,
            attempt,
        };

        if !exceeds {
            info!("✓ 第 {} 次尝试放进了一页", attempt);
            return Ok(PageFitOutcome::Fits(page));
        }

        if allow_multipage {
            warn!(
                "⚠️ 内容超出一页 ({} 页)，已允许多页输出",
                page.measurement.page_count
            );
            return Ok(PageFitOutcome::AcceptedOverflow(page));
        }

        attempt += 1;
        if attempt >= MAX_SHRINK_ATTEMPTS {
            warn!("❌ {} 次尝试后仍超出一页", MAX_SHRINK_ATTEMPTS);
            return Ok(PageFitOutcome::Failed(page));
        }

        info!(
            "内容超出一页 ({:.0}px / {:.0}px)，开始第 {} 次收缩",
            page.measurement.content_height, page.measurement.usable_height, attempt
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// 把成就数量当作标记输出
    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
    }

    impl MarkupRenderer for CountingRenderer {
        fn render(&self, cv: &Cv) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(cv.achievement_count().to_string())
        }
    }

    /// 按脚本返回是否超出
    struct ScriptedMeasurer {
        overflow: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl PageMeasurer for ScriptedMeasurer {
        async fn measure(&self, _markup: &str) -> AppResult<PageMeasurement> {
            let mut overflow = self.overflow.lock().unwrap();
            let exceeds = if overflow.is_empty() {
                true
            } else {
                overflow.remove(0)
            };
            Ok(PageMeasurement::from_heights(if exceeds { 1500.0 } else { 900.0 }, 1000.0))
        }
    }

    /// 成就数量超过阈值即超出
    struct ThresholdMeasurer {
        max_achievements: usize,
    }

    #[async_trait]
    impl PageMeasurer for ThresholdMeasurer {
        async fn measure(&self, markup: &str) -> AppResult<PageMeasurement> {
            let count: usize = markup.parse().unwrap();
            let height = if count > self.max_achievements { 1200.0 } else { 800.0 };
            Ok(PageMeasurement::from_heights(height, 1000.0))
        }
    }

    fn cv_with(counts: &[usize]) -> Cv {
        let work: Vec<serde_json::Value> = counts
            .iter()
            .map(|n| {
                serde_json::json!({
                    "company": "Acme",
                    "position": "Engineer",
                    "start": 2020,
                    "end": 2021,
                    "achievements": (0..*n).map(|a| format!("a{}", a)).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "name": "Jane",
            "titles": [],
            "contacts": [],
            "location": "London",
            "profile": "Profile",
            "work": work,
            "education": [],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fits_after_three_overflows() {
        let cv = cv_with(&[6, 5]);
        let renderer = CountingRenderer::default();
        let measurer = ScriptedMeasurer {
            overflow: Mutex::new(vec![true, true, true, false]),
        };

        let outcome = fit_to_page(&cv, &renderer, &measurer, false).await.unwrap();

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 4);
        let PageFitOutcome::Fits(page) = outcome else {
            panic!("expected Fits");
        };
        assert_eq!(page.attempt, 3);
        // 第 1-3 次都收缩第二条经历
        let mut expected = cv.clone();
        for attempt in 0..=3 {
            expected = shrink(&expected, attempt).unwrap();
        }
        assert_eq!(page.document, expected);
        assert_eq!(page.document.work[1].achievements.len(), 2);
    }

    #[tokio::test]
    async fn test_single_entry_shrinks_to_two_achievements() {
        let cv = cv_with(&[5]);
        let renderer = CountingRenderer::default();
        let measurer = ThresholdMeasurer { max_achievements: 2 };

        let outcome = fit_to_page(&cv, &renderer, &measurer, false).await.unwrap();

        let PageFitOutcome::Fits(page) = outcome else {
            panic!("expected Fits");
        };
        assert_eq!(page.attempt, 3);
        assert_eq!(page.document.work[0].achievements, vec!["a0", "a1"]);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_multipage_accepts_first_overflow() {
        let cv = cv_with(&[5]);
        let renderer = CountingRenderer::default();
        let measurer = ScriptedMeasurer {
            overflow: Mutex::new(vec![true]),
        };

        let outcome = fit_to_page(&cv, &renderer, &measurer, true).await.unwrap();

        let PageFitOutcome::AcceptedOverflow(page) = outcome else {
            panic!("expected AcceptedOverflow");
        };
        assert_eq!(page.attempt, 0);
        assert_eq!(page.document, cv);
        assert_eq!(page.measurement.page_count, 2);
    }

    #[tokio::test]
    async fn test_fails_when_budget_exhausted() {
        let cv = cv_with(&[5, 5]);
        let renderer = CountingRenderer::default();
        let measurer = ScriptedMeasurer {
            overflow: Mutex::new(vec![]),
        };

        let outcome = fit_to_page(&cv, &renderer, &measurer, false).await.unwrap();

        assert_eq!(renderer.calls.load(Ordering::SeqCst), MAX_SHRINK_ATTEMPTS);
        let PageFitOutcome::Failed(page) = outcome else {
            panic!("expected Failed");
        };
        assert_eq!(page.attempt, MAX_SHRINK_ATTEMPTS - 1);
        assert_eq!(page.document.achievement_count(), 4);
    }
}
