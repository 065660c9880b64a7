//! 应用主流程 - 编排层
//!
//! ## 核心功能
//!
//! 1. **加载简历**：YAML → 校验 → `Cv`
//! 2. **职位描述**：`--jd` 文件 / `--jd-url` 抓取 / 交互输入，抽取后写入审计文件
//! 3. **裁剪**：运行裁剪流水线，写入 `optimised-cv-*.json`
//! 4. **合并**：裁剪结果合并回简历，写入 `<out>.yaml`
//! 5. **导出**：页面适配循环 → `<out>.pdf`
//!
//! 浏览器只在需要时获取，并在每条退出路径上释放

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{AppResult, ConfigError, PageFitError};
use crate::models::{load_cv, load_job_description, Cv, JobDescription, PageDimensions};
use crate::orchestrator::console::{prompt_job_source, ConsolePresenter, ConsoleReviewer, JdSource};
use crate::services::{
    scrape_url, ChromeMeasurer, HtmlRenderer, JdExtractor, OutputFormat, OutputWriter,
    TailorService,
};
use crate::utils::logging::{self, log_stage_start, print_final_summary};
use crate::utils::spinner;
use crate::workflow::{
    fit_to_page, merge, PageFitOutcome, PipelineOutcome, Section, TailoringPipeline,
    MAX_SHRINK_ATTEMPTS,
};

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 已导出 PDF
    Exported {
        pdf: PathBuf,
        /// 最终采用的收缩次数
        attempt: usize,
        /// 是否在允许多页的情况下超出一页
        overflow: bool,
    },
    /// 评审者放弃，没有导出任何内容
    Abandoned { section: Section },
}

/// 应用主结构
pub struct App {
    config: Config,
    cli: Cli,
    writer: OutputWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, cli: Cli) -> AppResult<Self> {
        logging::init(&config)?;
        logging::log_startup(&config);

        let mut writer = OutputWriter::new(config.tmp_path());
        if let Some(out) = &cli.out {
            writer = writer.with_out_dir(split_out_path(out).0);
        }
        Ok(Self {
            config,
            cli,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunOutcome> {
        log_stage_start("加载简历");
        let cv = load_cv(&self.cli.cv).await?;
        info!(
            "✓ 已加载简历: {} ({} 条工作经历, {} 条成就)",
            cv.name,
            cv.work.len(),
            cv.achievement_count()
        );

        let jd = self.job_description().await?;

        let document = if self.cli.generate_only {
            info!("⏭️ --generate-only: 跳过裁剪");
            cv.clone()
        } else {
            let jd = jd.as_ref().ok_or(ConfigError::MissingJobDescription)?;
            match self.tailor(&cv, jd).await? {
                PipelineOutcome::Completed(tailored) => merge(&cv, &tailored),
                PipelineOutcome::Abandoned { section } => {
                    warn!("❌ {} 阶段被放弃，不导出", section);
                    return Ok(RunOutcome::Abandoned { section });
                }
            }
        };

        let out_name = self.out_name(&cv, jd.as_ref());
        let yaml = self
            .writer
            .write(&out_name, OutputFormat::Yaml, &document, false)
            .await?;
        info!("✓ 简历已写入: {}", yaml.display());

        log_stage_start("导出 PDF");
        let session = BrowserSession::acquire(&self.config, true).await?;
        let result = self.export(&session, &document, &out_name).await;
        session.shutdown().await;
        result
    }

    /// 获取职位描述
    ///
    /// `--generate-only` 且没有 `--jd` 时返回 `None`，不抓取也不询问
    async fn job_description(&self) -> AppResult<Option<JobDescription>> {
        if let Some(path) = &self.cli.jd {
            let jd = load_job_description(path).await?;
            info!("✓ 已加载职位描述: {}", jd.slug());
            return Ok(Some(jd));
        }
        if self.cli.generate_only {
            return Ok(None);
        }

        self.config.require_api_key()?;
        log_stage_start("获取职位描述");
        let raw = match &self.cli.jd_url {
            Some(url) => self.scrape(url).await?,
            None => match prompt_job_source().await? {
                JdSource::Url(url) => self.scrape(&url).await?,
                JdSource::Text(text) => text,
            },
        };
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingJobDescription.into());
        }

        let sp = spinner("Extracting job description");
        let extracted = JdExtractor::new(&self.config).extract(&raw).await;
        sp.finish_and_clear();
        let jd = extracted?;

        let path = self
            .writer
            .write(&format!("jd-{}", jd.slug()), OutputFormat::Json, &jd, true)
            .await?;
        info!("📁 职位描述已保存: {}", path.display());
        Ok(Some(jd))
    }

    async fn scrape(&self, url: &str) -> AppResult<String> {
        let sp = spinner(format!("Scraping {}", url));
        let session = BrowserSession::acquire(&self.config, !self.cli.visualise_scraping).await?;
        let result = scrape_url(&session, url).await;
        session.shutdown().await;
        sp.finish_and_clear();
        result
    }

    async fn tailor(&self, cv: &Cv, jd: &JobDescription) -> AppResult<PipelineOutcome> {
        self.config.require_api_key()?;
        let tailor = TailorService::new(&self.config);
        let presenter = ConsolePresenter;
        let reviewer = ConsoleReviewer;
        let pipeline =
            TailoringPipeline::new(&tailor, &presenter, &reviewer, self.cli.accept_all);

        let outcome = pipeline.run(cv, jd).await?;
        if let PipelineOutcome::Completed(tailored) = &outcome {
            let path = self
                .writer
                .write(
                    &format!("optimised-cv-{}", jd.slug()),
                    OutputFormat::Json,
                    tailored,
                    true,
                )
                .await?;
            info!("📁 裁剪结果已保存: {}", path.display());
        }
        Ok(outcome)
    }

    async fn export(
        &self,
        session: &BrowserSession,
        document: &Cv,
        out_name: &str,
    ) -> AppResult<RunOutcome> {
        let renderer = HtmlRenderer::new(PageDimensions::A4);
        let measurer = ChromeMeasurer::new(session, PageDimensions::A4);

        let sp = spinner("Fitting CV to one page");
        let fitted = fit_to_page(document, &renderer, &measurer, self.cli.allow_multipage).await;
        sp.finish_and_clear();

        let page = match fitted? {
            PageFitOutcome::Fits(page) | PageFitOutcome::AcceptedOverflow(page) => page,
            PageFitOutcome::Failed(page) => {
                return Err(PageFitError::Exhausted {
                    attempts: MAX_SHRINK_ATTEMPTS,
                    content_height: page.measurement.content_height,
                    usable_height: page.measurement.usable_height,
                }
                .into());
            }
        };

        let pdf = self.writer.path_for(out_name, "pdf", false)?;
        measurer.export_pdf(&page.markup, &pdf).await?;
        if self.cli.emit_html {
            let html = self
                .writer
                .write_text(out_name, "html", &page.markup, false)
                .await?;
            info!("✓ HTML 已写入: {}", html.display());
        }

        print_final_summary(
            &pdf.display().to_string(),
            page.attempt,
            &self.config.log_path().display().to_string(),
        );
        Ok(RunOutcome::Exported {
            pdf,
            attempt: page.attempt,
            overflow: page.measurement.exceeds_one_page,
        })
    }

    /// 输出文件名（不含扩展名）
    fn out_name(&self, cv: &Cv, jd: Option<&JobDescription>) -> String {
        if let Some(out) = &self.cli.out {
            return split_out_path(out).1;
        }
        default_out_name(cv, jd)
    }
}

/// 拆分 `--out` 为输出目录和文件名，只有文件名会被规范化
fn split_out_path(out: &str) -> (PathBuf, String) {
    let path = Path::new(out);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| out.to_string());
    (dir, name)
}

/// `cv-<title>-at-<company>-<createdAt>`，没有职位描述时 `cv-<name>-<第一个标题>`
fn default_out_name(cv: &Cv, jd: Option<&JobDescription>) -> String {
    match jd {
        Some(jd) => format!("cv-{}", jd.slug()),
        None => match cv.titles.first() {
            Some(title) => format!("cv-{}-{}", cv.name, title),
            None => format!("cv-{}", cv.name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generate_file_name;

    fn sample_cv() -> Cv {
        serde_yaml::from_str(
            r#"
name: Jane Doe
titles: [Backend Engineer]
contacts: []
location: London
profile: Profile
work: []
education: []
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_out_name_without_jd() {
        let name = default_out_name(&sample_cv(), None);
        assert_eq!(name, "cv-Jane Doe-Backend Engineer");
        assert_eq!(generate_file_name(&name).unwrap(), "cv-jane-doe-backend-engineer");
    }

    #[test]
    fn test_default_out_name_with_jd() {
        let jd: JobDescription = serde_json::from_value(serde_json::json!({
            "structured": {
                "jobTitle": "Rust Engineer",
                "jobDescription": "",
                "techStack": [],
                "keyRequirements": [],
                "keySkills": [],
                "industryContext": "",
                "companyName": "Causaly",
                "companyCountry": "",
                "officeCountry": "",
                "location": "",
                "language": "OTHER",
                "atsKeywords": [],
                "atsType": "other"
            },
            "raw": "",
            "createdAt": "2025-01-02T03:04:05.000Z"
        }))
        .unwrap();

        assert_eq!(
            default_out_name(&sample_cv(), Some(&jd)),
            "cv-Rust Engineer-at-Causaly-2025-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn test_split_out_path_keeps_directory() {
        let (dir, name) = split_out_path("build/cv Final");
        assert_eq!(dir, PathBuf::from("build"));
        assert_eq!(name, "cv Final");

        let (dir, name) = split_out_path("cv-jane");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "cv-jane");
    }

    #[tokio::test]
    async fn test_out_path_writes_into_its_directory() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("build").join("Jane CV");
        let (dir, name) = split_out_path(&out.display().to_string());
        let writer = OutputWriter::new(root.path().join(".tmp")).with_out_dir(dir);

        let path = writer
            .write(&name, OutputFormat::Yaml, &vec!["one"], false)
            .await
            .unwrap();

        assert_eq!(path, root.path().join("build").join("jane-cv.yaml"));
        assert!(path.exists());
    }
}
