//! # CV Tailor
//!
//! 根据职位描述裁剪 YAML 简历，并导出为一页 PDF
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageProbe` - 唯一的 page owner，提供 set_content / eval / save_pdf 能力
//! - `browser/` - 启动或连接浏览器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `LlmService` / `TailorService` / `JdExtractor` - 结构化 LLM 调用
//! - `scraper` / `HtmlRenderer` / `ChromeMeasurer` / `OutputWriter`
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 收敛循环、裁剪流水线、合并、收缩、页面适配
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 一次完整运行
//! - `orchestrator/console` - 终端展示与评审
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PageProbe;
pub use models::{Cv, JobDescription, TailoredCv};
pub use orchestrator::{App, RunOutcome};
pub use workflow::{converge, fit_to_page, merge, shrink, PageFitOutcome, PipelineOutcome};
