//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次完整运行的调度，是唯一持有浏览器资源和终端交互的层。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主流程
//! - 初始化日志和输出目录
//! - 加载简历、获取职位描述
//! - 运行裁剪流水线、合并、页面适配、导出
//!
//! ### `console` - 终端交互
//! - 展示每个阶段的差异
//! - 读取评审决定和职位描述来源
//!
//! ## 层次关系
//!
//! ```text
//! app (一次运行)
//!     ↓
//! workflow (收敛循环 / 裁剪流水线 / 合并 / 页面适配)
//!     ↓
//! services (能力层：llm / scraper / renderer / measurer / writer)
//!     ↓
//! infrastructure (基础设施：PageProbe)
//! ```

pub mod app;
pub mod console;

pub use app::{App, RunOutcome};
pub use console::{ConsolePresenter, ConsoleReviewer};
