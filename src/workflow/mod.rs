//! 流程层（Workflow Layer）
//!
//! 决定"什么时候调用哪个能力、什么时候停止"，不持有任何资源：
//!
//! - `convergence` - 产出 → 展示 → 评审 的收敛循环
//! - `tailoring` - seed → titles → profile → work 的裁剪流水线
//! - `merge` - 裁剪结果合并回原简历
//! - `shrink` - 单步收缩变换
//! - `page_fit` - 收缩 → 渲染 → 测量 的页面适配循环

pub mod convergence;
pub mod merge;
pub mod page_fit;
pub mod shrink;
pub mod tailoring;

pub use convergence::{converge, ConvergeOutcome, ProduceContext, ReviewDecision, Reviewer};
pub use merge::merge;
pub use page_fit::{fit_to_page, FittedPage, PageFitOutcome};
pub use shrink::{shrink, MAX_SHRINK_ATTEMPTS, MIN_ACHIEVEMENTS_TO_PRESERVE};
pub use tailoring::{PipelineOutcome, Presenter, Section, TailoringPipeline};
