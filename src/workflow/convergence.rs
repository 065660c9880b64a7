//! 收敛循环 - 流程层
//!
//! 驱动任意一个"产出片段"的操作，直到评审者接受或放弃：
//!
//! ```text
//! ProducerPending ──produce──▶ AwaitingReview ──accept──▶ Accepted
//!        ▲                          │
//!        └──────── feedback ────────┤
//!                                   └──reject──▶ Rejected
//! ```
//!
//! 没有轮数上限，循环只由评审者结束；产出方的错误直接向上传播，不在这里重试

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AppResult;

/// 产出方的输入
///
/// 第一次调用两个字段都为空；之后携带上一轮的片段和评审意见
#[derive(Debug, Clone, PartialEq)]
pub struct ProduceContext<F> {
    pub prev_result: Option<F>,
    pub feedback: Option<Vec<String>>,
}

impl<F> ProduceContext<F> {
    fn initial() -> Self {
        Self {
            prev_result: None,
            feedback: None,
        }
    }
}

/// 评审结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
    /// 自由文本的修改意见
    Feedback(Vec<String>),
}

/// 评审能力
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// 询问评审者对刚展示的片段的决定
    ///
    /// # 参数
    /// - `section`: 当前阶段名称（用于提示）
    async fn review(&self, section: &str) -> AppResult<ReviewDecision>;
}

/// 收敛结果
///
/// 评审者放弃是正常结束，不是错误
#[derive(Debug, Clone, PartialEq)]
pub enum ConvergeOutcome<F> {
    Accepted(F),
    Rejected,
}

enum LoopState<F> {
    ProducerPending(ProduceContext<F>),
    AwaitingReview(F),
    Accepted(F),
    Rejected,
}

/// 运行收敛循环
///
/// # 参数
/// - `section`: 阶段名称
/// - `produce`: 产出方，每轮调用一次
/// - `present`: 展示回调，只做显示
/// - `reviewer`: 评审者
/// - `auto_accept`: 为 true 时直接接受第一次产出，不询问评审者
pub async fn converge<F, P, Fut>(
    section: &str,
    mut produce: P,
    present: impl Fn(&F),
    reviewer: &dyn Reviewer,
    auto_accept: bool,
) -> AppResult<ConvergeOutcome<F>>
where
    P: FnMut(ProduceContext<F>) -> Fut,
    Fut: Future<Output = AppResult<F>>,
{
    let mut state = LoopState::ProducerPending(ProduceContext::initial());
    let mut round = 0usize;

    loop {
        state = match state {
            LoopState::ProducerPending(context) => {
                round += 1;
                debug!("[{}] 第 {} 轮产出", section, round);
                let fragment = produce(context).await?;
                present(&fragment);
                if auto_accept {
                    LoopState::Accepted(fragment)
                } else {
                    LoopState::AwaitingReview(fragment)
                }
            }
            LoopState::AwaitingReview(fragment) => match reviewer.review(section).await? {
                ReviewDecision::Accept => LoopState::Accepted(fragment),
                ReviewDecision::Reject => LoopState::Rejected,
                ReviewDecision::Feedback(feedback) => {
                    info!("[{}] 📝 收到 {} 条修改意见，重新生成", section, feedback.len());
                    LoopState::ProducerPending(ProduceContext {
                        prev_result: Some(fragment),
                        feedback: Some(feedback),
                    })
                }
            },
            LoopState::Accepted(fragment) => {
                info!("[{}] ✓ 已接受 (共 {} 轮)", section, round);
                return Ok(ConvergeOutcome::Accepted(fragment));
            }
            LoopState::Rejected => {
                info!("[{}] ❌ 评审者放弃", section);
                return Ok(ConvergeOutcome::Rejected);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    /// 按脚本依次给出决定
    struct ScriptedReviewer {
        decisions: Mutex<VecDeque<ReviewDecision>>,
        asked: AtomicUsize,
    }

    impl ScriptedReviewer {
        fn new(decisions: Vec<ReviewDecision>) -> Self {
            Self {
                decisions: Mutex::new(decisions.into()),
                asked: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Reviewer for ScriptedReviewer {
        async fn review(&self, _section: &str) -> AppResult<ReviewDecision> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .decisions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ReviewDecision::Accept))
        }
    }

    #[tokio::test]
    async fn test_accept_on_first_presentation() {
        let reviewer = ScriptedReviewer::new(vec![ReviewDecision::Accept]);
        let mut calls = 0u32;
        let presented = Mutex::new(Vec::new());

        let outcome = converge(
            "titles",
            |_ctx: ProduceContext<u32>| {
                calls += 1;
                let value = calls * 10;
                async move { Ok(value) }
            },
            |f: &u32| presented.lock().unwrap().push(*f),
            &reviewer,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Accepted(10));
        assert_eq!(calls, 1);
        assert_eq!(*presented.lock().unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn test_reject_on_first_presentation() {
        let reviewer = ScriptedReviewer::new(vec![ReviewDecision::Reject]);
        let mut calls = 0u32;

        let outcome = converge(
            "profile",
            |_ctx: ProduceContext<u32>| {
                calls += 1;
                async move { Ok(1) }
            },
            |_: &u32| {},
            &reviewer,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Rejected);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_feedback_then_accept() {
        let feedback = vec!["shorter please".to_string()];
        let reviewer = ScriptedReviewer::new(vec![
            ReviewDecision::Feedback(feedback.clone()),
            ReviewDecision::Accept,
        ]);
        let mut contexts: Vec<ProduceContext<String>> = Vec::new();

        let outcome = converge(
            "work",
            |ctx: ProduceContext<String>| {
                contexts.push(ctx.clone());
                let value = format!("draft-{}", contexts.len());
                async move { Ok(value) }
            },
            |_: &String| {},
            &reviewer,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Accepted("draft-2".to_string()));
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0], ProduceContext::initial());
        assert_eq!(contexts[1].prev_result.as_deref(), Some("draft-1"));
        assert_eq!(contexts[1].feedback.as_ref(), Some(&feedback));
    }

    #[tokio::test]
    async fn test_auto_accept_skips_reviewer() {
        let reviewer = ScriptedReviewer::new(vec![ReviewDecision::Reject]);

        let outcome = converge(
            "titles",
            |_ctx: ProduceContext<u32>| async { Ok(7) },
            |_: &u32| {},
            &reviewer,
            true,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Accepted(7));
        assert_eq!(reviewer.asked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_producer_error_propagates() {
        let reviewer = ScriptedReviewer::new(vec![]);

        let result = converge(
            "titles",
            |_ctx: ProduceContext<u32>| async { Err(AppError::Other("boom".to_string())) },
            |_: &u32| {},
            &reviewer,
            false,
        )
        .await;

        assert!(matches!(result, Err(AppError::Other(ref m)) if m == "boom"));
        assert_eq!(reviewer.asked.load(Ordering::SeqCst), 0);
    }
}
