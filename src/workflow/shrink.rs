//! 收缩变换 - 流程层
//!
//! 每次页面适配尝试调用一次，确定且单调：删掉的内容不会再加回来

use crate::error::{AppResult, PageFitError};
use crate::models::Cv;

/// 收缩尝试上限，页面适配循环使用同一个上限
pub const MAX_SHRINK_ATTEMPTS: usize = 16;

/// 每条工作经历至少保留的成就数
pub const MIN_ACHIEVEMENTS_TO_PRESERVE: usize = 2;

/// 对当前文档做第 `attempt` 次收缩
///
/// - 第 0 次不做任何改动
/// - 第一条以外还有经历超过下限时，这些经历各删掉最后一条成就
/// - 否则删掉第一条经历的最后一条成就（已到下限则不变）
/// - `attempt` 达到上限时返回 `ShrinkBudgetExceeded`
pub fn shrink(cv: &Cv, attempt: usize) -> AppResult<Cv> {
    if attempt >= MAX_SHRINK_ATTEMPTS {
        return Err(PageFitError::ShrinkBudgetExceeded {
            max_attempts: MAX_SHRINK_ATTEMPTS,
        }
        .into());
    }

    let mut next = cv.clone();
    if attempt == 0 {
        return Ok(next);
    }

    let mut shrunk_secondary = false;
    for entry in next.work.iter_mut().skip(1) {
        if entry.achievements.len() > MIN_ACHIEVEMENTS_TO_PRESERVE {
            entry.achievements.pop();
            shrunk_secondary = true;
        }
    }

    if !shrunk_secondary {
        if let Some(first) = next.work.first_mut() {
            if first.achievements.len() > MIN_ACHIEVEMENTS_TO_PRESERVE {
                first.achievements.pop();
            }
        }
    }

    Ok(next)
}
