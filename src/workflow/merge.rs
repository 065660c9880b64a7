//! 合并引擎 - 流程层
//!
//! 把被接受的裁剪结果叠加回原简历，纯函数，无副作用

use tracing::warn;

use crate::models::{Cv, TailoredCv, TailoredWorkExperience, WorkExperience};

/// 合并原简历与裁剪结果
///
/// - name / contacts / location / education / extras 原样保留
/// - titles、profile 整体替换
/// - `work[i]` 的成就和技术栈取 `tailored.work_experience[i]`，按分数降序（同分保持原顺序）
/// - 没有对应裁剪结果的经历，成就和技术栈为空
pub fn merge(original: &Cv, tailored: &TailoredCv) -> Cv {
    if tailored.work_experience.len() != original.work.len() {
        warn!(
            "⚠️ 裁剪结果有 {} 条工作经历，原简历有 {} 条；缺失的条目将没有成就和技术栈",
            tailored.work_experience.len(),
            original.work.len()
        );
    }

    let work = original
        .work
        .iter()
        .enumerate()
        .map(|(index, entry)| merge_entry(entry, tailored.work_experience.get(index)))
        .collect();

    Cv {
        titles: tailored.titles.optimised_titles.clone(),
        profile: tailored.profile.optimised_profile.clone(),
        work,
        ..original.clone()
    }
}

fn merge_entry(entry: &WorkExperience, tailored: Option<&TailoredWorkExperience>) -> WorkExperience {
    let (achievements, stack) = match tailored {
        Some(t) => (sorted_achievements(t), sorted_stack(t)),
        None => (Vec::new(), Vec::new()),
    };
    WorkExperience {
        achievements,
        stack: Some(stack),
        ..entry.clone()
    }
}

fn sorted_achievements(tailored: &TailoredWorkExperience) -> Vec<String> {
    let mut items: Vec<_> = tailored.optimised_achievements.iter().collect();
    // sort_by 是稳定排序
    items.sort_by(|a, b| b.match_score_pct.total_cmp(&a.match_score_pct));
    items
        .into_iter()
        .map(|a| a.optimised_achievement.clone())
        .collect()
}

fn sorted_stack(tailored: &TailoredWorkExperience) -> Vec<String> {
    let mut items: Vec<_> = tailored.optimised_stack.iter().collect();
    items.sort_by(|a, b| b.match_score_pct.total_cmp(&a.match_score_pct));
    items.into_iter().map(|s| s.optimised_stack.clone()).collect()
}
