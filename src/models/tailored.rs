//! 裁剪结果数据结构
//!
//! 每个阶段产出一个 `TailoredFragment<T>`：续接令牌 + 模型返回的结构化内容。
//! 片段创建后不再修改，每次修订都是新的值

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::validation::MAX_TITLES;

/// 标题长度上限（字符）
pub const MAX_TITLE_CHARS: usize = 30;
/// 成就长度上限（字符）
pub const MAX_ACHIEVEMENT_CHARS: usize = 150;
/// 技术栈标签长度上限（字符）
pub const MAX_STACK_TAG_CHARS: usize = 18;

/// 不透明的续接令牌
///
/// 由 LLM 服务签发，调用方只负责原样传回
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(String);

impl ResponseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一个阶段的产出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredFragment<T> {
    pub response_id: ResponseId,
    pub response: T,
}

impl<T> TailoredFragment<T> {
    pub fn new(response_id: ResponseId, response: T) -> Self {
        Self {
            response_id,
            response,
        }
    }
}

/// 结构化响应契约
///
/// 反序列化成功之后再检查的硬约束（`contract_violations`）和软约束（`length_warnings`）
pub trait StructuredResponse: DeserializeOwned + Send + 'static {
    /// 用于日志和错误信息的名称
    const NAME: &'static str;
    /// 写进提示词的 JSON 结构说明
    const SCHEMA: &'static str;

    /// 违反即视为模型输出无效
    fn contract_violations(&self) -> Vec<String> {
        Vec::new()
    }

    /// 只记录警告，不拒绝输出
    fn length_warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

fn check_score(field: &str, score: f64, violations: &mut Vec<String>) {
    if !(0.0..=100.0).contains(&score) {
        violations.push(format!("{} 必须在 [0, 100] 内，实际为 {}", field, score));
    }
}

fn check_length(field: &str, text: &str, max: usize, warnings: &mut Vec<String>) {
    let len = text.chars().count();
    if len > max {
        warnings.push(format!("{} 长度 {} 超过 {} 字符: {}", field, len, max, text));
    }
}

/// 标题阶段的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredTitles {
    pub original_match_score_pct: f64,
    pub optimised_match_score_pct: f64,
    pub optimised_titles: Vec<String>,
    pub gaps: Vec<String>,
    pub suggestions: Vec<String>,
}

impl StructuredResponse for TailoredTitles {
    const NAME: &'static str = "titles";
    const SCHEMA: &'static str = r#"{
  "originalMatchScorePct": number,   // 0-100, match of the original titles to the job description
  "optimisedMatchScorePct": number,  // 0-100, match of the optimised titles to the job description
  "optimisedTitles": string[],       // at most 3
  "gaps": string[],                  // what is missing from the titles to be more relevant
  "suggestions": string[]            // unconfirmed suggestions that would work for ATS parsing but are not aligned with the original titles
}"#;

    fn contract_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        check_score("originalMatchScorePct", self.original_match_score_pct, &mut violations);
        check_score("optimisedMatchScorePct", self.optimised_match_score_pct, &mut violations);
        if self.optimised_titles.len() > MAX_TITLES {
            violations.push(format!(
                "optimisedTitles 最多 {} 个，实际为 {}",
                MAX_TITLES,
                self.optimised_titles.len()
            ));
        }
        violations
    }

    fn length_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for title in &self.optimised_titles {
            check_length("title", title, MAX_TITLE_CHARS, &mut warnings);
        }
        warnings
    }
}

/// 简介阶段的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredProfile {
    pub original_match_score_pct: f64,
    pub optimised_match_score_pct: f64,
    pub optimised_profile: String,
    pub gaps: Vec<String>,
    pub suggestions: Vec<String>,
    /// 完全贴合 ATS 但可能偏离原简介的版本，仅供参考
    pub ats_perfect_match: String,
}

impl StructuredResponse for TailoredProfile {
    const NAME: &'static str = "profile";
    const SCHEMA: &'static str = r#"{
  "originalMatchScorePct": number,   // 0-100, match of the original profile to the job description
  "optimisedMatchScorePct": number,  // 0-100, match of the optimised profile to the job description
  "optimisedProfile": string,
  "gaps": string[],                  // what is missing from the profile to be more relevant
  "suggestions": string[],           // unconfirmed suggestions that would work for ATS parsing but are not aligned with the original profile
  "atsPerfectMatch": string          // the profile that would be a perfect ATS match, even if not aligned with the original
}"#;

    fn contract_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        check_score("originalMatchScorePct", self.original_match_score_pct, &mut violations);
        check_score("optimisedMatchScorePct", self.optimised_match_score_pct, &mut violations);
        violations
    }
}

/// 带匹配分数的成就
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAchievement {
    pub match_score_pct: f64,
    pub optimised_achievement: String,
}

/// 带匹配分数的技术栈标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredStackItem {
    pub match_score_pct: f64,
    pub optimised_stack: String,
}

/// 单条工作经历的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredWorkExperience {
    pub original_match_score_pct: f64,
    pub optimised_match_score_pct: f64,
    pub optimised_achievements: Vec<ScoredAchievement>,
    pub optimised_stack: Vec<ScoredStackItem>,
}

impl StructuredResponse for TailoredWorkExperience {
    const NAME: &'static str = "work experience";
    const SCHEMA: &'static str = r#"{
  "originalMatchScorePct": number,   // 0-100, match of the original work experience to the job description
  "optimisedMatchScorePct": number,  // 0-100, match of the optimised work experience to the job description
  "optimisedAchievements": [
    { "matchScorePct": number, "optimisedAchievement": string }
  ],
  "optimisedStack": [
    { "matchScorePct": number, "optimisedStack": string }
  ]
}"#;

    fn contract_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        check_score("originalMatchScorePct", self.original_match_score_pct, &mut violations);
        check_score("optimisedMatchScorePct", self.optimised_match_score_pct, &mut violations);
        for (i, a) in self.optimised_achievements.iter().enumerate() {
            check_score(
                &format!("optimisedAchievements.{}.matchScorePct", i),
                a.match_score_pct,
                &mut violations,
            );
        }
        for (i, s) in self.optimised_stack.iter().enumerate() {
            check_score(
                &format!("optimisedStack.{}.matchScorePct", i),
                s.match_score_pct,
                &mut violations,
            );
        }
        violations
    }

    fn length_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for a in &self.optimised_achievements {
            check_length(
                "achievement",
                &a.optimised_achievement,
                MAX_ACHIEVEMENT_CHARS,
                &mut warnings,
            );
        }
        for s in &self.optimised_stack {
            check_length("stack", &s.optimised_stack, MAX_STACK_TAG_CHARS, &mut warnings);
        }
        warnings
    }
}

/// 所有阶段被接受的结果
///
/// `work_experience[i]` 对应原简历的 `work[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredCv {
    pub titles: TailoredTitles,
    pub profile: TailoredProfile,
    pub work_experience: Vec<TailoredWorkExperience>,
    /// ISO-8601
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_contract() {
        let titles: TailoredTitles = serde_json::from_str(
            r#"{
                "originalMatchScorePct": 40,
                "optimisedMatchScorePct": 140,
                "optimisedTitles": ["A", "B", "C", "D"],
                "gaps": [],
                "suggestions": []
            }"#,
        )
        .unwrap();

        let violations = titles.contract_violations();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("optimisedMatchScorePct"));
        assert!(violations[1].contains("optimisedTitles"));
    }

    #[test]
    fn test_work_length_warnings_are_soft() {
        let work = TailoredWorkExperience {
            original_match_score_pct: 50.0,
            optimised_match_score_pct: 80.0,
            optimised_achievements: vec![ScoredAchievement {
                match_score_pct: 90.0,
                optimised_achievement: "x".repeat(151),
            }],
            optimised_stack: vec![ScoredStackItem {
                match_score_pct: 70.0,
                optimised_stack: "AWS (CDK, Lambda, S3)".to_string(),
            }],
        };
        assert!(work.contract_violations().is_empty());
        assert_eq!(work.length_warnings().len(), 2);
    }

    #[test]
    fn test_fragment_serializes_camel_case() {
        let fragment = TailoredFragment::new(ResponseId::new("chatcmpl-1"), 7u8);
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["responseId"], "chatcmpl-1");
        assert_eq!(json["response"], 7);
    }
}
