//! 简历裁剪服务 - 业务能力层
//!
//! 只负责"对某一部分发起一次裁剪请求"，重试和评审由流程层决定

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    Cv, JobDescription, ResponseId, TailoredFragment, TailoredProfile, TailoredTitles,
    TailoredWorkExperience,
};
use crate::services::llm_service::{LlmService, StructuredRequest};
use crate::services::prompts;

/// 裁剪能力
///
/// 每个方法都从调用方给出的续接令牌继续对话，返回新的片段；
/// `feedback` 只在评审者要求修改时出现
#[async_trait]
pub trait CvTailor: Send + Sync {
    /// 用职位描述开启对话，返回种子令牌
    async fn seed(&self, jd: &JobDescription) -> AppResult<ResponseId>;

    async fn tailor_titles(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredTitles>>;

    async fn tailor_profile(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredProfile>>;

    /// 裁剪 `cv.work[entry_index]`
    async fn tailor_work_entry(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        entry_index: usize,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredWorkExperience>>;
}

/// 基于 LLM 的裁剪服务
pub struct TailorService {
    llm: LlmService,
    language: String,
    tone: String,
    profile_max_chars: usize,
}

impl TailorService {
    /// 创建新的裁剪服务
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
            language: config.language.clone(),
            tone: config.tone.clone(),
            profile_max_chars: config.profile_max_chars,
        }
    }
}

#[async_trait]
impl CvTailor for TailorService {
    async fn seed(&self, jd: &JobDescription) -> AppResult<ResponseId> {
        let system_prompt = prompts::seed_system(&self.language, &self.tone);
        let user_prompt = prompts::seed_user(jd);
        self.llm
            .start_conversation(&system_prompt, &user_prompt)
            .await
    }

    async fn tailor_titles(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredTitles>> {
        self.llm
            .ask_structured(StructuredRequest {
                previous: Some(previous),
                system_prompt: prompts::TITLES_SYSTEM,
                user_prompt: prompts::stage_user_prompt(
                    jd,
                    cv,
                    "Titles from the original CV:",
                    &cv.titles,
                    feedback,
                ),
            })
            .await
    }

    async fn tailor_profile(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredProfile>> {
        let system_prompt = prompts::profile_system(self.profile_max_chars);
        let fragment: TailoredFragment<TailoredProfile> = self
            .llm
            .ask_structured(StructuredRequest {
                previous: Some(previous),
                system_prompt: &system_prompt,
                user_prompt: prompts::stage_user_prompt(
                    jd,
                    cv,
                    "Profile from the original CV:",
                    &cv.profile,
                    feedback,
                ),
            })
            .await?;

        let len = fragment.response.optimised_profile.chars().count();
        if len > self.profile_max_chars {
            warn!(
                "⚠️ [profile] 长度 {} 超过 {} 字符",
                len, self.profile_max_chars
            );
        }
        Ok(fragment)
    }

    async fn tailor_work_entry(
        &self,
        previous: &ResponseId,
        cv: &Cv,
        entry_index: usize,
        jd: &JobDescription,
        feedback: Option<&[String]>,
    ) -> AppResult<TailoredFragment<TailoredWorkExperience>> {
        let entry = cv.work.get(entry_index).ok_or_else(|| {
            AppError::Other(format!("工作经历 #{} 不存在", entry_index + 1))
        })?;
        debug!(
            "裁剪工作经历 #{}: {} - {}",
            entry_index + 1,
            entry.company,
            entry.position
        );
        self.llm
            .ask_structured(StructuredRequest {
                previous: Some(previous),
                system_prompt: prompts::WORK_SYSTEM,
                user_prompt: prompts::stage_user_prompt(
                    jd,
                    cv,
                    "Work experience you should optimise from the original CV:",
                    entry,
                    feedback,
                ),
            })
            .await
    }
}
