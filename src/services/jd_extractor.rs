//! 职位描述抽取服务 - 业务能力层
//!
//! 只负责"原文 → 结构化职位描述"能力

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{JobDescription, StructuredJob};
use crate::services::llm_service::{LlmService, StructuredRequest};
use crate::services::prompts;

/// 职位描述抽取服务
pub struct JdExtractor {
    llm: LlmService,
}

impl JdExtractor {
    /// 使用抽取模型创建
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config).with_model(&config.extraction_model_name),
        }
    }

    /// 抽取职位描述
    ///
    /// # 参数
    /// - `raw`: 抓取或输入的原文
    pub async fn extract(&self, raw: &str) -> AppResult<JobDescription> {
        info!("🤖 正在抽取职位描述 (模型: {})", self.llm.model_name());
        let fragment = self
            .llm
            .ask_structured::<StructuredJob>(StructuredRequest {
                previous: None,
                system_prompt: prompts::JD_EXTRACTION_SYSTEM,
                user_prompt: vec![raw.to_string()],
            })
            .await?;

        let structured = fragment.response;
        info!(
            "✓ 职位: {} @ {} ({})",
            structured.job_title, structured.company_name, structured.location
        );
        Ok(JobDescription {
            structured,
            raw: raw.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
