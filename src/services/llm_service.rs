//! LLM 服务 - 业务能力层
//!
//! 只负责"结构化对话"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 的 chat completions 接口
//! - 支持自定义 API 端点和模型（兼容 OpenAI API 的服务）
//!
//! ## 续接令牌
//! chat completions 本身无状态。每次完成的对话按 completion id 保存，
//! 之后以该 id 提问时先重放整段对话，再追加新的消息

use std::collections::HashMap;
use std::sync::Mutex;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{ResponseId, StructuredResponse, TailoredFragment};
use crate::utils::truncate_text;

/// 一次结构化提问
#[derive(Debug, Clone)]
pub struct StructuredRequest<'a> {
    /// 续接的上一轮对话；为 `None` 时开启新对话
    pub previous: Option<&'a ResponseId>,
    pub system_prompt: &'a str,
    /// 多段用户消息，按顺序拼接
    pub user_prompt: Vec<String>,
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 并把输出解析为强类型结构
/// - 在服务边界区分"无法解析"、"拒绝回答"和"违反约束"
/// - 保存对话记录以支持续接令牌
/// - 不认识 Cv 的各个阶段，不关心流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_completion_tokens: u32,
    /// 续接令牌 → 对话记录；只增不删，随进程结束释放
    transcripts: Mutex<HashMap<ResponseId, Vec<ChatCompletionRequestMessage>>>,
}

impl LlmService {
    /// 创建新的 LLM 服务（使用裁剪模型）
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_completion_tokens: config.max_completion_tokens,
            transcripts: Mutex::new(HashMap::new()),
        }
    }

    /// 切换模型（职位描述抽取使用更强的模型）
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 开启一段对话，只返回续接令牌
    ///
    /// # 参数
    /// - `system_prompt`: 系统消息
    /// - `user_prompt`: 用户消息
    pub async fn start_conversation(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<ResponseId> {
        let messages = vec![system_message(system_prompt)?, user_message(user_prompt)?];
        let (response_id, content) = self.complete(messages.clone()).await?;
        debug!("对话已开启: {} ({})", response_id, truncate_text(&content, 80));
        self.remember(&response_id, messages, content)?;
        Ok(response_id)
    }

    /// 结构化提问
    ///
    /// 输出必须是 `T::SCHEMA` 描述的 JSON 对象
    ///
    /// # 返回
    /// 新的续接令牌和解析后的结果
    pub async fn ask_structured<T: StructuredResponse>(
        &self,
        request: StructuredRequest<'_>,
    ) -> AppResult<TailoredFragment<T>> {
        let mut messages = match request.previous {
            Some(id) => self.transcript(id)?,
            None => Vec::new(),
        };

        let system_prompt = format!(
            "{}\n\nRespond with a single JSON object and nothing else. The JSON object must have this shape:\n{}",
            request.system_prompt.trim(),
            T::SCHEMA
        );
        messages.push(system_message(&system_prompt)?);
        messages.push(user_message(&request.user_prompt.join("\n\n"))?);

        debug!(
            "结构化提问: {} (续接: {:?}, 消息数: {})",
            T::NAME,
            request.previous.map(ResponseId::as_str),
            messages.len()
        );

        let (response_id, content) = self.complete(messages.clone()).await?;
        let response = parse_structured::<T>(&content)?;
        self.remember(&response_id, messages, content)?;

        Ok(TailoredFragment::new(response_id, response))
    }

    /// 调用 API，返回 completion id 和文本内容
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> AppResult<(ResponseId, String)> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .max_completion_tokens(self.max_completion_tokens)
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功: {}", response.id);

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        if let Some(reason) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(LlmError::Refused {
                model: self.model_name.clone(),
                reason,
            }
            .into());
        }

        let content = message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok((ResponseId::new(response.id), content))
    }

    fn transcript(&self, id: &ResponseId) -> AppResult<Vec<ChatCompletionRequestMessage>> {
        let transcripts = self
            .transcripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        transcripts.get(id).cloned().ok_or_else(|| {
            LlmError::UnknownContinuation {
                response_id: id.to_string(),
            }
            .into()
        })
    }

    fn remember(
        &self,
        id: &ResponseId,
        mut messages: Vec<ChatCompletionRequestMessage>,
        content: String,
    ) -> AppResult<()> {
        let assistant = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(build_failed)?;
        messages.push(ChatCompletionRequestMessage::Assistant(assistant));

        self.transcripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.clone(), messages);
        Ok(())
    }
}

fn system_message(content: &str) -> AppResult<ChatCompletionRequestMessage> {
    let message = ChatCompletionRequestSystemMessageArgs::default()
        .content(content)
        .build()
        .map_err(build_failed)?;
    Ok(ChatCompletionRequestMessage::System(message))
}

fn user_message(content: &str) -> AppResult<ChatCompletionRequestMessage> {
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(build_failed)?;
    Ok(ChatCompletionRequestMessage::User(message))
}

fn build_failed(e: impl std::fmt::Display) -> AppError {
    AppError::Llm(LlmError::RequestBuildFailed {
        message: e.to_string(),
    })
}

/// 解析模型输出
///
/// - 不是合法 JSON 或结构不符 → `Malformed`
/// - 违反硬约束 → `ContractViolation`
/// - 超出长度建议 → 只记录警告
pub fn parse_structured<T: StructuredResponse>(content: &str) -> Result<T, LlmError> {
    let json = strip_json_fences(content);
    let response: T = serde_json::from_str(json).map_err(|e| {
        debug!("无法解析的输出: {}", truncate_text(json, 200));
        LlmError::Malformed {
            target: T::NAME.to_string(),
            message: e.to_string(),
        }
    })?;

    let violations = response.contract_violations();
    if !violations.is_empty() {
        return Err(LlmError::ContractViolation {
            target: T::NAME.to_string(),
            violations,
        });
    }

    for warning in response.length_warnings() {
        warn!("⚠️ [{}] {}", T::NAME, warning);
    }

    Ok(response)
}

/// 去掉模型偶尔包裹在 JSON 外的 markdown 代码块
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
