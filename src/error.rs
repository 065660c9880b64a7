use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 评审者拒绝不是错误，见 `workflow::ConvergeOutcome::Rejected`
#[derive(Debug, Error)]
pub enum AppError {
    /// 简历校验失败
    #[error("{0}")]
    Validation(#[from] ValidationReport),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 页面适配错误
    #[error("页面适配错误: {0}")]
    PageFit(#[from] PageFitError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 单条校验问题
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// 字段路径，例如 `work.0.company`；根节点为 `root`
    pub path: String,
    pub message: String,
    pub expected: Option<String>,
    pub received: Option<String>,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>, received: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.received = Some(received.into());
        self
    }
}

/// 简历校验报告
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub file: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary: Vec<String> = self
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.path, issue.message))
            .collect();
        write!(f, "校验失败 ({}): {}", self.file, summary.join("; "))
    }
}

impl std::error::Error for ValidationReport {}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导出 PDF 失败
    #[error("导出 PDF 到 {path} 失败: {source}")]
    PdfExportFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面中没有可提取的正文
    #[error("页面中没有找到 body")]
    EmptyBody,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 序列化失败
    #[error("序列化失败 ({path}): {message}")]
    SerializeFailed { path: String, message: String },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {message}")]
    JsonParseFailed { path: String, message: String },
}

/// LLM 服务错误
///
/// `Malformed` 与 `Refused` 区分"输出无法解析"和"模型拒绝回答"
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 模型拒绝回答
    #[error("LLM拒绝回答 (模型: {model}): {reason}")]
    Refused { model: String, reason: String },
    /// 返回内容不是合法的结构化数据
    #[error("LLM返回内容无法解析 (目标: {target}): {message}")]
    Malformed { target: String, message: String },
    /// 结构化数据违反约束
    #[error("LLM返回内容违反约束 (目标: {target}): {}", .violations.join("; "))]
    ContractViolation {
        target: String,
        violations: Vec<String>,
    },
    /// 续接令牌不存在
    #[error("未知的续接令牌: {response_id}")]
    UnknownContinuation { response_id: String },
    /// 构建请求失败
    #[error("构建LLM请求失败: {message}")]
    RequestBuildFailed { message: String },
}

/// 页面适配错误
#[derive(Debug, Error)]
pub enum PageFitError {
    /// 尝试次数用尽仍然超出一页
    #[error("简历在 {attempts} 次收缩后仍超出一页 (内容高度: {content_height:.0}px, 可用高度: {usable_height:.0}px)")]
    Exhausted {
        attempts: usize,
        content_height: f64,
        usable_height: f64,
    },
    /// 收缩变换超出预算（循环上界与变换上界不一致时才会出现）
    #[error("收缩尝试次数超过上限 {max_attempts}")]
    ShrinkBudgetExceeded { max_attempts: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {message}")]
    TomlParseFailed { path: String, message: String },
    /// 职位描述来源缺失
    #[error("没有提供职位描述")]
    MissingJobDescription,
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_display_lists_paths() {
        let report = ValidationReport {
            file: "cv.yaml".to_string(),
            issues: vec![
                ValidationIssue::new("titles", "最多 3 个标题").expected("<= 3", "4"),
                ValidationIssue::new("work.1.company", "不能为空"),
            ],
        };
        let text = AppError::from(report).to_string();
        assert!(text.contains("cv.yaml"));
        assert!(text.contains("titles: 最多 3 个标题"));
        assert!(text.contains("work.1.company: 不能为空"));
    }

    #[test]
    fn test_contract_violation_joins_violations() {
        let err = LlmError::ContractViolation {
            target: "titles".to_string(),
            violations: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().ends_with("a; b"));
    }
}
