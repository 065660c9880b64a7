use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "cv-tailor.toml";

/// 程序配置
///
/// 解析顺序：内置默认值 → TOML 文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 裁剪阶段使用的模型
    pub llm_model_name: String,
    /// 职位描述抽取使用的模型
    pub extraction_model_name: String,
    pub max_completion_tokens: u32,
    // --- 裁剪风格 ---
    pub language: String,
    pub tone: String,
    /// 简介字数上限
    pub profile_max_chars: usize,
    // --- 浏览器配置 ---
    /// Chromium 可执行文件路径（为空时由 chromiumoxide 自行查找）
    pub chromium_path: Option<String>,
    /// 已运行浏览器的调试端口；设置后连接而不是启动
    pub browser_debug_port: Option<u16>,
    // --- 输出配置 ---
    /// 中间产物目录
    pub tmp_dir: String,
    /// 服务日志文件（默认 `<tmp_dir>/log.log`）
    pub log_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-5-mini".to_string(),
            extraction_model_name: "gpt-5".to_string(),
            max_completion_tokens: 16_384,
            language: "EN_UK".to_string(),
            tone: "Professional".to_string(),
            profile_max_chars: 400,
            chromium_path: None,
            browser_debug_port: None,
            tmp_dir: ".tmp".to_string(),
            log_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置
    ///
    /// # 参数
    /// - `path`: 显式指定的 TOML 文件；为 `None` 时尝试 `cv-tailor.toml`
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        debug!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            llm_api_key: env("OPENAI_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env("OPENAI_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env("CV_TAILOR_MODEL").unwrap_or(self.llm_model_name),
            extraction_model_name: env("CV_TAILOR_EXTRACTION_MODEL")
                .unwrap_or(self.extraction_model_name),
            language: env("CV_TAILOR_LANGUAGE").unwrap_or(self.language),
            tone: env("CV_TAILOR_TONE").unwrap_or(self.tone),
            chromium_path: env("CHROMIUM_PATH").or(self.chromium_path),
            browser_debug_port: env("BROWSER_DEBUG_PORT")
                .and_then(|v| v.parse().ok())
                .or(self.browser_debug_port),
            tmp_dir: env("CV_TAILOR_TMP_DIR").unwrap_or(self.tmp_dir),
            verbose_logging: env("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            ..self
        }
    }

    /// 中间产物目录
    pub fn tmp_path(&self) -> PathBuf {
        PathBuf::from(&self.tmp_dir)
    }

    /// 服务日志文件路径
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.tmp_path().join("log.log"))
    }

    /// 裁剪流程需要 API 密钥，`--generate-only` 不需要
    pub fn require_api_key(&self) -> AppResult<&str> {
        if self.llm_api_key.trim().is_empty() {
            return Err(AppError::Config(ConfigError::EnvVarNotFound {
                var_name: "OPENAI_API_KEY".to_string(),
            }));
        }
        Ok(&self.llm_api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm_model_name = \"gpt-5\"\nprofile_max_chars = 650").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.llm_model_name, "gpt-5");
        assert_eq!(config.profile_max_chars, 650);
        assert_eq!(config.language, "EN_UK");
        assert_eq!(config.tmp_dir, ".tmp");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile_max_chars = \"many\"").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config {
            llm_api_key: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.require_api_key().is_err());
    }
}
