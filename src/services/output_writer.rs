//! 输出写入服务 - 业务能力层
//!
//! 只负责"把结构化数据写成 JSON / YAML 文件"能力，不关心流程

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, FileError};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// 把任意标识转换为文件名
///
/// 转小写，`[a-zA-Z0-9:-]` 以外的字符替换为 `-`，连续的 `-` 合并
pub fn generate_file_name(input: &str) -> AppResult<String> {
    let disallowed =
        Regex::new(r"[^a-zA-Z0-9:-]").map_err(|e| AppError::Other(e.to_string()))?;
    let dashes = Regex::new(r"-+").map_err(|e| AppError::Other(e.to_string()))?;

    let lowered = input.to_lowercase();
    let replaced = disallowed.replace_all(&lowered, "-");
    Ok(dashes.replace_all(&replaced, "-").into_owned())
}

/// 输出写入服务
///
/// 职责：
/// - 审计文件写入中间产物目录（`tmp = true`）
/// - 最终产物写入当前目录
/// - 文件名统一经过 `generate_file_name`
pub struct OutputWriter {
    tmp_dir: PathBuf,
    out_dir: PathBuf,
}

impl OutputWriter {
    /// 创建新的输出写入服务
    ///
    /// # 参数
    /// - `tmp_dir`: 中间产物目录
    pub fn new(tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            out_dir: PathBuf::from("."),
        }
    }

    /// 指定最终产物目录（默认当前目录）
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// 计算输出路径
    ///
    /// # 参数
    /// - `name`: 未处理的文件名（不含扩展名）
    /// - `extension`: 扩展名
    /// - `tmp`: 是否写入中间产物目录
    pub fn path_for(&self, name: &str, extension: &str, tmp: bool) -> AppResult<PathBuf> {
        let dir = if tmp { &self.tmp_dir } else { &self.out_dir };
        Ok(dir.join(format!("{}.{}", generate_file_name(name)?, extension)))
    }

    /// 写入文件
    ///
    /// # 返回
    /// 实际写入的路径
    pub async fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        format: OutputFormat,
        data: &T,
        tmp: bool,
    ) -> AppResult<PathBuf> {
        let path = self.path_for(name, format.extension(), tmp)?;
        let content = match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(data).map_err(|e| serialize_failed(&path, e))?
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(data).map_err(|e| serialize_failed(&path, e))?
            }
        };
        write_file(&path, &content).await?;
        Ok(path)
    }

    /// 写入已生成好的文本（例如最终 HTML）
    pub async fn write_text(
        &self,
        name: &str,
        extension: &str,
        content: &str,
        tmp: bool,
    ) -> AppResult<PathBuf> {
        let path = self.path_for(name, extension, tmp)?;
        write_file(&path, content).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    debug!("已写入: {}", path.display());
    Ok(())
}

fn serialize_failed(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::File(FileError::SerializeFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
