//! 日志工具模块
//!
//! 提供日志初始化、格式化输出和终端进度提示的辅助函数

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 只写入日志文件的 target，终端输出由调用方负责
pub const FILE_ONLY_TARGET: &str = "cv_tailor::file_only";

/// 初始化日志
///
/// 终端输出级别来自 `RUST_LOG`（默认 `info`，`verbose_logging` 时为 `debug`），
/// 日志文件始终记录本 crate 的 `debug` 级别
///
/// # 参数
/// - `config`: 程序配置
pub fn init(config: &Config) -> AppResult<()> {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| AppError::file_write_failed(log_path.display().to_string(), e))?;
    let log_header = format!(
        "{}\n简历裁剪日志 - {}\n{}\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    file.write_all(log_header.as_bytes())
        .map_err(|e| AppError::file_write_failed(log_path.display().to_string(), e))?;

    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let console_filter = without_file_only(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    )?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_filter(EnvFilter::new("info,cv_tailor=debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Other(format!("日志初始化失败: {}", e)))?;

    Ok(())
}

/// 终端过滤器屏蔽 `FILE_ONLY_TARGET`
fn without_file_only(filter: EnvFilter) -> AppResult<EnvFilter> {
    let directive = format!("{}=off", FILE_ONLY_TARGET)
        .parse::<Directive>()
        .map_err(|e| AppError::Other(format!("日志过滤配置无效: {}", e)))?;
    Ok(filter.add_directive(directive))
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 简历裁剪模式");
    info!("🤖 裁剪模型: {}", config.llm_model_name);
    info!("🗂️ 中间产物目录: {}", config.tmp_dir);
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始信息
///
/// # 参数
/// - `stage`: 阶段名称
pub fn log_stage_start(stage: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 开始阶段: {}", stage);
    info!("{}", "─".repeat(60));
}

/// 打印最终结果
///
/// # 参数
/// - `pdf_path`: 导出的 PDF 路径
/// - `attempt`: 最终采用的收缩次数
/// - `log_path`: 日志文件路径
pub fn print_final_summary(pdf_path: &str, attempt: usize, log_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 已导出: {} (收缩 {} 次)", pdf_path, attempt);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_path);
}

/// 创建终端 spinner
///
/// # 参数
/// - `message`: 初始提示
///
/// # 返回
/// 已开始转动的进度条，调用方负责 `finish_*`
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    sp.set_message(message.into());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
