use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 启动本地浏览器
///
/// # 参数
/// - `chromium_path`: 可执行文件路径；为 `None` 时由 chromiumoxide 自行查找
/// - `headless`: 是否无头（`--visualise-scraping` 时为 false）
///
/// # 返回
/// 浏览器实例和后台事件循环的句柄
pub async fn launch_browser(
    chromium_path: Option<&str>,
    headless: bool,
) -> AppResult<(Browser, JoinHandle<()>)> {
    info!(
        "🚀 启动{}浏览器...",
        if headless { "无头" } else { "可视化" }
    );

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = chromium_path {
        debug!("Chromium 路径: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder
        .window_size(1920, 1080)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            AppError::Browser(BrowserError::LaunchFailed { message: e })
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed {
            message: e.to_string(),
        })
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok((browser, handle))
}
