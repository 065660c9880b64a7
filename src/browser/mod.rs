//! 浏览器资源
//!
//! 配置了调试端口时连接已运行的浏览器，否则启动一个新的

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::PageProbe;

/// 浏览器会话
///
/// 唯一持有 Browser 的结构；自己启动的浏览器在 `shutdown` 时关闭，
/// 连接上的浏览器只断开事件循环
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    owned: bool,
}

impl BrowserSession {
    /// 按配置获取浏览器
    ///
    /// # 参数
    /// - `config`: 程序配置
    /// - `headless`: 启动新浏览器时是否无头
    pub async fn acquire(config: &Config, headless: bool) -> AppResult<Self> {
        let (browser, handler, owned) = match config.browser_debug_port {
            Some(port) => {
                let (browser, handler) = connect_to_browser(port).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) =
                    launch_browser(config.chromium_path.as_deref(), headless).await?;
                (browser, handler, true)
            }
        };
        Ok(Self {
            browser,
            handler,
            owned,
        })
    }

    /// 打开一个新的空白页面
    pub async fn new_probe(&self) -> AppResult<PageProbe> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            AppError::Browser(BrowserError::PageCreationFailed {
                source: Box::new(e),
            })
        })?;
        Ok(PageProbe::new(page))
    }

    /// 释放浏览器
    pub async fn shutdown(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        debug!("浏览器会话已结束");
    }
}
