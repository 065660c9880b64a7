//! 页面探针 - 基础设施层
//!
//! 持有一个 page 资源，只暴露"装载内容 / 执行 JS / 导出 PDF"的能力

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, BrowserError};

/// 页面探针
///
/// 职责：
/// - 持有唯一的 Page 资源，`close` 时释放
/// - 不认识 Cv / JobDescription
/// - 不处理业务流程
pub struct PageProbe {
    page: Page,
}

impl PageProbe {
    /// 创建新的页面探针
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 设置 User-Agent
    pub async fn set_user_agent(&self, user_agent: &str) -> AppResult<()> {
        self.page
            .set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await?;
        Ok(())
    }

    /// 导航到指定 URL 并等待加载完成
    pub async fn goto(&self, url: &str) -> AppResult<()> {
        self.page.goto(url).await.map_err(|e| {
            AppError::Browser(BrowserError::NavigationFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;
        debug!("页面已加载: {}", url);
        Ok(())
    }

    /// 用给定 HTML 替换页面内容
    pub async fn set_content(&self, html: &str) -> AppResult<()> {
        self.page.set_content(html).await?;
        Ok(())
    }

    /// 当前页面的完整 HTML
    pub async fn html(&self) -> AppResult<String> {
        Ok(self.page.content().await?)
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        result.into_value().map_err(|e| {
            AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })
        })
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value).map_err(|e| {
            AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })
        })
    }

    /// 打印为 PDF 并写入文件
    pub async fn save_pdf(&self, params: PrintToPdfParams, path: &Path) -> AppResult<()> {
        self.page.save_pdf(params, path).await.map_err(|e| {
            AppError::Browser(BrowserError::PdfExportFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(())
    }

    /// 关闭页面，释放资源
    ///
    /// 关闭失败只记录警告
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            warn!("⚠️ 关闭页面失败: {}", e);
        }
    }
}
