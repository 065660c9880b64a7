//! 页面测量服务 - 业务能力层
//!
//! 只负责"把 HTML 放进固定尺寸页面并量高度 / 导出 PDF"能力

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use tracing::debug;

use crate::browser::BrowserSession;
use crate::error::AppResult;
use crate::models::page::INCH_PER_MM;
use crate::models::{PageDimensions, PageMeasurement};

/// 测量能力
#[async_trait]
pub trait PageMeasurer: Send + Sync {
    /// 渲染 HTML 并测量内容高度
    async fn measure(&self, markup: &str) -> AppResult<PageMeasurement>;
}

/// 内容容器高度；渲染器输出 `.page`，其他 HTML 退回 body
const CONTENT_HEIGHT_JS: &str = r#"(() => {
    const el = document.querySelector('.page') || document.body;
    return Math.ceil(Math.max(el.getBoundingClientRect().height, el.scrollHeight));
})()"#;

/// 基于 Chromium 的测量器
///
/// 每次测量打开一个新页面，测量完成后关闭（出错时同样关闭）
pub struct ChromeMeasurer<'a> {
    session: &'a BrowserSession,
    page: PageDimensions,
}

impl<'a> ChromeMeasurer<'a> {
    pub fn new(session: &'a BrowserSession, page: PageDimensions) -> Self {
        Self { session, page }
    }

    /// 导出 PDF
    ///
    /// # 参数
    /// - `markup`: 最终 HTML
    /// - `path`: 输出文件路径
    pub async fn export_pdf(&self, markup: &str, path: &Path) -> AppResult<()> {
        let probe = self.session.new_probe().await?;
        let result = async {
            probe.set_content(markup).await?;
            probe.save_pdf(self.pdf_params(), path).await
        }
        .await;
        probe.close().await;
        result?;
        debug!("PDF 已写入: {}", path.display());
        Ok(())
    }

    fn pdf_params(&self) -> PrintToPdfParams {
        PrintToPdfParams {
            print_background: Some(true),
            paper_width: Some(self.page.width_mm * INCH_PER_MM),
            paper_height: Some(self.page.height_mm * INCH_PER_MM),
            margin_top: Some(self.page.margin_top_mm * INCH_PER_MM),
            margin_right: Some(self.page.margin_right_mm * INCH_PER_MM),
            margin_bottom: Some(self.page.margin_bottom_mm * INCH_PER_MM),
            margin_left: Some(self.page.margin_left_mm * INCH_PER_MM),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageMeasurer for ChromeMeasurer<'_> {
    async fn measure(&self, markup: &str) -> AppResult<PageMeasurement> {
        let probe = self.session.new_probe().await?;
        let height = async {
            probe.set_content(markup).await?;
            probe.eval_as::<f64>(CONTENT_HEIGHT_JS).await
        }
        .await;
        probe.close().await;

        let measurement = PageMeasurement::measure(height?, &self.page);
        debug!(
            "测量结果: 内容 {:.0}px / 可用 {:.0}px, {} 页",
            measurement.content_height, measurement.usable_height, measurement.page_count
        );
        Ok(measurement)
    }
}
