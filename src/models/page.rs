//! 页面尺寸与测量结果

use serde::{Deserialize, Serialize};

/// CSS 像素 / 毫米（96 dpi）
pub const PX_PER_MM: f64 = 96.0 / 25.4;
/// 英寸 / 毫米（PDF 打印参数使用英寸）
pub const INCH_PER_MM: f64 = 1.0 / 25.4;

/// 固定物理页面
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_right_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
}

impl PageDimensions {
    /// A4，上 12mm / 右 12mm / 下 14mm / 左 12mm
    pub const A4: PageDimensions = PageDimensions {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_top_mm: 12.0,
        margin_right_mm: 12.0,
        margin_bottom_mm: 14.0,
        margin_left_mm: 12.0,
    };

    pub fn width_px(&self) -> f64 {
        (self.width_mm * PX_PER_MM).round()
    }

    pub fn height_px(&self) -> f64 {
        (self.height_mm * PX_PER_MM).round()
    }

    /// 页面高度减去上下边距
    pub fn usable_height_px(&self) -> f64 {
        self.height_px() - (self.margin_top_mm + self.margin_bottom_mm) * PX_PER_MM
    }

    /// 可打印宽度（毫米），渲染时内容按此宽度排版
    pub fn printable_width_mm(&self) -> f64 {
        self.width_mm - self.margin_left_mm - self.margin_right_mm
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::A4
    }
}

/// 一次渲染测量的结果
///
/// 每次尝试重新计算，不持久化
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeasurement {
    pub content_height: f64,
    pub usable_height: f64,
    pub page_count: u32,
    pub exceeds_one_page: bool,
}

impl PageMeasurement {
    /// 根据内容高度和可用高度计算页数
    pub fn from_heights(content_height: f64, usable_height: f64) -> Self {
        let page_count = if usable_height > 0.0 {
            (content_height / usable_height).ceil().max(1.0) as u32
        } else {
            1
        };
        Self {
            content_height,
            usable_height,
            page_count,
            exceeds_one_page: content_height > usable_height,
        }
    }

    /// 按页面尺寸计算
    pub fn measure(content_height: f64, page: &PageDimensions) -> Self {
        Self::from_heights(content_height, page.usable_height_px())
    }
}
