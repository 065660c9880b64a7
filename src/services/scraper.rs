//! 网页抓取服务 - 业务能力层
//!
//! 只负责"把职位页面变成可读文本"能力

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::browser::BrowserSession;
use crate::error::{AppError, AppResult, BrowserError};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// 整个子树都丢弃的标签
const SKIPPED_TAGS: [&str; 9] = [
    "script", "style", "nav", "header", "footer", "aside", "noscript", "svg", "template",
];

/// 广告 / cookie 提示等区块的 class
const SKIPPED_CLASSES: [&str; 4] = ["advertisement", "ads", "cookie", "social-share"];

/// 结束时换行的块级标签
const BLOCK_TAGS: [&str; 22] = [
    "p", "div", "section", "article", "main", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
    "h6", "tr", "table", "br", "dd", "dt", "dl", "blockquote", "pre",
];

/// 抓取职位页面并提取正文
///
/// 页面在返回前关闭，包括出错的情况
///
/// # 参数
/// - `session`: 浏览器会话
/// - `url`: 职位页面地址
pub async fn scrape_url(session: &BrowserSession, url: &str) -> AppResult<String> {
    info!("🔍 正在抓取职位页面: {}", url);
    let probe = session.new_probe().await?;

    let html = async {
        probe.set_user_agent(USER_AGENT).await?;
        probe.goto(url).await?;
        probe.html().await
    }
    .await;
    probe.close().await;

    let text = extract_text_from_html(&html?)?;
    debug!("抓取完成，正文 {} 字符", text.chars().count());
    Ok(text)
}

/// 从 HTML 中提取可读文本
///
/// 去掉脚本、导航、页眉页脚、广告等区块，压缩空白
pub fn extract_text_from_html(html: &str) -> AppResult<String> {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body")
        .map_err(|e| AppError::Other(format!("无效的选择器: {}", e)))?;
    let body = document
        .select(&body_selector)
        .next()
        .ok_or(AppError::Browser(BrowserError::EmptyBody))?;

    let mut raw = String::new();
    collect_text(body, &mut raw);

    let text = normalise_whitespace(&raw);
    if text.is_empty() {
        return Err(AppError::Browser(BrowserError::EmptyBody));
    }
    Ok(text)
}

fn is_skipped(element: &ElementRef) -> bool {
    let value = element.value();
    SKIPPED_TAGS.contains(&value.name()) || value.classes().any(|c| SKIPPED_CLASSES.contains(&c))
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // 源码中的换行不是段落边界
            out.push_str(&text.replace(|c: char| c == '\n' || c == '\r', " "));
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if is_skipped(&child_element) {
                continue;
            }
            collect_text(child_element, out);
            if BLOCK_TAGS.contains(&child_element.value().name()) {
                out.push('\n');
            }
        }
    }
}

/// 行内空白压缩为一个空格，连续空行最多保留一行，`....` 收敛为 `...`
fn normalise_whitespace(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !lines.is_empty() {
                lines.push(String::new());
            }
            continue;
        }
        blank_run = 0;
        lines.push(collapse_ellipsis(&line));
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn collapse_ellipsis(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut dots = 0;
    for c in line.chars() {
        if c == '.' {
            dots += 1;
            if dots <= 3 {
                out.push(c);
            }
        } else {
            dots = 0;
            out.push(c);
        }
    }
    out
}
