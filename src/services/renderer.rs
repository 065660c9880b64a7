//! 简历渲染服务 - 业务能力层
//!
//! 只负责"Cv → 自包含 HTML"能力，样式内联，不依赖外部资源

use phf::phf_map;

use crate::error::AppResult;
use crate::models::{Contact, ContactType, Cv, Education, Extras, PageDimensions, WorkExperience};

/// 渲染能力
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, cv: &Cv) -> AppResult<String>;
}

/// 联系方式 → (链接前缀, 显示前缀)
static CONTACT_LINKS: phf::Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "linkedin" => ("https://linkedin.com/in/", "linkedin.com/in/"),
    "github" => ("https://github.com/", "github.com/"),
    "email" => ("mailto:", ""),
    "phone" => ("tel:+", ""),
};

const BASE_CSS: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
html, body { background: #ffffff; }
body {
    font-family: "Helvetica Neue", Helvetica, Arial, sans-serif;
    font-size: 10pt;
    line-height: 1.25;
    color: #000000;
}
a { color: inherit; text-decoration: none; }
header { text-align: center; line-height: 1.2; margin-bottom: 8pt; }
h1 { font-size: 20pt; font-weight: 700; }
h2 {
    font-size: 12pt;
    font-weight: 700;
    text-transform: uppercase;
    border-bottom: 1px solid #9ca3af;
}
h3 { font-size: 10.5pt; font-weight: 600; }
section { margin-bottom: 8pt; }
.section-title { display: flex; align-items: baseline; justify-content: space-between; margin-bottom: 2pt; }
.section-note { font-size: 8pt; }
.subtitle { font-size: 9pt; color: #4b5563; }
.job { margin-bottom: 10pt; }
.job-head { margin-bottom: 4pt; }
ul { list-style: disc; padding-left: 16pt; margin-bottom: 4pt; }
ul.compact { padding-left: 12pt; }
li { margin-bottom: 2pt; }
.stack-label { font-weight: 600; }
"#;

/// HTML 渲染器
///
/// 内容宽度固定为页面可打印宽度，测量高度与 PDF 排版一致
pub struct HtmlRenderer {
    page: PageDimensions,
}

impl HtmlRenderer {
    pub fn new(page: PageDimensions) -> Self {
        Self { page }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(PageDimensions::A4)
    }
}

impl MarkupRenderer for HtmlRenderer {
    fn render(&self, cv: &Cv) -> AppResult<String> {
        let mut body = String::new();
        body.push_str(&render_header(cv));

        body.push_str(&section("Profile", None, &format!("<p>{}</p>", html_escape(&cv.profile))));

        let jobs: String = cv.work.iter().map(render_job).collect();
        body.push_str(&section(
            "Work Experience",
            Some(&format!("({} recent)", cv.work.len())),
            &jobs,
        ));

        let education: String = cv.education.iter().map(render_education).collect();
        body.push_str(&section(
            "Education",
            None,
            &format!("<ul class=\"compact\">{}</ul>", education),
        ));

        if let Some(extras) = &cv.extras {
            let items: String = extras.iter().map(render_extra).collect();
            body.push_str(&section(
                "Extras and Charity",
                None,
                &format!("<ul class=\"compact\">{}</ul>", items),
            ));
        }

        Ok(format!(
            r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <style>{css}
.page {{ width: {width}mm; }}
  </style>
  <title>{title}</title>
</head>
<body><div class="page">{body}</div></body>
</html>"#,
            css = BASE_CSS,
            width = self.page.printable_width_mm(),
            title = html_escape(&cv.name),
            body = body,
        ))
    }
}

fn section(title: &str, note: Option<&str>, content: &str) -> String {
    let note = note
        .map(|n| format!("<span class=\"section-note\">{}</span>", html_escape(n)))
        .unwrap_or_default();
    format!(
        "<section><div class=\"section-title\"><h2>{}</h2>{}</div><div>{}</div></section>",
        html_escape(title),
        note,
        content
    )
}

fn render_header(cv: &Cv) -> String {
    let contacts: Vec<String> = cv.contacts.iter().map(render_contact).collect();
    format!(
        "<header><h1>{}</h1><p>{}</p><p>{}</p><p>{}</p></header>",
        html_escape(&cv.name),
        html_escape(&cv.titles.join(" | ")),
        contacts.join(" | "),
        html_escape(&cv.location)
    )
}

fn render_contact(contact: &Contact) -> String {
    let value = html_escape(&contact.value);
    match CONTACT_LINKS.get(contact.contact_type.as_str()) {
        Some((href_prefix, label_prefix)) => {
            let target = if contact.contact_type == ContactType::Phone {
                contact.value.chars().filter(char::is_ascii_digit).collect()
            } else {
                contact.value.clone()
            };
            format!(
                "<a href=\"{}{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}{}</a>",
                href_prefix,
                html_escape(&target),
                label_prefix,
                value
            )
        }
        None => value,
    }
}

fn render_job(job: &WorkExperience) -> String {
    let company = match &job.link {
        Some(link) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            html_escape(link),
            html_escape(&job.company)
        ),
        None => html_escape(&job.company),
    };
    let description = job
        .description
        .as_deref()
        .map(|d| format!(", {}", html_escape(d)))
        .unwrap_or_default();
    let location = job
        .location
        .as_deref()
        .map(|l| format!("{}, ", html_escape(l)))
        .unwrap_or_default();
    let achievements: String = job
        .achievements
        .iter()
        .map(|a| format!("<li>{}</li>", html_escape(a)))
        .collect();
    let stack = job
        .stack
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            format!(
                "<p><span class=\"stack-label\">Stack:</span> {}.</p>",
                html_escape(&s.join(", "))
            )
        })
        .unwrap_or_default();

    format!(
        "<div class=\"job\"><div class=\"job-head\"><h3>{} at {}{}</h3><p class=\"subtitle\">{}{} &ndash; {}</p></div><ul>{}</ul>{}</div>",
        html_escape(&job.position),
        company,
        description,
        location,
        html_escape(&job.start),
        html_escape(&job.end),
        achievements,
        stack
    )
}

fn render_education(edu: &Education) -> String {
    let mut item = html_escape(&edu.title);
    if let Some(description) = &edu.description {
        item.push_str(&format!(": {}", html_escape(description)));
    }
    item.push_str(&format!(", {}", html_escape(&edu.school)));
    if let Some(location) = &edu.location {
        item.push_str(&format!(", {}", html_escape(location)));
    }
    if let Some(end) = &edu.end {
        item.push_str(&format!(" &ndash; {}", html_escape(end)));
    }
    format!("<li>{}</li>", item)
}

fn render_extra(extra: &Extras) -> String {
    let mut item = html_escape(&extra.title);
    if let Some(organization) = &extra.organization {
        item.push_str(&format!(" of {}", html_escape(organization)));
    }
    if let Some(description) = &extra.description {
        item.push_str(&format!(". {}", html_escape(description)));
    }
    if let Some(location) = &extra.location {
        item.push_str(&format!(" ({}", html_escape(location)));
    }
    if let Some(start) = &extra.start {
        item.push_str(&format!(", {}", html_escape(start)));
    }
    if let Some(end) = &extra.end {
        item.push_str(&format!(" &ndash; {}", html_escape(end)));
    }
    if extra.location.is_some() {
        item.push(')');
    }
    format!("<li>{}</li>", item)
}

/// 转义 HTML 特殊字符
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
