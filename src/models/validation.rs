//! 简历结构校验
//!
//! 在反序列化之前遍历 YAML 树，一次收集所有问题（字段路径、期望类型、实际类型），
//! 而不是在第一个错误处停下

use colored::Colorize;
use serde_yaml::Value;

use crate::error::{ValidationIssue, ValidationReport};
use crate::models::cv::ContactType;

/// 标题数量上限
pub const MAX_TITLES: usize = 3;

/// 校验简历 YAML 树
///
/// # 返回
/// 所有发现的问题；为空表示结构合法
pub fn validate_cv_value(root: &Value) -> Vec<ValidationIssue> {
    let mut v = Validator::default();

    if !root.is_mapping() {
        v.type_mismatch("root", "mapping", root);
        return v.issues;
    }

    v.required_string(root, "", "name");
    v.required_string(root, "", "location");
    v.required_string(root, "", "profile");

    if let Some(titles) = v.required_sequence(root, "", "titles") {
        if titles.len() > MAX_TITLES {
            v.issues.push(
                ValidationIssue::new("titles", format!("最多允许 {} 个标题", MAX_TITLES))
                    .expected(format!("<= {}", MAX_TITLES), titles.len().to_string()),
            );
        }
        v.string_items(titles, "titles");
    }

    if let Some(contacts) = v.required_sequence(root, "", "contacts") {
        for (i, contact) in contacts.iter().enumerate() {
            let path = format!("contacts.{}", i);
            if !contact.is_mapping() {
                v.type_mismatch(&path, "mapping", contact);
                continue;
            }
            match contact.get("type") {
                Some(Value::String(t)) if ContactType::ALL.contains(&t.as_str()) => {}
                Some(other) => v.issues.push(
                    ValidationIssue::new(format!("{}.type", path), "无效的联系方式类型")
                        .expected(ContactType::ALL.join(" | "), describe(other)),
                ),
                None => v.missing(&format!("{}.type", path), ContactType::ALL.join(" | ")),
            }
            v.required_string(contact, &path, "value");
        }
    }

    if let Some(work) = v.required_sequence(root, "", "work") {
        for (i, entry) in work.iter().enumerate() {
            let path = format!("work.{}", i);
            if !entry.is_mapping() {
                v.type_mismatch(&path, "mapping", entry);
                continue;
            }
            v.required_string(entry, &path, "company");
            v.required_string(entry, &path, "position");
            v.optional_string(entry, &path, "description");
            v.optional_string(entry, &path, "link");
            v.optional_string(entry, &path, "location");
            v.required_year(entry, &path, "start");
            v.required_year(entry, &path, "end");
            if let Some(achievements) = v.required_sequence(entry, &path, "achievements") {
                v.string_items(achievements, &format!("{}.achievements", path));
            }
            match entry.get("stack") {
                None | Some(Value::Null) => {}
                Some(Value::Sequence(stack)) => v.string_items(stack, &format!("{}.stack", path)),
                Some(other) => v.type_mismatch(&format!("{}.stack", path), "sequence", other),
            }
        }
    }

    if let Some(education) = v.required_sequence(root, "", "education") {
        for (i, entry) in education.iter().enumerate() {
            let path = format!("education.{}", i);
            if !entry.is_mapping() {
                v.type_mismatch(&path, "mapping", entry);
                continue;
            }
            v.required_string(entry, &path, "title");
            v.required_string(entry, &path, "school");
            v.optional_string(entry, &path, "location");
            v.optional_string(entry, &path, "description");
            v.optional_year(entry, &path, "end");
        }
    }

    match root.get("extras") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(extras)) => {
            for (i, entry) in extras.iter().enumerate() {
                let path = format!("extras.{}", i);
                if !entry.is_mapping() {
                    v.type_mismatch(&path, "mapping", entry);
                    continue;
                }
                v.required_string(entry, &path, "title");
                v.optional_string(entry, &path, "organization");
                v.optional_string(entry, &path, "location");
                v.optional_string(entry, &path, "description");
                v.optional_year(entry, &path, "start");
                v.optional_year(entry, &path, "end");
            }
        }
        Some(other) => v.type_mismatch("extras", "sequence", other),
    }

    v.issues
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn type_mismatch(&mut self, path: &str, expected: &str, received: &Value) {
        self.issues.push(
            ValidationIssue::new(path, format!("期望 {}", expected))
                .expected(expected, describe(received)),
        );
    }

    fn missing(&mut self, path: &str, expected: impl Into<String>) {
        self.issues
            .push(ValidationIssue::new(path, "缺少必填字段").expected(expected, "undefined"));
    }

    fn required_string(&mut self, parent: &Value, base: &str, key: &str) {
        let path = join(base, key);
        match parent.get(key) {
            Some(Value::String(_)) => {}
            Some(other) => self.type_mismatch(&path, "string", other),
            None => self.missing(&path, "string"),
        }
    }

    fn optional_string(&mut self, parent: &Value, base: &str, key: &str) {
        match parent.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => self.type_mismatch(&join(base, key), "string", other),
        }
    }

    fn required_year(&mut self, parent: &Value, base: &str, key: &str) {
        let path = join(base, key);
        match parent.get(key) {
            Some(Value::String(_)) | Some(Value::Number(_)) => {}
            Some(other) => self.type_mismatch(&path, "string | number", other),
            None => self.missing(&path, "string | number"),
        }
    }

    fn optional_year(&mut self, parent: &Value, base: &str, key: &str) {
        match parent.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Number(_)) => {}
            Some(other) => self.type_mismatch(&join(base, key), "string | number", other),
        }
    }

    fn required_sequence<'a>(
        &mut self,
        parent: &'a Value,
        base: &str,
        key: &str,
    ) -> Option<&'a Vec<Value>> {
        let path = join(base, key);
        match parent.get(key) {
            Some(Value::Sequence(items)) => Some(items),
            Some(other) => {
                self.type_mismatch(&path, "sequence", other);
                None
            }
            None => {
                self.missing(&path, "sequence");
                None
            }
        }
    }

    fn string_items(&mut self, items: &[Value], base: &str) {
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.type_mismatch(&format!("{}.{}", base, i), "string", item);
            }
        }
    }
}

fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
    .to_string()
}

/// 格式化校验报告用于终端输出
///
/// # 参数
/// - `report`: 校验报告
/// - `use_colors`: 是否着色（非终端输出时关闭）
pub fn format_report(report: &ValidationReport, use_colors: bool) -> String {
    let paint = |text: String, f: fn(&str) -> colored::ColoredString| -> String {
        if use_colors {
            f(&text).to_string()
        } else {
            text
        }
    };

    let count = report.issues.len();
    let mut lines = vec![
        paint(format!("Validation Failed ({})", report.file), |s| s.red()),
        format!(
            "{}\n",
            paint(
                format!("{} error{} found:", count, if count > 1 { "s" } else { "" }),
                |s| s.yellow()
            )
        ),
    ];

    for (index, issue) in report.issues.iter().enumerate() {
        lines.push(format!(
            "  {} {}",
            paint(format!("[{}]", index + 1), |s| s.red()),
            paint(issue.path.clone(), |s| s.cyan())
        ));
        lines.push(format!(
            "      {}",
            paint(issue.message.clone(), |s| s.bright_red())
        ));
        if let (Some(expected), Some(received)) = (&issue.expected, &issue.received) {
            lines.push(format!(
                "      Expected: {}",
                paint(expected.clone(), |s| s.green())
            ));
            lines.push(format!(
                "      Received: {}",
                paint(received.clone(), |s| s.red())
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    const VALID: &str = r#"
name: Jane Doe
titles: [Backend Engineer, Rust Developer]
contacts:
  - type: email
    value: jane@example.com
location: London
profile: Builds reliable systems.
work:
  - company: Acme
    position: Engineer
    start: 2020
    end: Present
    achievements: [Did a thing, Did another]
    stack: [Rust]
education:
  - title: BSc Computer Science
    school: Uni
    end: 2015
"#;

    #[test]
    fn test_valid_cv_has_no_issues() {
        assert!(validate_cv_value(&parse(VALID)).is_empty());
    }

    #[test]
    fn test_collects_every_issue_with_paths() {
        let yaml = r#"
name: 42
titles: [a, b, c, d]
contacts:
  - type: fax
    value: "123"
location: London
work:
  - company: Acme
    start: 2020
    end: 2021
    achievements: "not a list"
education: []
"#;
        let issues = validate_cv_value(&parse(yaml));
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();

        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"profile"));
        assert!(paths.contains(&"titles"));
        assert!(paths.contains(&"contacts.0.type"));
        assert!(paths.contains(&"work.0.position"));
        assert!(paths.contains(&"work.0.achievements"));

        let name = issues.iter().find(|i| i.path == "name").unwrap();
        assert_eq!(name.expected.as_deref(), Some("string"));
        assert_eq!(name.received.as_deref(), Some("number"));

        let profile = issues.iter().find(|i| i.path == "profile").unwrap();
        assert_eq!(profile.received.as_deref(), Some("undefined"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let issues = validate_cv_value(&parse("- just\n- a list\n"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "root");
    }

    #[test]
    fn test_format_report_plain() {
        let report = ValidationReport {
            file: "cv.yaml".to_string(),
            issues: vec![ValidationIssue::new("name", "期望 string").expected("string", "number")],
        };
        let text = format_report(&report, false);
        assert!(text.starts_with("Validation Failed (cv.yaml)"));
        assert!(text.contains("1 error found:"));
        assert!(text.contains("[1] name"));
        assert!(text.contains("Expected: string"));
        assert!(text.contains("Received: number"));
    }
}
