use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, FileError, ValidationIssue, ValidationReport};
use crate::models::cv::Cv;
use crate::models::job::JobDescription;
use crate::models::validation::validate_cv_value;

/// 从 YAML 文件加载简历
///
/// 结构问题全部收集到 `AppError::Validation` 中返回，不会进入裁剪流程
pub async fn load_cv(path: &Path) -> AppResult<Cv> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let cv = parse_cv(&content, &path.display().to_string())?;
    debug!(
        "已加载简历: {} ({} 段工作经历, {} 条成就)",
        cv.name,
        cv.work.len(),
        cv.achievement_count()
    );
    Ok(cv)
}

/// 解析并校验简历 YAML 文本
///
/// # 参数
/// - `content`: YAML 文本
/// - `source`: 来源名称（用于报告）
pub fn parse_cv(content: &str, source: &str) -> AppResult<Cv> {
    let report = |issues: Vec<ValidationIssue>| {
        AppError::Validation(ValidationReport {
            file: source.to_string(),
            issues,
        })
    };

    let value: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| report(vec![ValidationIssue::new("root", format!("YAML 语法错误: {}", e))]))?;

    let issues = validate_cv_value(&value);
    if !issues.is_empty() {
        return Err(report(issues));
    }

    serde_yaml::from_value(value).map_err(|e| report(vec![ValidationIssue::new("root", e.to_string())]))
}

/// 从 JSON 文件加载已抽取的职位描述（`--jd`）
pub async fn load_job_description(path: &Path) -> AppResult<JobDescription> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let jd: JobDescription = serde_json::from_str(&content).map_err(|e| {
        AppError::File(FileError::JsonParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })?;
    debug!(
        "已加载职位描述: {} @ {}",
        jd.structured.job_title, jd.structured.company_name
    );
    Ok(jd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CV_YAML: &str = r#"
name: Jane Doe
titles: [Backend Engineer]
contacts:
  - type: github
    value: janedoe
location: London
profile: Builds reliable systems.
work:
  - company: Acme
    position: Engineer
    start: 2020
    end: Present
    achievements: [One, Two, Three]
education: []
"#;

    #[tokio::test]
    async fn test_load_cv_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", CV_YAML).unwrap();

        let cv = load_cv(file.path()).await.unwrap();
        assert_eq!(cv.name, "Jane Doe");
        assert_eq!(cv.work[0].start, "2020");
        assert_eq!(cv.achievement_count(), 3);
        assert_eq!(cv.extras, None);
    }

    #[test]
    fn test_invalid_cv_reports_issues() {
        let err = parse_cv("name: Jane\ntitles: Engineer\n", "cv.yaml").unwrap_err();
        match err {
            AppError::Validation(report) => {
                assert_eq!(report.file, "cv.yaml");
                assert!(report.issues.iter().any(|i| i.path == "titles"));
                assert!(report.issues.iter().any(|i| i.path == "work"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_yaml_syntax_error_is_validation_failure() {
        let err = parse_cv("name: [unclosed", "cv.yaml").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_cv_file() {
        let err = load_cv(Path::new("/definitely/not/here.yaml")).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::ReadFailed { .. })));
    }
}
