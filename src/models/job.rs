use serde::{Deserialize, Serialize};

use crate::models::tailored::StructuredResponse;

/// 职位描述语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JdLanguage {
    #[serde(rename = "EN_UK")]
    EnUk,
    #[serde(rename = "EN_US")]
    EnUs,
    #[serde(rename = "OTHER")]
    Other,
}

/// 招聘系统（ATS）类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsType {
    Greenhouse,
    Lever,
    Workable,
    Indeed,
    Ziprecruiter,
    Bamboohr,
    Icims,
    Taleo,
    Adp,
    Smartrecruiters,
    Bullhorn,
    Jazzhr,
    Breezyhr,
    Recruitee,
    Ashby,
    Jobvite,
    Successfactors,
    Hibob,
    Rippling,
    Gusto,
    Other,
}

/// 抽取后的结构化职位描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredJob {
    pub job_title: String,
    pub job_description: String,
    pub tech_stack: Vec<String>,
    pub key_requirements: Vec<String>,
    pub key_skills: Vec<String>,
    pub industry_context: String,
    pub company_name: String,
    pub company_country: String,
    pub office_country: String,
    pub location: String,
    pub language: JdLanguage,
    pub ats_keywords: Vec<String>,
    pub ats_type: AtsType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ats_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_notes: Option<String>,
}

/// 职位描述（结构化结果 + 原文 + 创建时间）
///
/// `--jd` 读取的 JSON 文件即此结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub structured: StructuredJob,
    pub raw: String,
    /// ISO-8601
    pub created_at: String,
}

impl JobDescription {
    /// 审计文件和默认输出名共用的标识：`<title>-at-<company>-<createdAt>`
    pub fn slug(&self) -> String {
        format!(
            "{}-at-{}-{}",
            self.structured.job_title, self.structured.company_name, self.created_at
        )
    }
}

impl StructuredResponse for StructuredJob {
    const NAME: &'static str = "job description";
    const SCHEMA: &'static str = r#"{
  "jobTitle": string,
  "jobDescription": string,
  "techStack": string[],
  "keyRequirements": string[],
  "keySkills": string[],
  "industryContext": string,        // industry context of the job and the company
  "companyName": string,
  "companyCountry": string,
  "officeCountry": string,
  "location": string,
  "language": "EN_UK" | "EN_US" | "OTHER",
  "atsKeywords": string[],          // keywords that should be used to optimise the CV
  "atsType": "greenhouse" | "lever" | "workable" | "indeed" | "ziprecruiter" | "bamboohr" | "icims" | "taleo" | "adp" | "smartrecruiters" | "bullhorn" | "jazzhr" | "breezyhr" | "recruitee" | "ashby" | "jobvite" | "successfactors" | "hibob" | "rippling" | "gusto" | "other",
  "customAtsType": string | null,   // name of the ATS when atsType is "other"
  "toneNotes": string | null        // tone notes that should be used to optimise the CV
}"#;
}
