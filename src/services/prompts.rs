//! 提示词
//!
//! 发给模型的文本保持英文，与简历语言一致

use serde::Serialize;

use crate::models::{Cv, JobDescription};

pub const JD_EXTRACTION_SYSTEM: &str = "
You are an expert at structured data extraction of job descriptions.
You will be given semi-structured html text from a website representing a job description.
You will need to extract and convert into given structure. Do not modify the original text.
";

pub const TITLES_SYSTEM: &str = "
You'll be given multiple possible titles for the CV.
Choose the best 3 titles that match the job description.
Optimise the chosen titles to make them more relevant to the job description.
You can modify the titles but only based on profile and work achievements, maintain truthfulness.
Give recommendations for the gaps and unconfirmed suggestions only for the titles, not for the CV as a whole.
Keep language of the titles aligned with the job description language.

Formatting:
- Maximum 3 titles
- Every title length can be maximum 30 characters
- Every title is unique to further joining to a '|' separated string.
- Do not use long dashes, prefer comma if needed.
- Do not repeat terms across titles.
";

pub const WORK_SYSTEM: &str = r#"
You'll be given a work experience for the CV, the CV itself and the Job Description.
Optimise the work experience of the original CV based on the job description analysis.
You can modify the work experience but only based on work experience and work achievements, maintain truthfulness.
Use the analysed job description to make the work experience more relevant to the job description.
Use ATS keywords, tech stack, key requirements and key skills to make the work experience more relevant to the job description.
Keep language of the work experience aligned with the job description language.

Optimise:
1. Achievements: 150 characters max each
2. Stack: 18 characters max each, one term per item. Example: Wrong: "AWS (CDK, Lambda)", Correct: "AWS", "CDK", "Lambda"
"#;

/// 开启对话的系统消息
pub fn seed_system(language: &str, tone: &str) -> String {
    format!(
        "
You are a CV optimiser. Keep facts honest; do not invent.
Prefer metrics, action verbs, and ATS-friendly phrasing.

Guidelines:
- Language: {language}
- Tone: {tone}
- Preserve the original structure and formatting intent
- Use action verbs and quantifiable achievements
- Incorporate relevant keywords naturally
- Maintain truthfulness - enhance but don't fabricate

The optimisation should:
1. Align content with job requirements
2. Improve keyword relevance
3. Enhance readability and impact
4. Maintain professional authenticity
5. Respect character limits
"
    )
}

/// 开启对话的用户消息
pub fn seed_user(jd: &JobDescription) -> String {
    let mut prompt = format!(
        "Here is the job description that you need to optimise the CV for.\n\nStructured job description:\n{}\n",
        to_json(&jd.structured)
    );
    if let Some(notes) = &jd.structured.tone_notes {
        prompt.push_str(&format!("\nTone notes from the job description: {}\n", notes));
    }
    prompt
}

/// 简介阶段的系统消息
///
/// # 参数
/// - `max_chars`: 简介字数上限，下限取其 3/4
pub fn profile_system(max_chars: usize) -> String {
    let min_chars = max_chars * 3 / 4;
    format!(
        "
You'll be given a profile for the CV, the CV itself and the Job Description.
Optimise the profile of the CV based on the job description.
You can modify the profile but only based on profile and work achievements, maintain truthfulness.
Use the analysed job description to make the profile more relevant to the job description.
Use ATS keywords, tech stack, key requirements and key skills to make the profile more relevant to the job description.
Keep language of the profile aligned with the job description language.

Formatting:
- Between {min_chars} and {max_chars} characters
"
    )
}

/// 各阶段共用的用户消息
///
/// # 参数
/// - `section_label`: 待优化部分的说明
/// - `section`: 待优化部分（序列化为 JSON）
/// - `feedback`: 评审者对上一次结果的反馈
pub fn stage_user_prompt<S: Serialize + ?Sized>(
    jd: &JobDescription,
    cv: &Cv,
    section_label: &str,
    section: &S,
    feedback: Option<&[String]>,
) -> Vec<String> {
    let mut parts = vec![
        "The job description analysed:".to_string(),
        to_json(&jd.structured),
        "Original CV:".to_string(),
        to_json(cv),
        section_label.to_string(),
        to_json(section),
    ];
    if let Some(feedback) = feedback {
        parts.push("The feedback received for the previous response:".to_string());
        parts.push(to_json(feedback));
    }
    parts
}

fn to_json<S: Serialize + ?Sized>(value: &S) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
