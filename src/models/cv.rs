use serde::{Deserialize, Deserializer, Serialize};

/// 联系方式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Phone,
    Email,
    Github,
    Linkedin,
    Website,
}

impl ContactType {
    pub const ALL: [&'static str; 5] = ["phone", "email", "github", "linkedin", "website"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Phone => "phone",
            ContactType::Email => "email",
            ContactType::Github => "github",
            ContactType::Linkedin => "linkedin",
            ContactType::Website => "website",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub value: String,
}

/// 工作经历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub start: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub end: String,
    pub achievements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub title: String,
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 课外经历 / 公益活动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extras {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 简历文档
///
/// 顶层字段顺序即渲染顺序；合并只会改动各字段内部的条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cv {
    pub name: String,
    /// 最多 3 个
    pub titles: Vec<String>,
    pub contacts: Vec<Contact>,
    pub location: String,
    pub profile: String,
    pub work: Vec<WorkExperience>,
    pub education: Vec<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Extras>>,
}

impl Cv {
    /// 所有工作经历的成就总数
    pub fn achievement_count(&self) -> usize {
        self.work.iter().map(|w| w.achievements.len()).sum()
    }
}

/// 自定义反序列化函数：处理年份可能是字符串或数字的情况
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct StringOrNumberVisitor;

    impl<'de> Visitor<'de> for StringOrNumberVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

fn deserialize_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Year(#[serde(deserialize_with = "deserialize_string_or_number")] String);

    Ok(Option::<Year>::deserialize(deserializer)?.map(|Year(value)| value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_accept_strings_and_numbers() {
        let yaml = r#"
company: Acme
position: Engineer
start: 2019
end: Present
achievements: [Shipped things]
"#;
        let work: WorkExperience = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(work.start, "2019");
        assert_eq!(work.end, "Present");
        assert_eq!(work.stack, None);

        let edu: Education =
            serde_yaml::from_str("title: BSc\nschool: Uni\nend: 2015\n").unwrap();
        assert_eq!(edu.end.as_deref(), Some("2015"));

        let edu: Education = serde_yaml::from_str("title: BSc\nschool: Uni\nend: null\n").unwrap();
        assert_eq!(edu.end, None);
    }
}
