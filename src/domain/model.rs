use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub country: String,
    pub age: Option<u32>,
    pub role: UserRole,
    #[serde(default)]
    pub is_email_verified: bool,
}

/// login 與 register 共用的回應格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user: i64,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub degree_level: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub target_country: String,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub ielts_score: Option<f64>,
    pub toefl_score: Option<i32>,
    pub gre_score: Option<i32>,
    pub gmat_score: Option<i32>,
    #[serde(default)]
    pub income_range: String,
    #[serde(default)]
    pub need_based_preference: bool,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub holland_code: String,
    pub profile_picture: Option<String>,
}

/// PATCH 用的部分更新，`None` 欄位不送出
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ielts_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toefl_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gre_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmat_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_based_preference: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holland_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Career {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub average_salary: Option<f64>,
    #[serde(default)]
    pub growth_rate: String,
}

/// 已儲存的推薦紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub id: i64,
    pub career: Career,
    pub confidence_score: f64,
    #[serde(default)]
    pub model_used: String,
    pub rank: u32,
}

/// `recommend` 即時產生的推薦
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerSuggestion {
    pub career: String,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerSuggestions {
    pub top_careers: Vec<CareerSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub eligibility: String,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub funding_amount: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarshipMatch {
    pub scholarship: Scholarship,
    pub relevance_score: f64,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarshipMatches {
    pub matches: Vec<ScholarshipMatch>,
}

/// 列表查詢參數，`None` 不會出現在 query string
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScholarshipQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

/// DRF 分頁回應
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    NotStarted,
    InProgress,
    Submitted,
    Accepted,
    Rejected,
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub user: i64,
    pub scholarship: Scholarship,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub scholarship_id: i64,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub user: i64,
    pub scholarship: Scholarship,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMatch,
    DeadlineApproaching,
    ProfileIncomplete,
    ApplicationReminder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user: i64,
    pub notification_type: NotificationType,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub scholarship_id: Option<i64>,
    pub application_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}

// DRF 的 DecimalField 預設序列化成字串 ("3.50")，這裡兩種都接受
fn decimal_opt<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_accepts_decimal_strings() {
        let profile: Profile = serde_json::from_value(json!({
            "id": 1,
            "user": 7,
            "gpa": "3.75",
            "ielts_score": 7.5,
            "toefl_score": null,
            "gre_score": 320,
            "gmat_score": null,
            "degree_level": "Master's",
            "major": "Computer Science",
            "technical_skills": ["rust", "sql"]
        }))
        .unwrap();

        assert_eq!(profile.gpa, Some(3.75));
        assert_eq!(profile.ielts_score, Some(7.5));
        assert_eq!(profile.gre_score, Some(320));
        assert!(profile.soft_skills.is_empty());
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            major: Some("Economics".to_string()),
            interests: Some(vec!["finance".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"major": "Economics", "interests": ["finance"]})
        );
    }

    #[test]
    fn test_application_status_wire_format() {
        let new_application = NewApplication {
            scholarship_id: 42,
            status: ApplicationStatus::default(),
        };
        assert_eq!(
            serde_json::to_value(&new_application).unwrap(),
            json!({"scholarship_id": 42, "status": "not_started"})
        );
        assert_eq!(
            "in_progress".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::InProgress)
        );
        assert!("done".parse::<ApplicationStatus>().is_err());
    }
}
