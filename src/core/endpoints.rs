//! path2prep 後端的各個 API。

use crate::core::client::ApiClient;
use crate::core::request::{ApiRequest, FilePart};
use crate::domain::model::{
    Application, ApplicationStatus, ApplicationUpdate, AuthResponse, Bookmark,
    CareerRecommendation, CareerSuggestions, NewApplication, Notification, Page, Profile,
    ProfileUpdate, Scholarship, ScholarshipMatches, ScholarshipQuery, UnreadCount, User,
};
use crate::domain::ports::{Navigator, TokenStore};
use crate::domain::session::{Session, TokenSlot};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_MATCH_COUNT: u32 = 5;
const MAX_MATCH_COUNT: u32 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("email", &self.email)?;
        validate_non_empty_string("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("email", &self.email)?;
        validate_non_empty_string("password", &self.password)?;
        if self.password != self.password_confirm {
            return Err(ClientError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

impl<S: TokenStore, N: Navigator> ApiClient<S, N> {
    // Authentication

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        let response: AuthResponse = self
            .request(ApiRequest::post("/auth/login/").json(&credentials)?)
            .await?;
        self.start_session(&Session::new(&response.access, &response.refresh))
            .await?;

        tracing::info!("Signed in as {}", response.user.username);
        Ok(response)
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthResponse> {
        registration.validate()?;

        let response: AuthResponse = self
            .request(ApiRequest::post("/auth/users/register/").json(registration)?)
            .await?;
        self.start_session(&Session::new(&response.access, &response.refresh))
            .await?;

        tracing::info!("Registered {}", response.user.username);
        Ok(response)
    }

    /// 通知後端作廢 refresh token，無論結果如何都清除本地 session
    pub async fn logout(&self) -> Result<()> {
        let outcome = match self.store().read(TokenSlot::Refresh).await? {
            Some(refresh_token) => {
                self.request_empty(
                    ApiRequest::post("/auth/users/logout/")
                        .json(&json!({ "refresh_token": refresh_token }))?,
                )
                .await
            }
            None => Ok(()),
        };

        self.end_session().await?;
        if let Err(e) = &outcome {
            tracing::warn!("Logout request failed, local session cleared anyway: {}", e);
        }
        outcome
    }

    pub async fn current_user(&self) -> Result<User> {
        self.request(ApiRequest::get("/auth/users/me/")).await
    }

    // Profile

    pub async fn get_profile(&self) -> Result<Profile> {
        self.request(ApiRequest::get("/profiles/me/")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        self.request(ApiRequest::patch("/profiles/me/").json(update)?)
            .await
    }

    pub async fn create_profile(&self, profile: &ProfileUpdate) -> Result<Profile> {
        self.request(ApiRequest::post("/profiles/profiles/").json(profile)?)
            .await
    }

    pub async fn upload_profile_picture(
        &self,
        file_name: &str,
        content: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<Profile> {
        let part = FilePart {
            field: "profile_picture".to_string(),
            file_name: file_name.to_string(),
            content,
            mime: mime.map(str::to_string),
        };
        self.request(ApiRequest::patch("/profiles/me/").file(part))
            .await
    }

    // Career recommendations

    pub async fn recommend_careers(&self) -> Result<CareerSuggestions> {
        self.request(ApiRequest::post("/recommend-career/recommend/"))
            .await
    }

    pub async fn my_recommendations(&self) -> Result<Vec<CareerRecommendation>> {
        self.request(ApiRequest::get("/recommend-career/my_recommendations/"))
            .await
    }

    // Scholarships

    pub async fn list_scholarships(&self, query: &ScholarshipQuery) -> Result<Page<Scholarship>> {
        self.request(ApiRequest::get("/scholarships/").query(query)?)
            .await
    }

    pub async fn get_scholarship(&self, id: i64) -> Result<Scholarship> {
        self.request(ApiRequest::get(format!("/scholarships/{}/", id)))
            .await
    }

    /// 相關度由後端計算，`top_k` 預設為 5
    pub async fn match_scholarships(&self, top_k: Option<u32>) -> Result<ScholarshipMatches> {
        let top_k = top_k.unwrap_or(DEFAULT_MATCH_COUNT);
        validate_range("top_k", top_k, 1, MAX_MATCH_COUNT)?;

        self.request(ApiRequest::post("/scholarships/match/").json(&json!({ "top_k": top_k }))?)
            .await
    }

    // Applications

    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        self.request(ApiRequest::get("/applications/")).await
    }

    pub async fn create_application(
        &self,
        scholarship_id: i64,
        status: Option<ApplicationStatus>,
    ) -> Result<Application> {
        let application = NewApplication {
            scholarship_id,
            status: status.unwrap_or_default(),
        };
        self.request(ApiRequest::post("/applications/").json(&application)?)
            .await
    }

    pub async fn update_application(
        &self,
        id: i64,
        update: &ApplicationUpdate,
    ) -> Result<Application> {
        self.request(ApiRequest::patch(format!("/applications/{}/", id)).json(update)?)
            .await
    }

    // Bookmarks

    pub async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.request(ApiRequest::get("/bookmarks/")).await
    }

    pub async fn create_bookmark(&self, scholarship_id: i64) -> Result<Bookmark> {
        self.request(
            ApiRequest::post("/bookmarks/").json(&json!({ "scholarship_id": scholarship_id }))?,
        )
        .await
    }

    pub async fn delete_bookmark(&self, id: i64) -> Result<()> {
        self.request_empty(ApiRequest::delete(format!("/bookmarks/{}/", id)))
            .await
    }

    // Notifications

    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.request(ApiRequest::get("/notifications/")).await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<()> {
        self.request_empty(ApiRequest::post(format!("/notifications/{}/mark_read/", id)))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.request_empty(ApiRequest::post("/notifications/mark_all_read/"))
            .await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let count: UnreadCount = self
            .request(ApiRequest::get("/notifications/unread_count/"))
            .await?;
        Ok(count.unread_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_matching_passwords() {
        let mut registration = RegisterRequest {
            username: "amina".to_string(),
            email: "amina@example.com".to_string(),
            password: "s3cret-pass".to_string(),
            password_confirm: "s3cret-pas".to_string(),
            ..Default::default()
        };
        assert!(registration.validate().is_err());

        registration.password_confirm = registration.password.clone();
        assert!(registration.validate().is_ok());

        registration.username = " ".to_string();
        assert!(registration.validate().is_err());
    }

    #[test]
    fn test_register_payload_omits_optional_fields() {
        let registration = RegisterRequest {
            username: "amina".to_string(),
            email: "amina@example.com".to_string(),
            password: "pw".to_string(),
            password_confirm: "pw".to_string(),
            country: Some("Kenya".to_string()),
            ..Default::default()
        };
        let payload = serde_json::to_value(&registration).unwrap();
        assert_eq!(payload["country"], "Kenya");
        assert!(payload.get("full_name").is_none());
        assert!(payload.get("age").is_none());
    }

    #[test]
    fn test_login_requires_credentials() {
        let credentials = LoginRequest {
            email: String::new(),
            password: "pw".to_string(),
        };
        assert!(credentials.validate().is_err());
    }
}
