// Application state: slices that mirror API results for whatever front end renders them.

pub mod auth;
pub mod notifications;
pub mod profile;
pub mod scholarships;

pub use auth::AuthState;
pub use notifications::NotificationState;
pub use profile::ProfileState;
pub use scholarships::ScholarshipState;

use crate::core::client::ApiClient;
use crate::domain::ports::{Navigator, TokenStore};
use crate::utils::error::{ClientError, ErrorCategory, Result};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Store {
    pub auth: AuthState,
    pub profile: ProfileState,
    pub scholarships: ScholarshipState,
    pub notifications: NotificationState,
}

impl Store {
    pub async fn restore<S: TokenStore, N: Navigator>(client: &ApiClient<S, N>) -> Result<Self> {
        Ok(Self {
            auth: AuthState::restore(client).await?,
            ..Default::default()
        })
    }

    /// 丟棄所有記憶體中的狀態，用於 session 被強制結束之後
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// session 已遺失時重置狀態，回傳是否有重置
    pub fn handle_error(&mut self, error: &ClientError) -> bool {
        if error.category() != ErrorCategory::SessionLost {
            return false;
        }
        tracing::debug!("Session lost, discarding application state");
        self.reset();
        true
    }
}
