use crate::core::client::ApiClient;
use crate::core::endpoints::RegisterRequest;
use crate::domain::model::User;
use crate::domain::ports::{Navigator, TokenStore};
use crate::utils::error::Result;
use serde::Serialize;

const LOGIN_FAILED: &str = "Invalid email or password. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// 以 token store 中是否有 access token 作為初始登入狀態
    pub async fn restore<S: TokenStore, N: Navigator>(client: &ApiClient<S, N>) -> Result<Self> {
        Ok(Self {
            is_authenticated: client.has_session().await?,
            ..Default::default()
        })
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub async fn login<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        email: &str,
        password: &str,
    ) -> Result<()> {
        self.loading = true;
        self.error = None;

        let outcome = client.login(email, password).await;
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.user = Some(response.user);
                self.is_authenticated = true;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message(LOGIN_FAILED));
                Err(e)
            }
        }
    }

    pub async fn register<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        registration: &RegisterRequest,
    ) -> Result<()> {
        self.loading = true;
        self.error = None;

        let outcome = client.register(registration).await;
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.user = Some(response.user);
                self.is_authenticated = true;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message(REGISTER_FAILED));
                Err(e)
            }
        }
    }

    /// 本地 session 一定會被清除，因此登出狀態不受請求結果影響
    pub async fn logout<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        let outcome = client.logout().await;
        self.user = None;
        self.is_authenticated = false;
        outcome
    }

    pub async fn fetch_current_user<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        match client.current_user().await {
            Ok(user) => {
                self.user = Some(user);
                self.is_authenticated = true;
                Ok(())
            }
            Err(e) => {
                self.user = None;
                self.is_authenticated = false;
                Err(e)
            }
        }
    }
}
