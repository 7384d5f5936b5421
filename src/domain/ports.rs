use crate::domain::session::TokenSlot;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// session token 的持久化儲存
///
/// 每次送出請求前都會重新讀取，寫入為 last-write-wins。
pub trait TokenStore: Send + Sync {
    fn read(&self, slot: TokenSlot)
        -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn write(
        &self,
        slot: TokenSlot,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// session 無法恢復時，將使用者導回登入頁
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: &str);
}

/// 同時有多個請求收到 401 時的 refresh 策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// 每個請求各自 refresh
    #[default]
    Independent,
    /// 同一時間只允許一次 refresh，後到者沿用新的 access token
    SingleFlight,
}

pub trait ClientSettings: Send + Sync {
    fn base_url(&self) -> &str;
    fn refresh_path(&self) -> &str;
    fn sign_in_route(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
    fn refresh_policy(&self) -> RefreshPolicy;
}
