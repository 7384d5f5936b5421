use crate::domain::ports::RefreshPolicy;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// refresh endpoint 的回應，開啟 rotation 時會附上新的 refresh token
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
    pub refresh: Option<String>,
}

/// 協調同一個 client 上並行的 refresh
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    policy: RefreshPolicy,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// SingleFlight 時取得 gate，持有期間其他呼叫者會等待；Independent 時直接回傳 `None`
    pub async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match self.policy {
            RefreshPolicy::Independent => None,
            RefreshPolicy::SingleFlight => Some(self.gate.lock().await),
        }
    }

    /// 等待 gate 期間 access token 已被其他呼叫者換掉時，回傳可沿用的新 token
    pub fn rotated_token(failed: Option<&str>, stored: Option<String>) -> Option<String> {
        stored.filter(|current| Some(current.as_str()) != failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_independent_policy_never_blocks() {
        let coordinator = RefreshCoordinator::new(RefreshPolicy::Independent);
        let first = coordinator.enter().await;
        let second = coordinator.enter().await;
        assert!(first.is_none() && second.is_none());
    }

    #[tokio::test]
    async fn test_single_flight_serializes_callers() {
        let coordinator = RefreshCoordinator::new(RefreshPolicy::SingleFlight);
        let guard = coordinator.enter().await;
        assert!(guard.is_some());

        let waiting = tokio::time::timeout(Duration::from_millis(50), coordinator.enter()).await;
        assert!(waiting.is_err(), "second caller should wait for the gate");

        drop(guard);
        assert!(coordinator.enter().await.is_some());
    }

    #[test]
    fn test_rotated_token() {
        assert_eq!(
            RefreshCoordinator::rotated_token(Some("old"), Some("new".to_string())),
            Some("new".to_string())
        );
        assert_eq!(
            RefreshCoordinator::rotated_token(Some("old"), Some("old".to_string())),
            None
        );
        assert_eq!(RefreshCoordinator::rotated_token(Some("old"), None), None);
        assert_eq!(
            RefreshCoordinator::rotated_token(None, Some("new".to_string())),
            Some("new".to_string())
        );
    }
}
