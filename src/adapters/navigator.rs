use crate::domain::ports::Navigator;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// CLI 用：沒有頁面可以跳轉，只提示使用者重新登入
#[derive(Debug, Clone, Default)]
pub struct LogNavigator;

#[async_trait]
impl Navigator for LogNavigator {
    async fn navigate(&self, route: &str) {
        tracing::warn!("Session ended, redirecting to {}", route);
        eprintln!("🔒 Session expired. Run `path2prep login` to sign in again.");
    }
}

/// 記錄所有導頁目標，clone 之後共用同一份紀錄
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }

    pub fn redirect_count(&self) -> usize {
        self.routes.lock().map(|routes| routes.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, route: &str) {
        tracing::debug!("Recording navigation to {}", route);
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
