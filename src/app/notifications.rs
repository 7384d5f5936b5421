use crate::core::client::ApiClient;
use crate::domain::model::Notification;
use crate::domain::ports::{Navigator, TokenStore};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl NotificationState {
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub async fn fetch<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        self.loading = true;
        let outcome = client.list_notifications().await;
        self.loading = false;
        match outcome {
            Ok(notifications) => {
                self.notifications = notifications;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message("Failed to fetch notifications"));
                Err(e)
            }
        }
    }

    pub async fn fetch_unread_count<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        self.unread_count = client.unread_count().await?;
        Ok(())
    }

    pub async fn mark_read<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        id: i64,
    ) -> Result<()> {
        client.mark_notification_read(id).await?;
        self.apply_read(id);
        Ok(())
    }

    pub async fn mark_all_read<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        client.mark_all_notifications_read().await?;
        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.unread_count = 0;
        Ok(())
    }

    // 計數由後端維護，這裡只做本地的樂觀更新
    fn apply_read(&mut self, id: i64) {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) {
            notification.is_read = true;
        }
        self.unread_count = self.unread_count.saturating_sub(1);
    }
}
