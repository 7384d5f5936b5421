use crate::core::client::ApiClient;
use crate::domain::model::{Profile, ProfileUpdate};
use crate::domain::ports::{Navigator, TokenStore};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
    pub updating: bool,
    pub update_success: bool,
    pub update_error: Option<String>,
}

impl ProfileState {
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear_update_status(&mut self) {
        self.update_success = false;
        self.update_error = None;
    }

    pub async fn fetch<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        self.loading = true;
        self.error = None;

        let outcome = client.get_profile().await;
        self.loading = false;
        match outcome {
            Ok(profile) => {
                self.profile = Some(profile);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message("Failed to fetch profile"));
                Err(e)
            }
        }
    }

    pub async fn update<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        update: &ProfileUpdate,
    ) -> Result<()> {
        self.begin_update();
        let outcome = client.update_profile(update).await;
        self.finish_update(outcome, "Failed to update profile")
    }

    pub async fn upload_picture<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        file_name: &str,
        content: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<()> {
        self.begin_update();
        let outcome = client.upload_profile_picture(file_name, content, mime).await;
        self.finish_update(outcome, "Failed to upload profile picture")
    }

    pub async fn create<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        profile: &ProfileUpdate,
    ) -> Result<()> {
        let created = client.create_profile(profile).await?;
        self.profile = Some(created);
        Ok(())
    }

    fn begin_update(&mut self) {
        self.updating = true;
        self.update_success = false;
        self.update_error = None;
    }

    fn finish_update(&mut self, outcome: Result<Profile>, fallback: &str) -> Result<()> {
        self.updating = false;
        match outcome {
            Ok(profile) => {
                self.update_success = true;
                self.profile = Some(profile);
                Ok(())
            }
            Err(e) => {
                self.update_error = Some(e.display_message(fallback));
                Err(e)
            }
        }
    }
}
