use crate::core::client::ApiClient;
use crate::domain::model::{Application, Bookmark, Scholarship, ScholarshipMatch, ScholarshipQuery};
use crate::domain::ports::{Navigator, TokenStore};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScholarshipState {
    pub scholarships: Vec<Scholarship>,
    pub matches: Vec<ScholarshipMatch>,
    pub applications: Vec<Application>,
    pub bookmarks: Vec<Bookmark>,
    pub loading: bool,
    pub match_loading: bool,
    pub error: Option<String>,
}

impl ScholarshipState {
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// 只保留目前這一頁的結果
    pub async fn fetch<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        query: &ScholarshipQuery,
    ) -> Result<()> {
        self.loading = true;
        self.error = None;

        let outcome = client.list_scholarships(query).await;
        self.loading = false;
        match outcome {
            Ok(page) => {
                self.scholarships = page.results;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message("Failed to fetch scholarships"));
                Err(e)
            }
        }
    }

    pub async fn match_profile<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
        top_k: Option<u32>,
    ) -> Result<()> {
        self.match_loading = true;
        self.error = None;

        let outcome = client.match_scholarships(top_k).await;
        self.match_loading = false;
        match outcome {
            Ok(result) => {
                self.matches = result.matches;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.display_message("Failed to match scholarships"));
                Err(e)
            }
        }
    }

    pub async fn fetch_applications<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        self.applications = client.list_applications().await?;
        Ok(())
    }

    pub async fn fetch_bookmarks<S: TokenStore, N: Navigator>(
        &mut self,
        client: &ApiClient<S, N>,
    ) -> Result<()> {
        self.bookmarks = client.list_bookmarks().await?;
        Ok(())
    }
}
