use crate::core::refresh::{RefreshCoordinator, RefreshRequest, RefreshResponse};
use crate::core::request::{ApiRequest, CallContext, RequestBody};
use crate::domain::ports::{ClientSettings, Navigator, RefreshPolicy, TokenStore};
use crate::domain::session::{Session, TokenSlot};
use crate::utils::error::{describe_error_body, ClientError, Result};
use crate::utils::validation::{validate_api_path, validate_url};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 會自動附上 bearer token 並在 401 時 refresh 的 API client
///
/// token 一律透過注入的 [`TokenStore`] 讀寫，session 無法恢復時由
/// [`Navigator`] 導回登入頁。
pub struct ApiClient<S: TokenStore, N: Navigator> {
    http: Client,
    base_url: String,
    refresh_path: String,
    sign_in_route: String,
    store: S,
    navigator: N,
    coordinator: RefreshCoordinator,
}

impl<S: TokenStore, N: Navigator> ApiClient<S, N> {
    pub fn new<C: ClientSettings>(settings: &C, store: S, navigator: N) -> Result<Self> {
        validate_url("base_url", settings.base_url())?;
        validate_api_path("refresh_path", settings.refresh_path())?;

        let http = Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent())
            .build()?;

        tracing::debug!(
            "API client ready: base_url={}, refresh_policy={:?}",
            settings.base_url(),
            settings.refresh_policy()
        );

        Ok(Self {
            http,
            base_url: settings.base_url().trim_end_matches('/').to_string(),
            refresh_path: settings.refresh_path().to_string(),
            sign_in_route: settings.sign_in_route().to_string(),
            store,
            navigator,
            coordinator: RefreshCoordinator::new(settings.refresh_policy()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.coordinator.policy()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 保存新 session，取代既有的 token
    pub async fn start_session(&self, session: &Session) -> Result<()> {
        self.store
            .write(TokenSlot::Access, &session.access_token)
            .await?;
        self.store
            .write(TokenSlot::Refresh, &session.refresh_token)
            .await?;
        tracing::debug!("Session stored");
        Ok(())
    }

    pub async fn end_session(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    pub async fn has_session(&self) -> Result<bool> {
        Ok(self.store.read(TokenSlot::Access).await?.is_some())
    }

    /// 送出請求並將 2xx 回應解析為 `T`
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self.execute(&request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// 送出請求並忽略回應內容
    pub async fn request_empty(&self, request: ApiRequest) -> Result<()> {
        self.execute(&request).await.map(|_| ())
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let mut context = CallContext::new();
        let mut access_token = self.store.read(TokenSlot::Access).await?;

        loop {
            let response = self.send(request, access_token.as_deref()).await?;
            let status = response.status();
            let body = read_body(response).await?;

            tracing::debug!("{} {} -> {}", request.method, request.path, status);

            if status.is_success() {
                return Ok(body);
            }

            let error = ClientError::Api {
                method: request.method.to_string(),
                path: request.path.clone(),
                status,
                body,
            };

            if status != StatusCode::UNAUTHORIZED || !context.can_refresh() {
                return Err(error);
            }
            context.record_refresh();

            match self.recover_session(access_token.as_deref()).await? {
                Some(token) => {
                    tracing::debug!("Retrying {} {} with refreshed token", request.method, request.path);
                    access_token = Some(token);
                }
                None => return Err(error),
            }
        }
    }

    /// 取得可重試用的 access token
    ///
    /// `Ok(None)` 表示沒有 refresh token，呼叫端應回傳原本的 401。
    /// refresh 失敗時會清除 session、導回登入頁並回傳錯誤。
    async fn recover_session(&self, failed_token: Option<&str>) -> Result<Option<String>> {
        let gate = self.coordinator.enter().await;

        if gate.is_some() {
            let stored = self.store.read(TokenSlot::Access).await?;
            if failed_token.is_some() && stored.is_none() {
                tracing::debug!("Session already cleared by another request's failed refresh");
                return Err(ClientError::RefreshFailed {
                    status: None,
                    reason: "session was cleared by a concurrent refresh failure".to_string(),
                });
            }
            if let Some(token) = RefreshCoordinator::rotated_token(failed_token, stored) {
                tracing::debug!("Access token already refreshed by another request");
                return Ok(Some(token));
            }
        }

        let Some(refresh_token) = self.store.read(TokenSlot::Refresh).await? else {
            tracing::debug!("No refresh token stored, skipping refresh");
            return Ok(None);
        };

        match self.refresh_access_token(&refresh_token).await {
            Ok(tokens) => {
                self.store.write(TokenSlot::Access, &tokens.access).await?;
                if let Some(rotated) = &tokens.refresh {
                    self.store.write(TokenSlot::Refresh, rotated).await?;
                }
                tracing::info!("Access token refreshed");
                Ok(Some(tokens.access))
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                if let Err(clear_error) = self.store.clear().await {
                    tracing::error!("Failed to clear session after refresh failure: {}", clear_error);
                }
                self.navigator.navigate(&self.sign_in_route).await;
                Err(e)
            }
        }
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let url = self.url(&self.refresh_path);
        tracing::debug!("Requesting new access token from {}", self.refresh_path);

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| ClientError::RefreshFailed {
                status: e.status(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = read_body(response)
            .await
            .map_err(|e| ClientError::RefreshFailed {
                status: Some(status),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(ClientError::RefreshFailed {
                status: Some(status),
                reason: describe_error_body(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        serde_json::from_value(body).map_err(|e| ClientError::RefreshFailed {
            status: Some(status),
            reason: format!("malformed refresh response: {}", e),
        })
    }

    async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let mut file = Part::bytes(part.content.clone()).file_name(part.file_name.clone());
                    if let Some(mime) = &part.mime {
                        file = file.mime_str(mime)?;
                    }
                    form = form.part(part.field.clone(), file);
                }
                builder.multipart(form)
            }
        };

        Ok(builder.send().await?)
    }
}

/// 空 body 視為 `null`，非 JSON 內容保留為字串
async fn read_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}
