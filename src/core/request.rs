use crate::utils::error::{ClientError, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// multipart 上傳的檔案內容
///
/// 以擁有權保存 bytes，重試時可以重新組出表單。
#[derive(Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime: Option<String>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("bytes", &self.content.len())
            .field("mime", &self.mime)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FilePart>),
}

/// 一次邏輯上的 API 呼叫，路徑相對於 base_url
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// 將 struct 的欄位轉為 query string，`null` 欄位略過
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    let text = match value {
                        Value::Null => continue,
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    self.params.push((key, text));
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ClientError::validation(format!(
                "query parameters must be an object, got {}",
                other
            ))),
        }
    }

    pub fn file(mut self, part: FilePart) -> Self {
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            _ => self.body = RequestBody::Multipart(vec![part]),
        }
        self
    }
}

const MAX_REFRESH_ATTEMPTS: u8 = 1;

/// 單一邏輯呼叫的狀態，限制每次呼叫最多 refresh 一次
#[derive(Debug, Default)]
pub struct CallContext {
    refresh_attempts: u8,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_attempts < MAX_REFRESH_ATTEMPTS
    }

    pub fn record_refresh(&mut self) {
        self.refresh_attempts += 1;
    }

    pub fn refresh_attempts(&self) -> u8 {
        self.refresh_attempts
    }
}
