use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// 後端回傳非 2xx，body 原樣保留
    #[error("{method} {path} failed with status {status}")]
    Api {
        method: String,
        path: String,
        status: StatusCode,
        body: Value,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// refresh token 無法換發新的 access token，session 已被清除
    #[error("Session refresh failed: {reason}")]
    RefreshFailed {
        status: Option<StatusCode>,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 401 且無法自動恢復
    Authentication,
    /// refresh 失敗，需要重新登入
    SessionLost,
    /// 其他 4xx 或本地輸入驗證失敗
    Validation,
    /// 5xx
    Server,
    /// 連線、逾時等傳輸層錯誤
    Network,
    Configuration,
    Local,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::ValidationError {
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::RefreshFailed { status, .. } => *status,
            ClientError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                ErrorCategory::Authentication
            }
            ClientError::Api { status, .. } if status.is_server_error() => ErrorCategory::Server,
            ClientError::Api { .. } | ClientError::ValidationError { .. } => {
                ErrorCategory::Validation
            }
            ClientError::RefreshFailed { .. } => ErrorCategory::SessionLost,
            ClientError::Network(_) => ErrorCategory::Network,
            ClientError::ConfigError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ClientError::IoError(_) | ClientError::SerializationError(_) => ErrorCategory::Local,
        }
    }

    /// 將錯誤轉為可直接顯示給使用者的訊息
    pub fn user_friendly_message(&self) -> String {
        self.display_message(GENERIC_FAILURE)
    }

    /// 同 `user_friendly_message`，只有在訊息為空時才使用 `fallback`
    ///
    /// 沒有 body 時顯示傳輸層訊息，body 無法辨識時顯示通用訊息。
    pub fn display_message(&self, fallback: &str) -> String {
        let message = match self {
            ClientError::Api { body, .. } => match body {
                Value::Null => self.to_string(),
                Value::String(text) if text.trim().is_empty() => self.to_string(),
                _ => describe_error_body(body).unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            },
            ClientError::Network(e) => {
                let message = e.to_string();
                if message.is_empty() {
                    NETWORK_FAILURE.to_string()
                } else {
                    message
                }
            }
            ClientError::RefreshFailed { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ClientError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Authentication | ErrorCategory::SessionLost => {
                "Run `path2prep login` to start a new session"
            }
            ErrorCategory::Validation => "Check the submitted values and try again",
            ErrorCategory::Server => "The service is having trouble, try again later",
            ErrorCategory::Network => "Check your connection and the configured base URL",
            ErrorCategory::Configuration => "Review the configuration file and CLI flags",
            ErrorCategory::Local => "Check the session file path and its permissions",
        }
    }
}

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const NETWORK_FAILURE: &str = "Network error. Please check your connection.";

/// 解析 Django REST Framework 風格的錯誤 body
///
/// 支援純字串、`{"detail": ..}`、`{"non_field_errors": [..]}` 與
/// `{"field": ["msg", ..]}` 四種格式。無法辨識時回傳 `None`。
pub fn describe_error_body(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(join_messages) {
                return Some(detail);
            }
            if let Some(errors) = map.get("non_field_errors").and_then(join_messages) {
                return Some(errors);
            }

            let lines: Vec<String> = map
                .iter()
                .filter_map(|(field, errors)| {
                    let text = match errors {
                        Value::Array(_) | Value::String(_) => join_messages(errors)?,
                        _ => return None,
                    };
                    Some(format!("{}: {}", humanize_field(field), text))
                })
                .collect();

            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        _ => None,
    }
}

fn join_messages(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        _ => None,
    }
}

// password_confirm -> Password Confirm
fn humanize_field(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub type Result<T> = std::result::Result<T, ClientError>;
