pub mod client;
pub mod endpoints;
pub mod refresh;
pub mod request;

pub use crate::domain::model::*;
pub use crate::domain::ports::{ClientSettings, Navigator, RefreshPolicy, TokenStore};
pub use crate::utils::error::Result;
pub use client::ApiClient;
pub use request::{ApiRequest, CallContext, FilePart, RequestBody};
