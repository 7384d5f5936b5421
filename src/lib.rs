pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileTokenStore, LogNavigator, MemoryTokenStore, RecordingNavigator};
pub use app::Store;
pub use config::ClientConfig;
pub use crate::core::{client::ApiClient, ApiRequest};
pub use domain::ports::{ClientSettings, Navigator, RefreshPolicy, TokenStore};
pub use domain::session::{Session, TokenSlot};
pub use utils::error::{ClientError, ErrorCategory, Result};
