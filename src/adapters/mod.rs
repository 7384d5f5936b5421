// Adapters layer: concrete implementations of the domain ports (token storage, navigation).

pub mod navigator;
pub mod storage;

pub use navigator::{LogNavigator, RecordingNavigator};
pub use storage::{FileTokenStore, MemoryTokenStore};
