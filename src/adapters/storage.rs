use crate::domain::ports::TokenStore;
use crate::domain::session::TokenSlot;
use crate::utils::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn get(&self, slot: TokenSlot) -> Option<String> {
        match slot {
            TokenSlot::Access => self.access_token.clone(),
            TokenSlot::Refresh => self.refresh_token.clone(),
        }
    }

    fn set(&mut self, slot: TokenSlot, value: &str) {
        let target = match slot {
            TokenSlot::Access => &mut self.access_token,
            TokenSlot::Refresh => &mut self.refresh_token,
        };
        *target = Some(value.to_string());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| ClientError::ConfigError {
        message: "token store lock poisoned".to_string(),
    })
}

/// 只存在記憶體中的 token 儲存，clone 之後共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        let tokens = StoredTokens {
            access_token: access_token.map(str::to_string),
            refresh_token: refresh_token.map(str::to_string),
        };
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    async fn read(&self, slot: TokenSlot) -> Result<Option<String>> {
        Ok(lock(&self.tokens)?.get(slot))
    }

    async fn write(&self, slot: TokenSlot, value: &str) -> Result<()> {
        lock(&self.tokens)?.set(slot, value);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *lock(&self.tokens)? = StoredTokens::default();
        Ok(())
    }
}

/// 以 JSON 檔保存 token，權限限制為 0600
///
/// 每次操作都重新讀檔，讓多次執行的 CLI 共用同一個 session。
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredTokens> {
        if !self.path.exists() {
            return Ok(StoredTokens::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(StoredTokens::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(tokens)?;

        // 先寫入同目錄的暫存檔再 rename，中途失敗不會留下不完整的 JSON
        let temp_path = self.temp_path();
        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
        }

        #[cfg(unix)]
        let mut file = {
            use std::os::unix::fs::OpenOptionsExt;
            fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&temp_path)?
        };

        #[cfg(not(unix))]
        let mut file = fs::File::create(&temp_path)?;

        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    async fn read(&self, slot: TokenSlot) -> Result<Option<String>> {
        let _guard = lock(&self.guard)?;
        Ok(self.load()?.get(slot))
    }

    async fn write(&self, slot: TokenSlot, value: &str) -> Result<()> {
        let _guard = lock(&self.guard)?;
        let mut tokens = self.load()?;
        tokens.set(slot, value);
        self.save(&tokens)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = lock(&self.guard)?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
