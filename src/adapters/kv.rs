use crate::domain::ports::KvStore;
use crate::utils::error::{IndustryError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 以檔案保存的 key-value store，每個 key 一個 `<key>.json` 檔
#[derive(Debug, Clone)]
pub struct FileKvStore {
    base_path: PathBuf,
}

impl FileKvStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '\0']) || key.starts_with('.') {
            return Err(IndustryError::CacheError {
                message: format!("invalid cache key: {:?}", key),
            });
        }
        Ok(Path::new(&self.base_path).join(format!("{}.json", key)))
    }
}

impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let full_path = self.path_for(key)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.path_for(key)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, value).await?;
        Ok(())
    }
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `get` fails; used to exercise read-failure fallbacks.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Every `put` fails; used to exercise write-back failures.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }

    pub fn snapshot(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(IndustryError::CacheError {
                message: format!("read of '{}' rejected", key),
            });
        }
        Ok(self.snapshot(key))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(IndustryError::CacheError {
                message: format!("write of '{}' rejected", key),
            });
        }
        self.insert(key, value);
        Ok(())
    }
}
