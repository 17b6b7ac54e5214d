//! Moderation-list store: the hub's only durable state.
//!
//! DESIGN
//! ======
//! The whole list is one JSON array of strings. It is read once at startup
//! and rewritten in full on every replacement; there are no diffs. The hub
//! owns a boxed [`ModerationStore`] so tests can inject an in-memory or
//! failing store.
//!
//! ERROR HANDLING
//! ==============
//! A missing file is an empty list. A file that cannot be read or parsed is
//! logged by [`load_or_empty`] and treated as empty. Writes go to a sibling
//! temp file that is renamed over the target, so readers never observe a
//! partial list.

#[cfg(test)]
#[path = "moderation_store_test.rs"]
mod moderation_store_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("moderation list i/o on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("moderation list is not a JSON array of strings: {0}")]
    Format(#[from] serde_json::Error),
}

/// Durable home of the moderation list.
#[async_trait::async_trait]
pub trait ModerationStore: Send + Sync {
    /// Read the persisted list. A store that has never been written returns
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing data exists but is unreadable.
    async fn load(&self) -> Result<Vec<String>, StoreError>;

    /// Replace the persisted list with `words`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the list could not be written.
    async fn save(&self, words: &[String]) -> Result<(), StoreError>;
}

/// Load the list, logging and falling back to empty on any error.
pub async fn load_or_empty(store: &dyn ModerationStore) -> Vec<String> {
    match store.load().await {
        Ok(words) => {
            info!(count = words.len(), "moderation list loaded");
            words
        }
        Err(e) => {
            warn!(error = %e, "moderation list unreadable, starting empty");
            Vec::new()
        }
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the list as a JSON file at `path`.
#[derive(Debug, Clone)]
pub struct FileModerationStore {
    path: PathBuf,
}

impl FileModerationStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

#[async_trait::async_trait]
impl ModerationStore for FileModerationStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    async fn save(&self, words: &[String]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(words)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, body).await.map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use super::*;

    /// Keeps the list in memory and records every save.
    #[derive(Default)]
    pub struct MemoryStore {
        pub saved: Mutex<Vec<Vec<String>>>,
        initial: Vec<String>,
    }

    impl MemoryStore {
        pub fn with_words(words: &[&str]) -> Self {
            Self { saved: Mutex::new(Vec::new()), initial: words.iter().map(|w| (*w).to_owned()).collect() }
        }

        pub fn saves(&self) -> Vec<Vec<String>> {
            self.saved.lock().expect("store mutex should lock").clone()
        }
    }

    #[async_trait::async_trait]
    impl ModerationStore for MemoryStore {
        async fn load(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.initial.clone())
        }

        async fn save(&self, words: &[String]) -> Result<(), StoreError> {
            self.saved.lock().expect("store mutex should lock").push(words.to_vec());
            Ok(())
        }
    }

    /// Fails every operation with a permission error.
    pub struct FailingStore;

    #[async_trait::async_trait]
    impl ModerationStore for FailingStore {
        async fn load(&self) -> Result<Vec<String>, StoreError> {
            Err(denied())
        }

        async fn save(&self, _words: &[String]) -> Result<(), StoreError> {
            Err(denied())
        }
    }

    fn denied() -> StoreError {
        StoreError::Io {
            path: PathBuf::from("/denied/moderation.json"),
            source: std::io::Error::from(ErrorKind::PermissionDenied),
        }
    }
}
