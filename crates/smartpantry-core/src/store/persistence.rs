//! Durable storage backends for the pantry store.
//!
//! The store hands over a fully serialized document on every commit, so a
//! provider only needs to read and replace one blob.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, trace};

/// Default file name for the persisted state document
pub const STATE_FILE: &str = "smartpantry.json";

/// Key-value style storage for the serialized state document.
pub trait PersistenceProvider: Send + Sync {
    /// Read the stored document. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the stored document.
    fn save(&self, bytes: &[u8]) -> Result<()>;
}

/// Stores the document as a single JSON file, replaced atomically.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider for `smartpantry.json` inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

impl PersistenceProvider for JsonFileProvider {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "State file does not exist");
            return Ok(None);
        }

        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read state file {}", self.path.display()))?;
        Ok(Some(bytes))
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create state directory {}", parent.display())
                })?;
            }
        }

        // Write to a sibling first so a crash never leaves a half-written file
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, bytes)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        trace!(path = %self.path.display(), bytes = bytes.len(), "State written to file");
        Ok(())
    }
}

/// In-process storage. Clones share the same underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    bytes: Option<Vec<u8>>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider pre-loaded with a stored document
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let provider = Self::new();
        provider.lock().bytes = Some(bytes.into());
        provider
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock still holds a usable buffer
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current stored document, if any
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.lock().bytes.clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make subsequent saves fail, simulating a full or read-only disk
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }
}

impl PersistenceProvider for MemoryProvider {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().bytes.clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            anyhow::bail!("memory provider configured to fail writes");
        }
        state.bytes = Some(bytes.to_vec());
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_provider_missing_file_loads_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = JsonFileProvider::in_dir(dir.path());
        assert_eq!(provider.load().expect("load"), None);
    }

    #[test]
    fn test_file_provider_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = JsonFileProvider::in_dir(dir.path().join("nested").join("data"));

        provider.save(br#"{"pantry":[]}"#).expect("save");
        assert_eq!(
            provider.load().expect("load").as_deref(),
            Some(&br#"{"pantry":[]}"#[..])
        );
        assert!(!provider.temp_path().exists());

        provider.save(b"{}").expect("overwrite");
        assert_eq!(provider.load().expect("load").as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_memory_provider_clones_share_storage() {
        let provider = MemoryProvider::new();
        let other = provider.clone();
        provider.save(b"abc").expect("save");
        assert_eq!(other.load().expect("load"), Some(b"abc".to_vec()));
        assert_eq!(other.save_count(), 1);
    }

    #[test]
    fn test_memory_provider_write_failure() {
        let provider = MemoryProvider::with_contents("old");
        provider.set_fail_writes(true);
        assert!(provider.save(b"new").is_err());
        assert_eq!(provider.contents(), Some(b"old".to_vec()));
        assert_eq!(provider.save_count(), 0);
    }
}
