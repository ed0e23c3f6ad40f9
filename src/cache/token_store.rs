use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::cache::token::TokenRecord;
use crate::error::{DriftError, DriftResult};
use crate::helpers::fs::write_atomic;

/// Durable holder of the single credential record.
pub trait TokenStore {
    /// `Ok(None)` when nothing usable has been stored yet.
    fn load(&self) -> DriftResult<Option<TokenRecord>>;

    /// Replaces the stored record. Must not leave a partially written record behind.
    fn save(&self, record: &TokenRecord) -> DriftResult<()>;
}

impl<S: TokenStore + ?Sized> TokenStore for &S {
    fn load(&self) -> DriftResult<Option<TokenRecord>> {
        (**self).load()
    }

    fn save(&self, record: &TokenRecord) -> DriftResult<()> {
        (**self).save(record)
    }
}

/// JSON file store. No locking: concurrent runs against one file may clobber each other.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> DriftResult<Option<TokenRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("token file '{}' not found", self.display());
                return Ok(None);
            }
            Err(e) => return Err(DriftError::io(self.display(), e)),
        };

        match serde_json::from_str::<TokenRecord>(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("ignoring malformed token file '{}': {}", self.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, record: &TokenRecord) -> DriftResult<()> {
        let body = serde_json::to_vec(record).map_err(|e| DriftError::parse(e.to_string()))?;
        write_atomic(&self.path, &body).map_err(|e| DriftError::io(self.display(), e))?;
        debug!("token record written to '{}'", self.display());
        Ok(())
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
    fail_saves: bool,
    saves: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new(record: Option<TokenRecord>) -> Self {
        Self {
            record: Mutex::new(record),
            ..Default::default()
        }
    }

    /// Every `save` returns an i/o error and leaves the record untouched.
    pub fn failing(record: Option<TokenRecord>) -> Self {
        Self {
            record: Mutex::new(record),
            fail_saves: true,
            saves: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<TokenRecord> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> DriftResult<Option<TokenRecord>> {
        Ok(self.snapshot())
    }

    fn save(&self, record: &TokenRecord) -> DriftResult<()> {
        if self.fail_saves {
            return Err(DriftError::io(
                "memory",
                std::io::Error::new(ErrorKind::PermissionDenied, "store is read-only"),
            ));
        }
        let mut guard = self
            .record
            .lock()
            .map_err(|_| DriftError::io("memory", std::io::Error::other("store lock poisoned")))?;
        *guard = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenRecord {
        TokenRecord {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            issued_at: Some(1_700_000_000.5),
            client_id: Some("client".into()),
            client_secret: None,
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileTokenStore::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token.json"));
        store.save(&sample()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token(), Some("access"));
        assert_eq!(loaded.refresh_token(), Some("refresh"));
        assert_eq!(loaded.issued_at, Some(1_700_000_000.5));
        assert!(!dir.path().join("nested").join("token.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        FileTokenStore::new(&path).save(&sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn failing_memory_store_keeps_previous_record() {
        let store = MemoryTokenStore::failing(Some(sample()));
        assert!(store.save(&TokenRecord::default()).is_err());
        assert_eq!(store.snapshot().unwrap().access_token(), Some("access"));
        assert_eq!(store.saves(), 0);
    }
}
