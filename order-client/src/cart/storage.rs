//! Cart session persistence
//!
//! The session is stored as one JSON record under a fixed name,
//! `{"state": {"tableId": .., "items": [..]}, "version": 0}`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::CartSession;
use crate::StorageError;

/// Fixed namespace key of the persisted session
pub const STORAGE_KEY: &str = "restaurant-cart-storage";

/// Format version written with every record
const STORAGE_VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    state: CartSession,
    #[serde(default)]
    version: u32,
}

/// Storage port of the cart store
pub trait SessionStorage {
    /// `Ok(None)` when nothing has been persisted yet
    fn load(&self) -> Result<Option<CartSession>, StorageError>;
    fn save(&self, session: &CartSession) -> Result<(), StorageError>;
}

fn encode(session: &CartSession) -> Result<String, StorageError> {
    let record = PersistedSession {
        state: session.clone(),
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

fn decode(json: &str) -> Result<CartSession, StorageError> {
    let record: PersistedSession = serde_json::from_str(json)?;
    if record.version != STORAGE_VERSION {
        tracing::warn!(
            version = record.version,
            "Persisted cart has unexpected version, loading anyway"
        );
    }
    Ok(record.state)
}

/// JSON file storage
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{dir}/restaurant-cart-storage.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Where an undecodable record is moved on load
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Remove the persisted record
    pub fn delete(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl SessionStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<CartSession>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        match decode(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // keep the bad record for inspection; the next save starts fresh
                let aside = self.corrupt_path();
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    "Discarding unreadable cart record"
                );
                fs::rename(&self.path, &aside)?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &CartSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = encode(session)?;
        // write + rename so a reload never sees a half-written record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory storage; clones share the same record
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw persisted JSON, if any
    pub fn raw(&self) -> Option<String> {
        self.record.lock().ok().and_then(|r| r.clone())
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<CartSession>, StorageError> {
        let record = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".into()))?;
        record.as_deref().map(decode).transpose()
    }

    fn save(&self, session: &CartSession) -> Result<(), StorageError> {
        let json = encode(session)?;
        let mut record = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".into()))?;
        *record = Some(json);
        Ok(())
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for Box<S> {
    fn load(&self) -> Result<Option<CartSession>, StorageError> {
        (**self).load()
    }

    fn save(&self, session: &CartSession) -> Result<(), StorageError> {
        (**self).save(session)
    }
}
