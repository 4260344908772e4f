//! Persisted voice favourites.
//!
//! Favourites live in an injected [`PreferenceStore`]: they are read once when
//! [`VoiceFavorites`] is opened and the full set is written back on every toggle.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;

const FAVORITES_KEY: &str = "voice_favorites";

/// String key-value preference storage.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, one entry per key.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parse {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every write.
        let mut values = self.load().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

/// Favourite voice ids backed by a preference store.
pub struct VoiceFavorites {
    store: Box<dyn PreferenceStore>,
    ids: BTreeSet<String>,
}

impl VoiceFavorites {
    /// Read favourites from the store. Missing or unreadable data yields an empty set.
    pub fn open(store: Box<dyn PreferenceStore>) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw)
                .map(|v| v.into_iter().collect())
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring unreadable voice favourites");
                    BTreeSet::new()
                }),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read voice favourites");
                BTreeSet::new()
            }
        };
        Self { store, ids }
    }

    pub fn contains(&self, voice_id: &str) -> bool {
        self.ids.contains(voice_id)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    /// Flip a voice in or out of the set and persist. Returns whether it is now a favourite.
    pub fn toggle(&mut self, voice_id: &str) -> Result<bool> {
        let now_favorite = if self.ids.remove(voice_id) {
            false
        } else {
            self.ids.insert(voice_id.to_string());
            true
        };
        let ids: Vec<&String> = self.ids.iter().collect();
        let raw = serde_json::to_string(&ids)?;
        self.store
            .set(FAVORITES_KEY, &raw)
            .context("save voice favourites")?;
        Ok(now_favorite)
    }
}
