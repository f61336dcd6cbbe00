//! Favorite proverbs and viewing history kept on the client.

use serde::{Deserialize, Serialize};

use crate::error::VorbaError;
use crate::storage::KeyValueStorage;

pub const FAVORITES_KEY: &str = "vorbabuna_favorites";
pub const HISTORY_KEY: &str = "vorbabuna_history";
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Favorites and history over any [`KeyValueStorage`].
///
/// Stored values that fail to parse read as empty lists; the next write
/// replaces them.
#[derive(Debug)]
pub struct Favorites<S> {
    storage: S,
}

impl<S: KeyValueStorage> Favorites<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn read_list<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Vec<T>, VorbaError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), VorbaError> {
        let raw = serde_json::to_string(items)?;
        self.storage.set(key, &raw)
    }

    pub fn list(&self) -> Result<Vec<String>, VorbaError> {
        self.read_list(FAVORITES_KEY)
    }

    /// Returns false if `id` was already a favorite.
    pub fn add(&mut self, id: &str) -> Result<bool, VorbaError> {
        let mut favorites = self.list()?;
        if favorites.iter().any(|f| f == id) {
            return Ok(false);
        }
        favorites.push(id.to_string());
        self.write_list(FAVORITES_KEY, &favorites)?;
        Ok(true)
    }

    /// Returns whether `id` was present.
    pub fn remove(&mut self, id: &str) -> Result<bool, VorbaError> {
        let mut favorites = self.list()?;
        let before = favorites.len();
        favorites.retain(|f| f != id);
        self.write_list(FAVORITES_KEY, &favorites)?;
        Ok(favorites.len() != before)
    }

    pub fn is_favorite(&self, id: &str) -> Result<bool, VorbaError> {
        Ok(self.list()?.iter().any(|f| f == id))
    }

    /// Flip membership; returns the new state.
    pub fn toggle(&mut self, id: &str) -> Result<bool, VorbaError> {
        if self.is_favorite(id)? {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    pub fn clear(&mut self) -> Result<(), VorbaError> {
        self.storage.remove(FAVORITES_KEY)
    }

    pub fn count(&self) -> Result<usize, VorbaError> {
        Ok(self.list()?.len())
    }

    pub fn export(&self) -> Result<String, VorbaError> {
        Ok(serde_json::to_string_pretty(&self.list()?)?)
    }

    /// Merge a JSON array of ids into the favorites, keeping existing order
    /// first. Returns false, changing nothing, when `json` is not an array.
    pub fn import(&mut self, json: &str) -> Result<bool, VorbaError> {
        let imported = match serde_json::from_str::<serde_json::Value>(json) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => return Ok(false),
            Err(e) => {
                tracing::warn!("Rejected favorites import: {}", e);
                return Ok(false);
            }
        };

        let mut merged = self.list()?;
        for item in imported {
            let id = match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            if !merged.contains(&id) {
                merged.push(id);
            }
        }
        self.write_list(FAVORITES_KEY, &merged)?;
        Ok(true)
    }

    /// Most recent first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>, VorbaError> {
        self.read_list(HISTORY_KEY)
    }

    pub fn add_to_history(&mut self, id: &str) -> Result<(), VorbaError> {
        self.add_to_history_at(id, chrono::Utc::now().timestamp_millis())
    }

    /// Move `id` to the front with `timestamp`, keeping the newest [`HISTORY_LIMIT`] entries.
    pub fn add_to_history_at(&mut self, id: &str, timestamp: i64) -> Result<(), VorbaError> {
        let mut history = self.history()?;
        history.retain(|entry| entry.id != id);
        history.insert(
            0,
            HistoryEntry {
                id: id.to_string(),
                timestamp,
            },
        );
        history.truncate(HISTORY_LIMIT);
        self.write_list(HISTORY_KEY, &history)
    }

    pub fn clear_history(&mut self) -> Result<(), VorbaError> {
        self.storage.remove(HISTORY_KEY)
    }

    pub fn history_count(&self) -> Result<usize, VorbaError> {
        Ok(self.history()?.len())
    }
}
