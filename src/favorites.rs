//! Persisted favorites set.
//!
//! Favorites are record identifiers kept under the single fixed key
//! `favoritePlants` in a JSON key-value file, mirroring the browser-local
//! storage the catalog's clients used. Every toggle synchronously rewrites
//! the whole set; writes are last-write-wins behind the caller's lock. A
//! missing or corrupt file loads as an empty set.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// Storage key within the JSON file.
const FAVORITES_KEY: &str = "favoritePlants";

/// Favorites persisted to a JSON key-value file.
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: Vec<String>,
}

impl FavoritesStore {
    /// Load favorites from `path`.
    ///
    /// An absent file, unreadable JSON, or missing/ill-typed key yields an
    /// empty set rather than an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = Self::read_ids(&path);
        FavoritesStore { path, ids }
    }

    fn read_ids(path: &Path) -> Vec<String> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let value: Value = match serde_json::from_str(&contents) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Ignoring corrupt favorites file {:?}: {}", path, e);
                return Vec::new();
            }
        };

        value
            .get(FAVORITES_KEY)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Toggle membership for `id` and persist the new set.
    ///
    /// Returns whether the id is a favorite after the toggle.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let now_favorite = if let Some(pos) = self.ids.iter().position(|fav| fav == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        };
        self.persist()?;
        Ok(now_favorite)
    }

    /// Membership test.
    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.iter().any(|fav| fav == id)
    }

    /// Current favorites, in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    fn persist(&self) -> Result<()> {
        let value = serde_json::json!({ FAVORITES_KEY: self.ids });
        fs::write(&self.path, serde_json::to_string(&value)?)?;
        Ok(())
    }
}
