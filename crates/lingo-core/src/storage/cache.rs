//! Typed client-local cache on top of a [`KeyValueStore`].

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::KeyValueStore;
use crate::adaptive::AdaptiveSessionState;
use crate::error::{Result, StoreError};

const FAVORITE_PREFIX: &str = "favorite:";
const SESSION_KEY: &str = "session:adaptive";

/// Favorites and the paused adaptive session for one device.
pub struct LocalCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read and decode a JSON value.
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] if the stored text is not valid JSON
    /// for `T`, or the store's own read error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(value))
    }

    /// Encode and store a JSON value.
    ///
    /// # Errors
    /// Returns an error if encoding or the write fails.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }

    /// # Errors
    /// Returns the store's read error.
    pub fn favorites(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .store
            .keys(FAVORITE_PREFIX)?
            .into_iter()
            .filter_map(|k| k.strip_prefix(FAVORITE_PREFIX).map(str::to_string))
            .collect())
    }

    /// # Errors
    /// Returns the store's read error.
    pub fn is_favorite(&self, item_id: &str) -> Result<bool> {
        Ok(self.store.get(&favorite_key(item_id))?.is_some())
    }

    /// # Errors
    /// Returns the store's write error.
    pub fn add_favorite(&mut self, item_id: &str) -> Result<()> {
        self.store.set(&favorite_key(item_id), "1")
    }

    /// # Errors
    /// Returns the store's write error.
    pub fn remove_favorite(&mut self, item_id: &str) -> Result<()> {
        self.store.remove(&favorite_key(item_id))
    }

    /// Flip an item's favorite flag and return the new value.
    ///
    /// # Errors
    /// Returns the store's read or write error.
    pub fn toggle_favorite(&mut self, item_id: &str) -> Result<bool> {
        if self.is_favorite(item_id)? {
            self.remove_favorite(item_id)?;
            Ok(false)
        } else {
            self.add_favorite(item_id)?;
            Ok(true)
        }
    }

    /// # Errors
    /// Returns an error if encoding or the write fails.
    pub fn save_session(&mut self, state: &AdaptiveSessionState) -> Result<()> {
        self.set_json(SESSION_KEY, state)
    }

    /// # Errors
    /// Returns [`StoreError::Corrupt`] if the saved session cannot be decoded.
    pub fn load_session(&self) -> Result<Option<AdaptiveSessionState>> {
        self.get_json(SESSION_KEY)
    }

    /// # Errors
    /// Returns the store's write error.
    pub fn clear_session(&mut self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }
}

fn favorite_key(item_id: &str) -> String {
    format!("{FAVORITE_PREFIX}{item_id}")
}
