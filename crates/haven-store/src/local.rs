//! # Local Key-Value Store
//!
//! Synchronous, origin-scoped persistence: one JSON file per key inside a
//! storage directory. This is the Rust analog of the browser's
//! `localStorage` and keeps the exact same key names, so the shape of the
//! data on disk matches what the storefront always persisted.
//!
//! ## Semantics
//! - Reads are self-healing: a file that fails to parse is reported as an
//!   absent value (`null`) and logged, never an error. Callers replace
//!   malformed collections with empty ones and persist the repair.
//! - Writes are whole-value replacements via a temp file + rename, so a
//!   crash mid-write can't leave a half-written collection behind.
//! - A full storage device surfaces as [`StoreError::QuotaExceeded`] and
//!   aborts that write only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::keys;
use crate::error::{StoreError, StoreResult};

/// ENOSPC; `io::ErrorKind` has no stable variant for it on our MSRV.
const ERRNO_NO_SPACE: i32 = 28;

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Opens (creating if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Local storage ready");
        Ok(LocalStore { dir })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads the raw JSON value stored under a key.
    ///
    /// Returns `Value::Null` for a missing key, and also for a present but
    /// unparseable file (logged): malformed persisted data is discarded,
    /// not propagated.
    pub fn get_value(&self, key: &str) -> StoreResult<Value> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Value::Null),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key, error = %err, "Discarding malformed persisted value");
                Ok(Value::Null)
            }
        }
    }

    /// Writes a raw JSON value under a key (whole-value replace).
    pub fn set_value(&self, key: &str, value: &Value) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        let write_result = fs::write(&tmp, raw).and_then(|()| fs::rename(&tmp, &path));
        match write_result {
            Ok(()) => Ok(()),
            Err(err) if err.raw_os_error() == Some(ERRNO_NO_SPACE) => {
                let _ = fs::remove_file(&tmp);
                Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                })
            }
            Err(err) => {
                let _ = fs::remove_file(&tmp);
                Err(err.into())
            }
        }
    }

    /// Reads and deserializes a typed value. Missing or malformed data
    /// yields `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_value(key)? {
            Value::Null => Ok(None),
            value => match serde_json::from_value(value) {
                Ok(typed) => Ok(Some(typed)),
                Err(err) => {
                    warn!(key, error = %err, "Discarding value with unexpected shape");
                    Ok(None)
                }
            },
        }
    }

    /// Serializes and writes a typed value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.set_value(key, &serde_json::to_value(value)?)
    }

    /// Stamps the cross-client freshness marker with the current time.
    ///
    /// Stored as a string of epoch millis, exactly as the storefront
    /// always wrote it.
    pub fn touch_last_update(&self) -> StoreResult<()> {
        let millis = chrono::Utc::now().timestamp_millis();
        self.set_value(keys::LAST_UPDATE, &Value::String(millis.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::Category;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("haven-local-{}", uuid::Uuid::new_v4()));
        LocalStore::open(dir).unwrap()
    }

    #[test]
    fn test_missing_key_reads_as_null() {
        let store = temp_store();
        assert_eq!(store.get_value("categories").unwrap(), Value::Null);
        assert!(store.get::<Vec<Category>>("categories").unwrap().is_none());
    }

    #[test]
    fn test_round_trip() {
        let store = temp_store();
        let categories = vec![Category {
            id: 1,
            name: "Posters".to_string(),
            image: "https://example.com/c.jpg".to_string(),
        }];

        store.set(keys::CATEGORIES, &categories).unwrap();
        let loaded: Vec<Category> = store.get(keys::CATEGORIES).unwrap().unwrap();
        assert_eq!(loaded, categories);
    }

    #[test]
    fn test_corrupt_file_reads_as_null() {
        let store = temp_store();
        fs::write(store.dir().join("products.json"), "{not json").unwrap();

        assert_eq!(store.get_value("products").unwrap(), Value::Null);
    }

    #[test]
    fn test_wrong_shape_reads_as_none() {
        let store = temp_store();
        store
            .set_value(keys::CATEGORIES, &serde_json::json!({"oops": true}))
            .unwrap();

        // Parses as JSON but not as a category list.
        assert!(store
            .get::<Vec<Category>>(keys::CATEGORIES)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_write_is_whole_value_replace() {
        let store = temp_store();
        store
            .set_value("cart", &serde_json::json!([{"id": 1}]))
            .unwrap();
        store.set_value("cart", &serde_json::json!([])).unwrap();

        assert_eq!(store.get_value("cart").unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_last_update_is_numeric_string() {
        let store = temp_store();
        store.touch_last_update().unwrap();

        let value = store.get_value(keys::LAST_UPDATE).unwrap();
        let raw = value.as_str().expect("lastUpdate is a string");
        assert!(raw.parse::<i64>().is_ok());
    }
}
