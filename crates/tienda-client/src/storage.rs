//! # File Storage
//!
//! `Storage` backed by one JSON file, so the cart and admin session survive
//! between CLI runs.
//!
//! ## File Layout
//! ```text
//! storage.json
//! {
//!   "carrito":    "[{\"id\":1,\"nombre\":\"Tomate\",...}]",
//!   "admin_auth": "YWRtaW46c2VjcmV0bw=="
//! }
//! ```
//! Values are opaque strings; the file is a flat string → string map.
//!
//! ## Write Path
//! ```text
//! set/remove ──► change a copy of the map ──► write storage.json.tmp ──► rename
//!                                                                     │
//!                                              commit copy to memory ◄┘
//! ```
//! The rename replaces the file in one step, so a crash mid-write leaves
//! the previous contents intact. A failed write leaves memory untouched too,
//! so reads never see a value that is not on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use tienda_core::{Storage, StorageError};

/// A string-keyed store persisted as a JSON object.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(?path, error = %e, "Storage file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "Storage file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(?path, error = %e, "Storage file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        FileStorage {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        let mut updated = entries.clone();
        change(&mut updated);
        self.write(&updated)?;
        *entries = updated;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::{CartStore, Money, Product, CART_STORAGE_KEY};

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("storage.json"));
        assert_eq!(storage.get(CART_STORAGE_KEY), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("storage.json");

        let storage = FileStorage::open(&path);
        storage.set("admin_auth", "dG9rZW4=").unwrap();
        storage.set("carrito", "[]").unwrap();
        storage.remove("admin_auth").unwrap();

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("carrito").as_deref(), Some("[]"));
        assert_eq!(reopened.get("admin_auth"), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_empty_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{{{ not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("carrito"), None);

        storage.set("carrito", "[]").unwrap();
        assert_eq!(FileStorage::open(&path).get("carrito").as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let storage = FileStorage::open(blocker.join("storage.json"));
        assert!(storage.set("admin_auth", "dG9rZW4=").is_err());
        assert_eq!(storage.get("admin_auth"), None);
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::open(&path);
        storage.set("carrito", "[]").unwrap();

        // A directory where the temp file goes makes the next write fail
        fs::create_dir(path.with_extension("json.tmp")).unwrap();

        assert!(storage.remove("carrito").is_err());
        assert_eq!(storage.get("carrito").as_deref(), Some("[]"));
    }

    #[test]
    fn test_cart_persists_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let pear = Product::new(5, "Pera", Money::from_cents(180), "kg", "fruta");

        {
            let mut cart = CartStore::load(FileStorage::open(&path));
            cart.add(&pear, 2);
            cart.add(&pear, 1);
        }

        let cart = CartStore::load(FileStorage::open(&path));
        assert_eq!(cart.line(5).unwrap().quantity, 3);
        assert_eq!(cart.total().to_string(), "5.40€");
    }
}
