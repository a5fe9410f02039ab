//! # Storage
//!
//! Every collection (users, attendance, settings) is one serialized JSON
//! document stored under a fixed key in a [`KvStore`]. The capability objects
//! in this module own one collection each and serialize their own
//! read-modify-write cycles, so a store is safe to share between workers.

pub mod directory;
pub mod file;
pub mod ledger;
pub mod mysql;
pub mod settings;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use directory::Directory;
pub use file::FileStore;
pub use ledger::{Clock, Ledger, SystemClock};
pub use mysql::MySqlStore;
pub use settings::SettingsStore;

pub const USERS_KEY: &str = "users";
pub const ATTENDANCE_KEY: &str = "attendance";
pub const SETTINGS_KEY: &str = "settings";

/// Key-value contract the collections are persisted through.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Raw document stored under `key`, `None` if the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Flush and release the backend; called once at shutdown
    async fn close(&self) -> Result<()>;
}

pub(crate) async fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("collection '{key}' is not valid JSON"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub(crate) async fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("failed to serialize collection '{key}'"))?;
    store.put(key, &raw).await
}
