use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::store::{FileStore, KvStore, MySqlStore};

/// Opens the configured key-value backend: MySQL when `DATABASE_URL` is set,
/// otherwise JSON files under `DATA_DIR`.
pub async fn init_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    match &config.database_url {
        Some(url) => {
            info!("Using MySQL store");
            Ok(Arc::new(MySqlStore::open(url).await?))
        }
        None => {
            info!(dir = %config.data_dir, "Using file store");
            Ok(Arc::new(FileStore::open(&config.data_dir)?))
        }
    }
}
