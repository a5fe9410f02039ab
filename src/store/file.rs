use anyhow::{Context, Result};
use actix_web::web;
use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::KvStore;

/// One `<key>.json` file per collection inside a data directory. File I/O runs
/// on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create data directory {}", base_dir.display()))?;
        debug!(dir = %base_dir.display(), "File store opened");
        Ok(Self { base_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let read = web::block(move || fs::read_to_string(path))
            .await
            .context("file store worker failed")?;

        match read {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read collection '{key}'")),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let owned_key = key.to_string();
        let value = value.to_string();

        web::block(move || -> Result<()> {
            // Atomic write using temp file
            let temp_path = path.with_extension("tmp");
            fs::write(&temp_path, value)
                .with_context(|| format!("failed to write collection '{owned_key}'"))?;
            fs::rename(&temp_path, &path)
                .with_context(|| format!("failed to replace collection '{owned_key}'"))?;
            Ok(())
        })
        .await
        .context("file store worker failed")?
    }

    async fn close(&self) -> Result<()> {
        // every put already reached the filesystem
        debug!(dir = %self.base_dir.display(), "File store closed");
        Ok(())
    }
}
