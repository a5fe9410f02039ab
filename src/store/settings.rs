use futures::lock::Mutex;
use std::sync::Arc;
use tracing::info;

use super::{KvStore, SETTINGS_KEY, load_json, save_json};
use crate::error::AppResult;
use crate::model::settings::AppSettings;

/// Owner of the singleton [`AppSettings`] document.
#[derive(Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KvStore>,
    lock: Arc<Mutex<()>>,
}

impl SettingsStore {
    /// Opens the store, writing the default rules on first run.
    pub async fn open(kv: Arc<dyn KvStore>) -> AppResult<Self> {
        if load_json::<AppSettings>(kv.as_ref(), SETTINGS_KEY).await?.is_none() {
            save_json(kv.as_ref(), SETTINGS_KEY, &AppSettings::default()).await?;
            info!("Seeded default attendance settings");
        }

        Ok(Self {
            kv,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub async fn get(&self) -> AppResult<AppSettings> {
        let settings = load_json(self.kv.as_ref(), SETTINGS_KEY).await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn save(&self, settings: &AppSettings) -> AppResult<()> {
        settings.validate()?;

        let _guard = self.lock.lock().await;
        save_json(self.kv.as_ref(), SETTINGS_KEY, settings).await?;
        info!(
            office_start_time = %settings.office_start_time,
            grace_minutes = settings.late_grace_period_minutes,
            "Attendance settings updated"
        );
        Ok(())
    }
}
