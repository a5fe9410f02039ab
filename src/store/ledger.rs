use chrono::{DateTime, Local, NaiveDate};
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ATTENDANCE_KEY, KvStore, SettingsStore, load_json, save_json};
use crate::engine;
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceFilter, AttendanceRecord};
use crate::model::settings::AppSettings;

/// Source of the local "now" used for check-in/out.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Owner of the attendance collection.
///
/// `check_in` and `check_out` do not look for an existing record or an earlier
/// check-out; `check_in_once` and `check_out_open` add those checks atomically.
#[derive(Clone)]
pub struct Ledger {
    kv: Arc<dyn KvStore>,
    settings: SettingsStore,
    clock: Arc<dyn Clock>,
    lock: Arc<Mutex<()>>,
}

impl Ledger {
    pub async fn open(kv: Arc<dyn KvStore>, settings: SettingsStore, clock: Arc<dyn Clock>) -> AppResult<Self> {
        if load_json::<Vec<AttendanceRecord>>(kv.as_ref(), ATTENDANCE_KEY).await?.is_none() {
            save_json::<[AttendanceRecord]>(kv.as_ref(), ATTENDANCE_KEY, &[]).await?;
            info!("Initialized empty attendance ledger");
        }

        Ok(Self {
            kv,
            settings,
            clock,
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// Today's calendar day on the local clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    /// Records a new check-in stamped with the current instant.
    pub async fn check_in(&self, user_id: &str, user_name: &str, photo: &str) -> AppResult<AttendanceRecord> {
        if photo.is_empty() {
            return Err(AppError::Validation("Check-in photo is required".into()));
        }

        let rules = self.settings.get().await?;

        let _guard = self.lock.lock().await;
        let mut records = self.all().await?;
        self.append_check_in(&mut records, self.clock.now(), user_id, user_name, photo, &rules)
            .await
    }

    /// Like [`Ledger::check_in`], but refuses a user who already has a record
    /// today. The lookup and the write happen under the same lock.
    pub async fn check_in_once(&self, user_id: &str, user_name: &str, photo: &str) -> AppResult<AttendanceRecord> {
        if photo.is_empty() {
            return Err(AppError::Validation("Check-in photo is required".into()));
        }

        let rules = self.settings.get().await?;

        let _guard = self.lock.lock().await;
        let mut records = self.all().await?;
        let now = self.clock.now();
        let today = now.date_naive();

        if records.iter().any(|r| r.user_id == user_id && r.date == today) {
            info!(user_id, "Rejected second check-in for today");
            return Err(AppError::Validation("Already checked in today".into()));
        }

        self.append_check_in(&mut records, now, user_id, user_name, photo, &rules)
            .await
    }

    async fn append_check_in(
        &self,
        records: &mut Vec<AttendanceRecord>,
        now: DateTime<Local>,
        user_id: &str,
        user_name: &str,
        photo: &str,
        rules: &AppSettings,
    ) -> AppResult<AttendanceRecord> {
        let status = engine::classify_check_in(now.naive_local(), rules)?;

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            date: now.date_naive(),
            check_in_time: now,
            check_out_time: None,
            check_in_photo: photo.to_string(),
            check_out_photo: None,
            status,
            working_hours: None,
        };

        records.push(record.clone());
        save_json(self.kv.as_ref(), ATTENDANCE_KEY, &*records).await?;

        info!(
            record_id = %record.id,
            user_id,
            status = %record.status,
            "Checked in"
        );
        Ok(record)
    }

    /// Stamps the check-out on `record_id`. A second call overwrites the first.
    pub async fn check_out(&self, record_id: &str, photo: &str) -> AppResult<AttendanceRecord> {
        if photo.is_empty() {
            return Err(AppError::Validation("Check-out photo is required".into()));
        }

        let _guard = self.lock.lock().await;
        let mut records = self.all().await?;
        let index = records
            .iter()
            .position(|r| r.id == record_id)
            .ok_or_else(|| AppError::NotFound("Attendance record".into()))?;

        self.stamp_check_out(records, index, photo).await
    }

    /// Checks out the user's open record for today. Finding the record and
    /// stamping it happen under the same lock, so only one request can close it.
    pub async fn check_out_open(&self, user_id: &str, photo: &str) -> AppResult<AttendanceRecord> {
        if photo.is_empty() {
            return Err(AppError::Validation("Check-out photo is required".into()));
        }

        let _guard = self.lock.lock().await;
        let records = self.all().await?;
        let today = self.today();
        let index = records
            .iter()
            .position(|r| r.user_id == user_id && r.date == today && !r.is_checked_out())
            .ok_or_else(|| AppError::Validation("No active check-in found for today".into()))?;

        self.stamp_check_out(records, index, photo).await
    }

    async fn stamp_check_out(
        &self,
        mut records: Vec<AttendanceRecord>,
        index: usize,
        photo: &str,
    ) -> AppResult<AttendanceRecord> {
        let record = &mut records[index];
        let record_id = record.id.clone();

        let now = self.clock.now();
        let hours = engine::working_hours(&record.check_in_time, &now).ok_or_else(|| {
            warn!(%record_id, check_in = %record.check_in_time, now = %now, "Check-out before check-in");
            AppError::Validation("Check-out time is earlier than check-in time".into())
        })?;

        if record.is_checked_out() {
            warn!(%record_id, "Overwriting an existing check-out");
        }
        record.check_out_time = Some(now);
        record.check_out_photo = Some(photo.to_string());
        record.working_hours = Some(hours);
        let updated = record.clone();

        save_json(self.kv.as_ref(), ATTENDANCE_KEY, &records).await?;
        info!(%record_id, working_hours = hours, "Checked out");
        Ok(updated)
    }

    /// Matching records, most recent check-in first.
    pub async fn query(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .all()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        records.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));

        debug!(?filter, count = records.len(), "Attendance query");
        Ok(records)
    }

    /// Every record in stored order.
    pub async fn all(&self) -> AppResult<Vec<AttendanceRecord>> {
        Ok(load_json(self.kv.as_ref(), ATTENDANCE_KEY).await?.unwrap_or_default())
    }

    /// The user's record for today, if any.
    pub async fn today_for(&self, user_id: &str) -> AppResult<Option<AttendanceRecord>> {
        let filter = AttendanceFilter {
            date: Some(self.today()),
            user_id: Some(user_id.to_string()),
        };
        Ok(self.query(&filter).await?.into_iter().next())
    }
}
