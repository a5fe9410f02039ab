//! Lateness and working-hours rules.
//!
//! Everything here is pure: callers pass the instants and the settings in.
//! All wall-clock arithmetic uses the local clock for both the check-in instant
//! and the configured office start time.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::settings::AppSettings;

/// `late` when `now` is strictly after office start plus the grace period on
/// the same local day, `present` otherwise.
pub fn classify_check_in(now: NaiveDateTime, settings: &AppSettings) -> AppResult<AttendanceStatus> {
    let boundary = now.date().and_time(settings.start_time()?);
    let late_cutoff = boundary + Duration::minutes(i64::from(settings.late_grace_period_minutes));

    if now > late_cutoff {
        Ok(AttendanceStatus::Late)
    } else {
        Ok(AttendanceStatus::Present)
    }
}

/// Elapsed hours between check-in and check-out, rounded half away from zero
/// to two decimals. `None` when the check-out precedes the check-in.
pub fn working_hours<Tz: TimeZone>(check_in: &DateTime<Tz>, check_out: &DateTime<Tz>) -> Option<f64> {
    let elapsed_ms = check_out
        .clone()
        .signed_duration_since(check_in.clone())
        .num_milliseconds();
    if elapsed_ms < 0 {
        return None;
    }

    let hours = elapsed_ms as f64 / 3_600_000.0;
    Some((hours * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_staff: usize,
    pub present: usize,
    pub late: usize,
    /// Active staff without a check-in yet; derived, never stored
    pub not_yet_in: usize,
}

/// Summarizes one day's records against the number of active staff.
pub fn daily_summary(records: &[AttendanceRecord], active_staff: usize) -> DailySummary {
    let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count();
    let checked_in: HashSet<&str> = records.iter().map(|r| r.user_id.as_str()).collect();

    DailySummary {
        total_staff: active_staff,
        present: count(AttendanceStatus::Present),
        late: count(AttendanceStatus::Late),
        not_yet_in: active_staff.saturating_sub(checked_in.len()),
    }
}

/// One staff member's attendance tally over their records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    /// Distinct days with a record that is not `absent`
    pub days_present: usize,
    /// `days_present` times the daily wage, 0 when no wage is set
    pub estimated_salary: f64,
}

pub fn staff_summary(records: &[AttendanceRecord], daily_wage: Option<f64>) -> StaffSummary {
    let days: HashSet<NaiveDate> = records
        .iter()
        .filter(|r| r.status != AttendanceStatus::Absent)
        .map(|r| r.date)
        .collect();

    StaffSummary {
        days_present: days.len(),
        estimated_salary: days.len() as f64 * daily_wage.unwrap_or(0.0),
    }
}
