use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Local wall-clock start of the working day, "HH:MM"
    #[schema(example = "09:00")]
    pub office_start_time: String,
    #[schema(example = 15)]
    pub late_grace_period_minutes: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            office_start_time: "09:00".to_string(),
            late_grace_period_minutes: 15,
        }
    }
}

impl AppSettings {
    pub fn start_time(&self) -> AppResult<NaiveTime> {
        let raw = self.office_start_time.trim();
        // chrono accepts "9:00" for %H, the stored form is always two digits
        if raw.len() != 5 {
            return Err(invalid_start(raw));
        }
        NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| invalid_start(raw))
    }

    pub fn validate(&self) -> AppResult<()> {
        self.start_time().map(|_| ())
    }
}

fn invalid_start(raw: &str) -> AppError {
    AppError::Validation(format!(
        "Office start time must be HH:MM between 00:00 and 23:59, got '{raw}'"
    ))
}
