use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    HalfDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "6f1c7f7e-2f0b-4a55-9f0e-1c2d3e4f5a6b",
    "userId": "b7d9a7c2-0c34-4f0e-8a41-5b1f1f2a3c4d",
    "userName": "Jane Doe",
    "date": "2026-01-05",
    "checkInTime": "2026-01-05T09:14:00+00:00",
    "checkOutTime": "2026-01-05T17:30:00+00:00",
    "checkInPhoto": "data:image/jpeg;base64,...",
    "checkOutPhoto": "data:image/jpeg;base64,...",
    "status": "present",
    "workingHours": 8.27
}))]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    /// Full name of the user at check-in time
    pub user_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<DateTime<Local>>,
    pub check_in_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_photo: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<f64>,
}

impl AttendanceRecord {
    pub fn is_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }
}

/// Optional equality filters for ledger queries.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    /// Only records for this calendar day (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
    /// Only records for this user id
    pub user_id: Option<String>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.date.is_none_or(|d| record.date == d)
            && self.user_id.as_deref().is_none_or(|id| record.user_id == id)
    }
}
