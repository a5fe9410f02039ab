use crate::auth::auth::AuthUser;
use crate::engine::{StaffSummary, staff_summary};
use crate::error::AppError;
use crate::model::attendance::{AttendanceFilter, AttendanceRecord};
use crate::store::{Directory, Ledger};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct PhotoPayload {
    /// Captured image, usually a base64 data URL; empty means the capture was cancelled
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQSkZJRg...")]
    pub photo: String,
}

fn require_photo(payload: &PhotoPayload) -> Result<&str, AppError> {
    if payload.photo.trim().is_empty() {
        return Err(AppError::Validation("A photo is required".into()));
    }
    Ok(&payload.photo)
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = PhotoPayload,
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceRecord),
        (status = 400, description = "Already checked in today or photo missing", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn check_in(
    auth: AuthUser,
    directory: web::Data<Directory>,
    ledger: web::Data<Ledger>,
    payload: web::Json<PhotoPayload>,
) -> Result<HttpResponse, AppError> {
    let photo = require_photo(&payload)?;

    let user = directory.get(&auth.user_id).await?;
    let record = ledger.check_in_once(&user.id, &user.full_name, photo).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = PhotoPayload,
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceRecord),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn check_out(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    payload: web::Json<PhotoPayload>,
) -> Result<HttpResponse, AppError> {
    let photo = require_photo(&payload)?;

    let record = ledger.check_out_open(&auth.user_id, photo).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Today's record for the signed-in user
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, or null before check-in", body = AttendanceRecord),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(auth: AuthUser, ledger: web::Data<Ledger>) -> Result<HttpResponse, AppError> {
    let record = ledger.today_for(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Own attendance history, most recent first
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    responses(
        (status = 200, description = "Own records", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(auth: AuthUser, ledger: web::Data<Ledger>) -> Result<HttpResponse, AppError> {
    let filter = AttendanceFilter {
        date: None,
        user_id: Some(auth.user_id),
    };
    Ok(HttpResponse::Ok().json(ledger.query(&filter).await?))
}

/// Attendance records for review (admin)
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Matching records, most recent first", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    ledger: web::Data<Ledger>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let records = ledger.query(&query).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Days present and estimated pay for the signed-in user
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, description = "Own attendance tally", body = StaffSummary),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    directory: web::Data<Directory>,
    ledger: web::Data<Ledger>,
) -> Result<HttpResponse, AppError> {
    let user = directory.get(&auth.user_id).await?;
    let filter = AttendanceFilter {
        date: None,
        user_id: Some(user.id),
    };
    let records = ledger.query(&filter).await?;

    Ok(HttpResponse::Ok().json(staff_summary(&records, user.daily_wage)))
}
