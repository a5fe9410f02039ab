use crate::{
    auth::auth::AuthUser,
    engine::{DailySummary, daily_summary},
    error::AppError,
    model::{attendance::AttendanceFilter, role::Role},
    store::{Directory, Ledger},
};
use actix_web::{HttpResponse, web};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

const RECENT_DAYS: i64 = 5;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub checked_in: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub today: DailySummary,
    /// Oldest first, ending today
    pub recent: Vec<DayCount>,
}

/// Admin overview for today
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Today's counts and the last five days", body = DashboardResponse),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    auth: AuthUser,
    directory: web::Data<Directory>,
    ledger: web::Data<Ledger>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let active_staff = directory
        .list()
        .await?
        .iter()
        .filter(|u| u.role == Role::Staff && u.is_active)
        .count();

    let date = ledger.today();
    let records = ledger.all().await?;
    let on = |day: NaiveDate| {
        let filter = AttendanceFilter { date: Some(day), user_id: None };
        records.iter().filter(|r| filter.matches(r)).cloned().collect::<Vec<_>>()
    };

    let today = daily_summary(&on(date), active_staff);
    let recent = (0..RECENT_DAYS)
        .rev()
        .map(|back| {
            let day = date - Duration::days(back);
            DayCount { date: day, checked_in: on(day).len() }
        })
        .collect();

    Ok(HttpResponse::Ok().json(DashboardResponse { date, today, recent }))
}
