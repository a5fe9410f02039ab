use crate::{auth::auth::AuthUser, error::AppError, model::settings::AppSettings, store::SettingsStore};
use actix_web::{HttpResponse, web};

/// Current attendance rules
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Office start time and grace period", body = AppSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(_auth: AuthUser, settings: web::Data<SettingsStore>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(settings.get().await?))
}

/// Update attendance rules (admin)
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = AppSettings,
    responses(
        (status = 200, description = "Rules saved", body = AppSettings),
        (status = 400, description = "Malformed start time", body = Object, example = json!({
            "message": "Office start time must be HH:MM between 00:00 and 23:59, got '25:00'"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    settings: web::Data<SettingsStore>,
    body: web::Json<AppSettings>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let rules = body.into_inner();
    settings.save(&rules).await?;
    Ok(HttpResponse::Ok().json(rules))
}
