use crate::{
    auth::{auth::AuthUser, password::hash_password},
    config::Config,
    error::AppError,
    model::{role::Role, user::User},
    models::UserResponse,
    store::Directory,
};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Staff create/edit form. Edits replace the whole record, so optional
/// fields left out are cleared.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffForm {
    #[schema(example = "jane")]
    pub username: String,
    /// Required on create; on edit the stored password is kept when omitted
    #[schema(example = "Welcome@1")]
    pub password: Option<String>,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "+9779800000000")]
    pub mobile: Option<String>,
    #[schema(example = "Teacher")]
    pub designation: Option<String>,
    #[schema(example = 1500.0)]
    pub daily_wage: Option<f64>,
    /// Defaults to active
    pub is_active: Option<bool>,
}

fn credential(config: &Config, password: &str) -> Result<String, AppError> {
    if config.hash_passwords {
        hash_password(password)
    } else {
        Ok(password.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// List staff (admin)
#[utoipa::path(
    get,
    path = "/api/staff",
    responses(
        (status = 200, description = "Staff accounts in stored order", body = [UserResponse]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_staff(auth: AuthUser, directory: web::Data<Directory>) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let staff: Vec<UserResponse> = directory
        .list()
        .await?
        .into_iter()
        .filter(|u| u.role == Role::Staff)
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(staff))
}

/// Create staff (admin)
#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = StaffForm,
    responses(
        (status = 201, description = "Staff created", body = UserResponse),
        (status = 400, description = "Validation failure", body = Object, example = json!({
            "message": "Username already taken"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn create_staff(
    auth: AuthUser,
    directory: web::Data<Directory>,
    config: web::Data<Config>,
    form: web::Json<StaffForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let form = form.into_inner();

    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password must not be empty".into()))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: form.username.trim().to_string(),
        password: credential(&config, &password)?,
        role: Role::Staff,
        full_name: form.full_name.trim().to_string(),
        mobile: non_blank(form.mobile),
        designation: non_blank(form.designation),
        daily_wage: form.daily_wage,
        is_active: form.is_active.unwrap_or(true),
        created_at: Utc::now(),
    };

    directory.upsert(user.clone()).await?;
    info!(user_id = %user.id, by = %auth.user_id, "Staff created");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Get staff by id (admin)
#[utoipa::path(
    get,
    path = "/api/staff/{id}",
    params(("id", Path, description = "User id")),
    responses(
        (status = 200, description = "Staff found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn get_staff(
    auth: AuthUser,
    directory: web::Data<Directory>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let user = directory.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Replace staff details (admin)
#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    params(("id", Path, description = "User id")),
    request_body = StaffForm,
    responses(
        (status = 200, description = "Staff updated", body = UserResponse),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_staff(
    auth: AuthUser,
    directory: web::Data<Directory>,
    config: web::Data<Config>,
    path: web::Path<String>,
    form: web::Json<StaffForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let form = form.into_inner();
    let existing = directory.get(&path.into_inner()).await?;

    let password = match form.password.filter(|p| !p.is_empty()) {
        Some(new_password) => credential(&config, &new_password)?,
        None => existing.password,
    };

    let user = User {
        id: existing.id,
        username: form.username.trim().to_string(),
        password,
        role: existing.role,
        full_name: form.full_name.trim().to_string(),
        mobile: non_blank(form.mobile),
        designation: non_blank(form.designation),
        daily_wage: form.daily_wage,
        is_active: form.is_active.unwrap_or(true),
        created_at: existing.created_at,
    };

    directory.upsert(user.clone()).await?;
    info!(user_id = %user.id, by = %auth.user_id, "Staff updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Delete staff (admin)
#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    params(("id", Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted, or nothing to delete", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn delete_staff(
    auth: AuthUser,
    directory: web::Data<Directory>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let id = path.into_inner();
    if id == auth.user_id {
        return Err(AppError::Validation("You cannot delete your own account".into()));
    }
    directory.remove(&id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
