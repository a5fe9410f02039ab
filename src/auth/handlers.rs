use crate::{
    auth::{auth::AuthUser, gate::authenticate, jwt::generate_access_token, password::hash_password},
    config::Config,
    error::AppError,
    models::{LoginReqDto, LoginResponse, UserResponse},
    store::Directory,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

/// Sign in
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "message": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(directory, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    directory: web::Data<Directory>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::Validation("Username or password required".into()));
    }

    let account = authenticate(&directory, &user.username, &user.password).await?;

    debug!(user_id = %account.id, "Generating access token");
    let access_token = generate_access_token(&account, &config.jwt_secret, config.access_token_ttl)?;

    info!(user_id = %account.id, role = %account.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        user: UserResponse::from(account),
    }))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, directory: web::Data<Directory>) -> Result<HttpResponse, AppError> {
    let user = directory.get(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    #[schema(example = "N3w!password")]
    pub new_password: String,
}

/// Change own password
#[utoipa::path(
    put,
    path = "/api/me/password",
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed", body = Object, example = json!({
            "message": "Password changed successfully"
        })),
        (status = 400, description = "Empty password"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    auth: AuthUser,
    directory: web::Data<Directory>,
    config: web::Data<Config>,
    body: web::Json<ChangePassword>,
) -> Result<HttpResponse, AppError> {
    if body.new_password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }

    let stored = if config.hash_passwords {
        hash_password(&body.new_password)?
    } else {
        body.new_password.clone()
    };
    directory.set_password(&auth.user_id, &stored).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password changed successfully"
    })))
}
