use tracing::{info, instrument};

use super::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::model::user::User;
use crate::store::Directory;

/// Returns the active user whose username and password both match.
///
/// Every rejection is the same [`AppError::AuthFailure`]; the reason is only
/// written to the log.
#[instrument(name = "authenticate", skip(directory, password))]
pub async fn authenticate(directory: &Directory, username: &str, password: &str) -> AppResult<User> {
    let Some(user) = directory.find_by_username(username).await? else {
        info!("Invalid credentials: user not found");
        return Err(AppError::AuthFailure);
    };

    if !verify_password(password, &user.password) {
        info!("Invalid credentials: password mismatch");
        return Err(AppError::AuthFailure);
    }

    if !user.is_active {
        info!(user_id = %user.id, "Invalid credentials: account inactive");
        return Err(AppError::AuthFailure);
    }

    Ok(user)
}
