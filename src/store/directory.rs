use chrono::Utc;
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{KvStore, USERS_KEY, load_json, save_json};
use crate::error::{AppError, AppResult};
use crate::model::user::User;

/// Owner of the users collection.
#[derive(Clone)]
pub struct Directory {
    kv: Arc<dyn KvStore>,
    lock: Arc<Mutex<()>>,
}

impl Directory {
    /// Opens the directory, seeding the default administrator on first run.
    pub async fn open(kv: Arc<dyn KvStore>) -> AppResult<Self> {
        if load_json::<Vec<User>>(kv.as_ref(), USERS_KEY).await?.is_none() {
            save_json(kv.as_ref(), USERS_KEY, &[User::default_admin(Utc::now())]).await?;
            info!("Seeded default administrator");
        }

        Ok(Self {
            kv,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(load_json(self.kv.as_ref(), USERS_KEY).await?.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> AppResult<User> {
        self.list()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User".into()))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        debug!(username, "Looking up user");
        Ok(self.list().await?.into_iter().find(|u| u.username == username))
    }

    /// Inserts a new user or replaces the stored one with the same id.
    ///
    /// This is a full replace: optional fields left `None` are cleared.
    pub async fn upsert(&self, user: User) -> AppResult<()> {
        validate_user(&user)?;

        let _guard = self.lock.lock().await;
        let mut users = self.list().await?;

        if users.iter().any(|u| u.username == user.username && u.id != user.id) {
            warn!(username = %user.username, "Rejected duplicate username");
            return Err(AppError::Validation("Username already taken".into()));
        }

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                info!(user_id = %user.id, "Replacing user");
                *existing = user;
            }
            None => {
                info!(user_id = %user.id, role = %user.role, "Adding user");
                users.push(user);
            }
        }

        save_json(self.kv.as_ref(), USERS_KEY, &users).await?;
        Ok(())
    }

    /// Hard delete. Returns whether anything was removed; unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut users = self.list().await?;
        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() == before {
            debug!(user_id = id, "Remove of unknown user ignored");
            return Ok(false);
        }

        save_json(self.kv.as_ref(), USERS_KEY, &users).await?;
        info!(user_id = id, "User removed");
        Ok(true)
    }

    /// Replaces the stored credential. `password` is stored as given.
    pub async fn set_password(&self, id: &str, password: &str) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".into()));
        }

        let _guard = self.lock.lock().await;
        let mut users = self.list().await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User".into()))?;
        user.password = password.to_string();

        save_json(self.kv.as_ref(), USERS_KEY, &users).await?;
        info!(user_id = id, "Password changed");
        Ok(())
    }
}

fn validate_user(user: &User) -> AppResult<()> {
    if user.id.trim().is_empty() {
        return Err(AppError::Validation("User id must not be empty".into()));
    }
    if user.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if user.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    if user.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name must not be empty".into()));
    }
    if let Some(wage) = user.daily_wage {
        if !wage.is_finite() || wage < 0.0 {
            return Err(AppError::Validation("Daily wage must be a non-negative number".into()));
        }
    }
    Ok(())
}
