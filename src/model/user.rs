use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

pub const DEFAULT_ADMIN_ID: &str = "admin-001";

/// A staff or admin identity as stored in the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Plaintext, or an argon2 PHC string when password hashing is enabled
    pub password: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_wage: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn default_admin(created_at: DateTime<Utc>) -> Self {
        Self {
            id: DEFAULT_ADMIN_ID.to_string(),
            username: "admin".to_string(),
            password: "Admin@123".to_string(),
            role: Role::Admin,
            full_name: "System Administrator".to_string(),
            mobile: None,
            designation: None,
            daily_wage: None,
            is_active: true,
            created_at,
        }
    }
}
