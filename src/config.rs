use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Directory for the file-backed collections
    pub data_dir: String,
    /// When present, collections are stored in MySQL instead of `data_dir`
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    /// Store new passwords as argon2 hashes instead of plaintext
    pub hash_passwords: bool,
}

fn var_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .with_context(|| format!("{key} has an invalid value"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: text_or("SERVER_ADDR", "127.0.0.1:8080"),
            data_dir: text_or("DATA_DIR", "data"),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            // default one working day
            access_token_ttl: var_or(&lookup, "ACCESS_TOKEN_TTL", "43200")?,

            rate_login_per_min: var_or(&lookup, "RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: var_or(&lookup, "RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: text_or("API_PREFIX", "/api"),
            log_dir: text_or("LOG_DIR", "logs"),
            hash_passwords: var_or(&lookup, "HASH_PASSWORDS", "false")?,
        })
    }
}
