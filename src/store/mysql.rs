use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::info;

use super::KvStore;

/// Collections kept as rows of a single `kv_store` table.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn open(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                name VARCHAR(64) NOT NULL PRIMARY KEY,
                body LONGTEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create kv_store table")?;

        info!("MySQL store opened");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KvStore for MySqlStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT body FROM kv_store WHERE name = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read collection '{key}'"))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (name, body)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE body = VALUES(body)
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write collection '{key}'"))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        info!("MySQL store closed");
        Ok(())
    }
}
