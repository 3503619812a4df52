//! Postgres-backed version store.
//!
//! One row per applied `(scope, version)` pair. Writes are idempotent at the
//! SQL level: inserts use `ON CONFLICT DO NOTHING` and removals are
//! unconditional deletes.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::StoreError;
use crate::store::VersionStore;
use crate::unit::Scope;

/// Default name of the version tracking table.
pub const DEFAULT_VERSIONS_TABLE: &str = "stratum_versions";

/// Version store backed by a Postgres table.
///
/// Cloning is cheap (the pool is shared), so the same handle type works both
/// as the runner's store and as the context passed into hooks, which reach
/// the database through [`PgVersionStore::pool`].
#[derive(Clone)]
pub struct PgVersionStore {
    pool: PgPool,
    table: String,
}

impl PgVersionStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, DEFAULT_VERSIONS_TABLE)
    }

    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Connect a new pool from a database URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to database: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// The underlying connection pool, for hook bodies.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the version tracking table if it does not exist.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(&self.create_table_sql())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StoreError::WriteFailed(format!("Failed to create versions table: {}", e))
            })?;
        Ok(())
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
                scope VARCHAR(8) NOT NULL,\n    \
                version BIGINT NOT NULL,\n    \
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n    \
                PRIMARY KEY (scope, version)\n\
            );",
            self.table
        )
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn applied_versions(&self, scope: Scope) -> Result<HashSet<i64>, StoreError> {
        let sql = format!("SELECT version FROM {} WHERE scope = $1", self.table);
        let rows = sqlx::query(&sql)
            .bind(scope.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to list applied versions: {}", e))
            })?;

        let mut versions = HashSet::with_capacity(rows.len());
        for row in rows {
            let version: i64 = row.try_get("version").map_err(|e| {
                StoreError::Unavailable(format!("Failed to read version column: {}", e))
            })?;
            versions.insert(version);
        }
        Ok(versions)
    }

    async fn record_applied(&self, scope: Scope, number: i64) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (scope, version) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.table
        );
        sqlx::query(&sql)
            .bind(scope.as_str())
            .bind(number)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StoreError::WriteFailed(format!(
                    "Failed to record version {} for scope {}: {}",
                    number, scope, e
                ))
            })?;
        Ok(())
    }

    async fn record_unapplied(&self, scope: Scope, number: i64) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE scope = $1 AND version = $2", self.table);
        sqlx::query(&sql)
            .bind(scope.as_str())
            .bind(number)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StoreError::WriteFailed(format!(
                    "Failed to remove version {} for scope {}: {}",
                    number, scope, e
                ))
            })?;
        Ok(())
    }
}
