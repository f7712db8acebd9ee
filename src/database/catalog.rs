use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};

/// Read-only view of the PostgreSQL catalogs the schema health check needs
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Number of tables called `table` in `schema` (0 or 1 in practice)
    async fn table_count(&self, schema: &str, table: &str) -> Result<i64, DatabaseError>;

    /// `pg_class.relrowsecurity` for the table, `None` when no row matches
    async fn row_security(&self, schema: &str, table: &str) -> Result<Option<bool>, DatabaseError>;

    /// Number of routines with the given name
    async fn routine_count(&self, routine: &str) -> Result<i64, DatabaseError>;

    /// Invoke `routine()` with the tenant session variable cleared and return its text value
    async fn probe_tenant_function(
        &self,
        routine: &str,
        setting: Option<&str>,
    ) -> Result<Option<String>, DatabaseError>;
}

/// `SchemaCatalog` backed by a sqlx pool. Every query checks a connection
/// out of the pool and hands it back when the future completes.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaCatalog for PgCatalog {
    async fn table_count(&self, schema: &str, table: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = $1 AND table_schema = $2",
        )
        .bind(table)
        .bind(schema)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn row_security(&self, schema: &str, table: &str) -> Result<Option<bool>, DatabaseError> {
        let enabled: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT c.relrowsecurity
            FROM pg_class c
            JOIN pg_namespace n ON c.relnamespace = n.oid
            WHERE c.relname = $1 AND n.nspname = $2
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enabled)
    }

    async fn routine_count(&self, routine: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.routines WHERE routine_name = $1",
        )
        .bind(routine)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn probe_tenant_function(
        &self,
        routine: &str,
        setting: Option<&str>,
    ) -> Result<Option<String>, DatabaseError> {
        DatabaseManager::check_identifier(routine)?;

        // One connection for the whole probe; set_config(.., true) is scoped to
        // this transaction and the rollback leaves the session untouched.
        let mut tx = self.pool.begin().await?;

        if let Some(setting) = setting {
            sqlx::query("SELECT set_config($1, '', true)")
                .bind(setting)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!("SELECT {}()::text", DatabaseManager::quote_identifier(routine));
        let value: Option<String> = sqlx::query_scalar(&query).fetch_one(&mut *tx).await?;

        tx.rollback().await?;

        debug!(routine, ?value, "Tenant function probed");
        Ok(value)
    }
}
