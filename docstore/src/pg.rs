use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    validate_namespace, Collection, Config, Document, DocumentStore, NewDocument, Result,
    StoreError,
};

/// PostgreSQL-backed document store. Each collection is a table inside a
/// dedicated schema named by the configured namespace, with the record
/// payload in a JSONB column.
pub struct PgStore {
    pool: PgPool,
    namespace: String,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Unavailable(e.to_string()),
            _ => StoreError::Query(e.to_string()),
        }
    }
}

impl PgStore {
    /// Connect, verify connectivity, and create the namespace schema and
    /// collection tables if they do not exist yet.
    pub async fn connect(config: &Config) -> Result<Self> {
        validate_namespace(&config.namespace)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = Self {
            pool,
            namespace: config.namespace.clone(),
        };
        store.init_tables().await?;

        info!(namespace = %store.namespace, "connected to document store");
        Ok(store)
    }

    // Namespace and table names are validated/static, so splicing them into
    // DDL and query text is safe; all record values go through bind params.
    fn qualified(&self, collection: Collection) -> String {
        format!(r#""{}"."{}""#, self.namespace, collection.table())
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, self.namespace))
            .execute(&self.pool)
            .await?;

        for collection in Collection::ALL {
            sqlx::query(&format!(
                r#"CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    fields JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL
                )"#,
                self.qualified(collection)
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                r#"CREATE INDEX IF NOT EXISTS {}_user_id_idx ON {} (user_id)"#,
                collection.table(),
                self.qualified(collection)
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PgStore {
    #[instrument(skip(self, doc), fields(collection = collection.table(), user_id = %doc.user_id))]
    async fn insert(&self, collection: Collection, doc: NewDocument) -> Result<Document> {
        let stored = Document {
            id: Uuid::new_v4(),
            user_id: doc.user_id,
            created_at: Utc::now(),
            fields: doc.fields,
        };

        sqlx::query(&format!(
            "INSERT INTO {} (id, user_id, fields, created_at) VALUES ($1, $2, $3, $4)",
            self.qualified(collection)
        ))
        .bind(stored.id)
        .bind(&stored.user_id)
        .bind(&stored.fields)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %stored.id, "document inserted");
        Ok(stored)
    }

    #[instrument(skip(self), fields(collection = collection.table()))]
    async fn list(
        &self,
        collection: Collection,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let docs = sqlx::query_as::<_, Document>(&format!(
            "SELECT id, user_id, fields, created_at FROM {}
             WHERE ($1::text IS NULL OR user_id = $1)
             ORDER BY created_at ASC
             LIMIT $2",
            self.qualified(collection)
        ))
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
        let doc = sqlx::query_as::<_, Document>(&format!(
            "SELECT id, user_id, fields, created_at FROM {} WHERE id = $1",
            self.qualified(collection)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.qualified(collection)))
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn field_values(&self, collection: Collection, field: &str) -> Result<Vec<String>> {
        let values: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT fields->>$1 FROM {} WHERE fields->>$1 IS NOT NULL",
            self.qualified(collection)
        ))
        .bind(field)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
