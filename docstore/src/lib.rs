mod mem;
mod pg;

pub use mem::MemStore;
pub use pg::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// The three record collections managed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Vlogs,
    Sentiments,
    GpsCoordinates,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Vlogs,
        Collection::Sentiments,
        Collection::GpsCoordinates,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Vlogs => "vlogs",
            Collection::Sentiments => "sentiments",
            Collection::GpsCoordinates => "gps_coordinates",
        }
    }
}

/// A record as submitted for insertion. `fields` holds the validated
/// kind-specific payload; `user_id` is kept as a column so list queries
/// can filter on it.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: String,
    pub fields: Value,
}

/// A stored record. `id` and `created_at` are assigned by the store at
/// insert time and never change afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub fields: Value,
}

// Serialized flat: server-assigned columns first, then the kind-specific
// fields at the top level, matching the wire shape clients submitted.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("user_id", &self.user_id)?;
        map.serialize_entry("created_at", &self.created_at.to_rfc3339())?;
        if let Value::Object(fields) = &self.fields {
            for (key, value) in fields {
                if key != "id" && key != "user_id" && key != "created_at" {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document store query failed: {0}")]
    Query(String),

    #[error("invalid namespace {0:?}: expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidNamespace(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub namespace: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Thin pass-through to the external document store. Inserts are atomic
/// per record; list results are always capped by the caller-supplied
/// limit.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: Collection, doc: NewDocument) -> Result<Document>;

    /// List records, optionally filtered by exact `user_id` match,
    /// oldest first. `limit` is mandatory; there is no uncapped read.
    async fn list(
        &self,
        collection: Collection,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>>;

    async fn count(&self, collection: Collection) -> Result<u64>;

    /// Distinct string values of one top-level field across a collection.
    /// Used by the orphan sweep to learn which stored files are referenced.
    async fn field_values(&self, collection: Collection, field: &str) -> Result<Vec<String>>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

pub(crate) fn validate_namespace(namespace: &str) -> Result<()> {
    let mut chars = namespace.chars();
    let head_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidNamespace(namespace.to_string()))
    }
}
