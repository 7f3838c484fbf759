//! Fingerprint history tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MigrateResult;
use crate::fingerprint::SchemaObjectKey;

/// A recorded fingerprint: the last DDL hash observed for one schema object,
/// for one logical owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// Opaque identity assigned by the store.
    pub id: i64,
    /// Object identity.
    pub key: SchemaObjectKey,
    /// Content hash of the object's canonical DDL text.
    pub hash: String,
    /// Logical schema owner this record belongs to.
    pub owner: String,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
}

/// Fingerprint store.
///
/// The store owns record layout and identity. Records are created and
/// updated through [`upsert`](FingerprintStore::upsert); the engine never
/// constructs stored records itself. Owner filtering lets multiple logical
/// schemas share one physical store table.
#[async_trait::async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Check whether the backing store table exists. Callers treat a missing
    /// table as "no history", not as an error.
    async fn exists(&self) -> MigrateResult<bool>;

    /// Create the backing store table.
    async fn initialize(&self) -> MigrateResult<()>;

    /// All records for one logical owner.
    async fn list(&self, owner: &str) -> MigrateResult<Vec<FingerprintRecord>>;

    /// Insert or update the record for (owner, key). The store assigns the
    /// record identity and creation timestamp on insert.
    async fn upsert(&self, owner: &str, key: &SchemaObjectKey, hash: &str) -> MigrateResult<()>;

    /// Delete the record for (owner, key), if present.
    async fn delete(&self, owner: &str, key: &SchemaObjectKey) -> MigrateResult<()>;
}

#[async_trait::async_trait]
impl<S: FingerprintStore + ?Sized> FingerprintStore for std::sync::Arc<S> {
    async fn exists(&self) -> MigrateResult<bool> {
        (**self).exists().await
    }

    async fn initialize(&self) -> MigrateResult<()> {
        (**self).initialize().await
    }

    async fn list(&self, owner: &str) -> MigrateResult<Vec<FingerprintRecord>> {
        (**self).list(owner).await
    }

    async fn upsert(&self, owner: &str, key: &SchemaObjectKey, hash: &str) -> MigrateResult<()> {
        (**self).upsert(owner, key, hash).await
    }

    async fn delete(&self, owner: &str, key: &SchemaObjectKey) -> MigrateResult<()> {
        (**self).delete(owner, key).await
    }
}

/// SQL for initializing the fingerprint table (PostgreSQL).
pub const POSTGRES_INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "_stratum_fingerprints" (
    id BIGSERIAL PRIMARY KEY,
    owner VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    kind VARCHAR(16) NOT NULL,
    hash VARCHAR(64) NOT NULL,
    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
    UNIQUE (owner, name, kind)
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_record() {
        let record = FingerprintRecord {
            id: 1,
            key: SchemaObjectKey::table("users"),
            hash: "abc123".to_string(),
            owner: "main".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(record.key, SchemaObjectKey::table("users"));
        assert_eq!(record.owner, "main");
    }

    #[test]
    fn test_init_sql_has_table_and_owner_column() {
        assert!(POSTGRES_INIT_SQL.contains("_stratum_fingerprints"));
        assert!(POSTGRES_INIT_SQL.contains("owner"));
        assert!(POSTGRES_INIT_SQL.contains("UNIQUE (owner, name, kind)"));
    }
}
