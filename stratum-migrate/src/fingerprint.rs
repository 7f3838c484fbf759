//! Content fingerprints for schema objects.
//!
//! A fingerprint is the SHA-256 hash of the canonical DDL text the builders
//! would emit for an object today. The hash is the sole change signal the
//! planner sees, so text generation must be byte-identical across runs and
//! platforms for an unchanged model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smol_str::SmolStr;
use stratum_schema::RelationalModel;

use crate::sql::PostgresDdlBuilder;

/// The kind of a schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaObjectKind {
    /// A table.
    Table,
    /// An index.
    Index,
}

impl SchemaObjectKind {
    /// Storage text for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
        }
    }
}

/// Identity of a schema object: name plus kind.
///
/// Equality and hashing are by the (name, kind) pair, so a table and an
/// index may share a name without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaObjectKey {
    /// Object name.
    pub name: SmolStr,
    /// Object kind.
    pub kind: SchemaObjectKind,
}

impl SchemaObjectKey {
    /// Key for a table.
    pub fn table(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: SchemaObjectKind::Table,
        }
    }

    /// Key for an index.
    pub fn index(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: SchemaObjectKind::Index,
        }
    }
}

/// Hash canonical DDL text into a content fingerprint.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes the current fingerprint of every table and index in a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintGenerator {
    builder: PostgresDdlBuilder,
}

impl FingerprintGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute fingerprints for every table and index in the model, in model
    /// declaration order.
    ///
    /// A table's fingerprint covers only its own create-table text; each of
    /// its indexes is fingerprinted from its single create-index statement,
    /// generated via the per-table index collection. An index edit therefore
    /// never reads as a table change.
    pub fn generate(&self, model: &RelationalModel) -> IndexMap<SchemaObjectKey, String> {
        let mut fingerprints = IndexMap::new();

        for table in model.tables() {
            let table_ddl = self.builder.create_table(table).render();
            fingerprints.insert(
                SchemaObjectKey::table(table.name.clone()),
                fingerprint(&table_ddl),
            );

            for index in &table.indexes {
                let index_ddl = self.builder.create_index(index).render();
                fingerprints.insert(
                    SchemaObjectKey::index(index.name.clone()),
                    fingerprint(&index_ddl),
                );
            }
        }

        fingerprints
    }
}

#[cfg(test)]
mod tests {
    use stratum_schema::{ColumnDescriptor, EntitySet, IndexDescriptor, TableDescriptor};

    use super::*;

    fn model() -> RelationalModel {
        let mut table = TableDescriptor::new("users");
        table.add_column(ColumnDescriptor::new("id", "INTEGER").auto_increment());
        table.add_column(ColumnDescriptor::new("name", "TEXT"));
        table.set_primary_key(["id"]);
        table.add_index(IndexDescriptor::new("ix_users_name", "users", ["name"]));

        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", table));
        model
    }

    #[test]
    fn test_key_equality_is_by_name_and_kind() {
        assert_eq!(SchemaObjectKey::table("users"), SchemaObjectKey::table("users"));
        assert_ne!(SchemaObjectKey::table("users"), SchemaObjectKey::index("users"));
    }

    #[test]
    fn test_generate_covers_tables_and_indexes() {
        let fingerprints = FingerprintGenerator::new().generate(&model());

        assert_eq!(fingerprints.len(), 2);
        assert!(fingerprints.contains_key(&SchemaObjectKey::table("users")));
        assert!(fingerprints.contains_key(&SchemaObjectKey::index("ix_users_name")));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = FingerprintGenerator::new();
        assert_eq!(generator.generate(&model()), generator.generate(&model()));
    }

    #[test]
    fn test_index_change_leaves_table_fingerprint_untouched() {
        let generator = FingerprintGenerator::new();
        let before = generator.generate(&model());

        let mut changed = model();
        let set = changed.entity_sets.get_mut("User").unwrap();
        set.table.indexes[0].unique = true;
        let after = generator.generate(&changed);

        let table_key = SchemaObjectKey::table("users");
        let index_key = SchemaObjectKey::index("ix_users_name");
        assert_eq!(before[&table_key], after[&table_key]);
        assert_ne!(before[&index_key], after[&index_key]);
    }

    #[test]
    fn test_column_change_alters_table_fingerprint() {
        let generator = FingerprintGenerator::new();
        let before = generator.generate(&model());

        let mut changed = model();
        let set = changed.entity_sets.get_mut("User").unwrap();
        set.table
            .add_column(ColumnDescriptor::new("email", "TEXT").nullable());
        let after = generator.generate(&changed);

        let table_key = SchemaObjectKey::table("users");
        assert_ne!(before[&table_key], after[&table_key]);
    }
}
