//! # stratum-schema
//!
//! Relational model descriptors for the Stratum migration engine.
//!
//! This crate defines the read-only description of a relational schema that
//! the migration engine consumes: tables with their columns, primary keys and
//! collation, and the indexes that belong to them. The model is produced by
//! an external metadata layer (an ORM, an introspector, a schema file parser)
//! through the [`ModelSource`] interface and is immutable for the duration of
//! one migration operation.
//!
//! Declaration order is significant everywhere: entity sets, columns and
//! indexes are kept in insertion-ordered maps, and every consumer that walks
//! the model observes the same deterministic order. The migration engine's
//! change detection hashes generated DDL text, so any non-determinism here
//! would surface as spurious schema changes.
//!
//! ## Example
//!
//! ```rust
//! use stratum_schema::{
//!     ColumnDescriptor, EntitySet, IndexDescriptor, RelationalModel, TableDescriptor,
//! };
//!
//! let mut table = TableDescriptor::new("users");
//! table.add_column(ColumnDescriptor::new("id", "INTEGER").auto_increment());
//! table.add_column(ColumnDescriptor::new("name", "TEXT"));
//! table.set_primary_key(["id"]);
//! table.add_index(IndexDescriptor::new("ix_users_name", "users", ["name"]));
//!
//! let mut model = RelationalModel::new();
//! model.add_entity_set(EntitySet::new("User", table));
//!
//! assert_eq!(model.tables().count(), 1);
//! assert_eq!(model.indexes().count(), 1);
//! ```

pub mod error;
pub mod model;
pub mod source;

// Re-exports
pub use error::ModelError;
pub use model::{
    ColumnDescriptor, EntitySet, IndexDescriptor, RelationalModel, TableDescriptor,
};
pub use source::ModelSource;
