//! Descriptor types for the relational model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A read-only description of a relational schema.
///
/// The model holds the entity sets declared by the schema owner and the join
/// tables the model source resolved for many-to-many associations. Insertion
/// order is preserved and determines the order of all generated DDL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationalModel {
    /// Entity sets, keyed by set name, in declaration order.
    pub entity_sets: IndexMap<SmolStr, EntitySet>,
    /// Resolved many-to-many join tables, keyed by table name.
    pub association_tables: IndexMap<SmolStr, TableDescriptor>,
}

impl RelationalModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity set.
    pub fn add_entity_set(&mut self, set: EntitySet) {
        self.entity_sets.insert(set.name.clone(), set);
    }

    /// Add a resolved association join table.
    pub fn add_association_table(&mut self, table: TableDescriptor) {
        self.association_tables.insert(table.name.clone(), table);
    }

    /// All concrete tables of the schema, in declaration order.
    ///
    /// Entity-set tables come first. An entity set that is a pure association
    /// is skipped when its join table already appears in the association
    /// container, so the table is emitted exactly once. Association tables
    /// follow.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.entity_sets
            .values()
            .filter(|set| {
                !(set.pure_association
                    && self.association_tables.contains_key(set.table.name.as_str()))
            })
            .map(|set| &set.table)
            .chain(self.association_tables.values())
    }

    /// All indexes of the schema, in table declaration order.
    pub fn indexes(&self) -> impl Iterator<Item = &IndexDescriptor> {
        self.tables().flat_map(|table| table.indexes.iter())
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables().find(|table| table.name == name)
    }

    /// Look up an index by name.
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes().find(|index| index.name == name)
    }
}

/// One entity set of the model: a named set backed by a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Entity set name.
    pub name: SmolStr,
    /// The backing table.
    pub table: TableDescriptor,
    /// Whether the underlying type is a pure many-to-many association.
    pub pure_association: bool,
}

impl EntitySet {
    /// Create a new entity set.
    pub fn new(name: impl Into<SmolStr>, table: TableDescriptor) -> Self {
        Self {
            name: name.into(),
            table,
            pure_association: false,
        }
    }

    /// Mark this entity set as a pure association.
    pub fn pure_association(mut self) -> Self {
        self.pure_association = true;
        self
    }
}

/// A table: name, ordered columns, primary key, optional collation, and the
/// indexes declared on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: SmolStr,
    /// Columns, keyed by column name, in declaration order.
    pub columns: IndexMap<SmolStr, ColumnDescriptor>,
    /// Primary key column names.
    pub primary_key: Vec<SmolStr>,
    /// Collation applied to the table's character columns, if any.
    pub collation: Option<SmolStr>,
    /// Indexes declared on this table.
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    /// Create a new table descriptor.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            primary_key: Vec::new(),
            collation: None,
            indexes: Vec::new(),
        }
    }

    /// Add a column.
    pub fn add_column(&mut self, column: ColumnDescriptor) {
        self.columns.insert(column.name.clone(), column);
    }

    /// Add an index.
    pub fn add_index(&mut self, index: IndexDescriptor) {
        self.indexes.push(index);
    }

    /// Set the primary key column list.
    pub fn set_primary_key<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
    }

    /// Set the table collation.
    pub fn with_collation(mut self, collation: impl Into<SmolStr>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: SmolStr,
    /// SQL type text, e.g. `INTEGER` or `VARCHAR(120)`.
    pub sql_type: SmolStr,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value expression, if any.
    pub default: Option<SmolStr>,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Whether the column carries a UNIQUE constraint.
    pub unique: bool,
}

impl ColumnDescriptor {
    /// Create a new column descriptor. Columns are NOT NULL unless marked
    /// nullable.
    pub fn new(name: impl Into<SmolStr>, sql_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
            default: None,
            auto_increment: false,
            unique: false,
        }
    }

    /// Mark the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set a default value expression.
    pub fn default_value(mut self, expr: impl Into<SmolStr>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Mark the column auto-incrementing.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark the column unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: SmolStr,
    /// Owning table name.
    pub table: SmolStr,
    /// Indexed column names, in order.
    pub columns: Vec<SmolStr>,
    /// Whether this is a unique index.
    pub unique: bool,
}

impl IndexDescriptor {
    /// Create a new index descriptor.
    pub fn new<I, S>(name: impl Into<SmolStr>, table: impl Into<SmolStr>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Mark this index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_table() -> TableDescriptor {
        let mut table = TableDescriptor::new("users");
        table.add_column(ColumnDescriptor::new("id", "INTEGER").auto_increment());
        table.add_column(ColumnDescriptor::new("name", "TEXT"));
        table.set_primary_key(["id"]);
        table.add_index(IndexDescriptor::new("ix_users_name", "users", ["name"]));
        table
    }

    #[test]
    fn test_tables_in_declaration_order() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));
        model.add_entity_set(EntitySet::new("Post", TableDescriptor::new("posts")));

        let names: Vec<_> = model.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "posts"]);
    }

    #[test]
    fn test_pure_association_covered_by_container_is_skipped() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));
        model.add_entity_set(
            EntitySet::new("UserRole", TableDescriptor::new("user_roles")).pure_association(),
        );
        model.add_association_table(TableDescriptor::new("user_roles"));

        let names: Vec<_> = model.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "user_roles"]);
    }

    #[test]
    fn test_pure_association_without_join_table_is_kept() {
        let mut model = RelationalModel::new();
        model.add_entity_set(
            EntitySet::new("UserRole", TableDescriptor::new("user_roles")).pure_association(),
        );

        assert_eq!(model.tables().count(), 1);
    }

    #[test]
    fn test_index_lookup() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));

        let index = model.index("ix_users_name").unwrap();
        assert_eq!(index.table, "users");
        assert!(model.index("missing").is_none());
    }

    #[test]
    fn test_column_defaults() {
        let column = ColumnDescriptor::new("age", "INTEGER");
        assert!(!column.nullable);
        assert!(!column.unique);
        assert!(column.default.is_none());

        let column = column.nullable().default_value("0");
        assert!(column.nullable);
        assert_eq!(column.default.as_deref(), Some("0"));
    }
}
