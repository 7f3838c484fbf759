//! Statement builders for the PostgreSQL dialect.
//!
//! Builders are pure functions from a model fragment to a statement tree.
//! Identifier escaping happens here, on every path (create and drop alike);
//! the statement model receives only already-escaped names.

use std::collections::BTreeSet;

use stratum_schema::{ColumnDescriptor, IndexDescriptor, RelationalModel, TableDescriptor};

use crate::statement::{
    CreateIndexStatement, CreateTableStatement, DdlStatement, DropIndexStatement,
    DropTableStatement, StatementBatch,
};

/// Maximum identifier length accepted by PostgreSQL (NAMEDATALEN - 1 bytes).
const MAX_IDENT_BYTES: usize = 63;

/// Escape an identifier for embedding in DDL text.
///
/// Truncates to the dialect's identifier limit on a character boundary,
/// doubles embedded quotes, and wraps the result in double quotes.
pub fn quote_ident(raw: &str) -> String {
    let mut ident = raw;
    if ident.len() > MAX_IDENT_BYTES {
        let mut end = MAX_IDENT_BYTES;
        while !ident.is_char_boundary(end) {
            end -= 1;
        }
        ident = &ident[..end];
    }
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Check if a SQL type is a character type that accepts a COLLATE clause.
fn is_character_type(sql_type: &str) -> bool {
    sql_type.starts_with("TEXT") || sql_type.starts_with("VARCHAR") || sql_type.starts_with("CHAR")
}

/// DDL statement builder for PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDdlBuilder;

impl PostgresDdlBuilder {
    /// Build the CREATE TABLE statement for one table.
    pub fn create_table(&self, table: &TableDescriptor) -> CreateTableStatement {
        let mut lines: Vec<String> = table
            .columns
            .values()
            .map(|column| self.column_definition(table, column))
            .collect();

        if !table.primary_key.is_empty() {
            let pk_cols: Vec<String> = table
                .primary_key
                .iter()
                .map(|c| quote_ident(c))
                .collect();
            lines.push(format!("PRIMARY KEY ({})", pk_cols.join(", ")));
        }

        CreateTableStatement::new(quote_ident(&table.name), lines.join(",\n    "))
    }

    /// Build one column definition.
    fn column_definition(&self, table: &TableDescriptor, column: &ColumnDescriptor) -> String {
        let is_primary_key = table.primary_key.contains(&column.name);

        let mut parts = vec![quote_ident(&column.name), column.sql_type.to_string()];

        if column.auto_increment {
            // Replace type with SERIAL variants
            if column.sql_type == "INTEGER" {
                parts[1] = "SERIAL".to_string();
            } else if column.sql_type == "BIGINT" {
                parts[1] = "BIGSERIAL".to_string();
            }
        }

        // PostgreSQL has no table-wide collation clause; the table's declared
        // collation lands on each character column.
        if let Some(collation) = &table.collation
            && is_character_type(&column.sql_type)
        {
            parts.push(format!("COLLATE {}", quote_ident(collation)));
        }

        if !column.nullable && !is_primary_key {
            parts.push("NOT NULL".to_string());
        }

        if column.unique && !is_primary_key {
            parts.push("UNIQUE".to_string());
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default));
        }

        parts.join(" ")
    }

    /// Build the CREATE INDEX statement for one index.
    pub fn create_index(&self, index: &IndexDescriptor) -> CreateIndexStatement {
        let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();
        CreateIndexStatement::new(
            quote_ident(&index.name),
            quote_ident(&index.table),
            columns.join(", "),
            index.unique,
        )
    }

    /// Build the create-index statements for one table, in declaration order.
    pub fn table_indexes(&self, table: &TableDescriptor) -> StatementBatch {
        let mut batch = StatementBatch::new();
        for index in &table.indexes {
            batch.push(DdlStatement::CreateIndex(self.create_index(index)));
        }
        batch
    }

    /// Build a DROP TABLE statement. The name is escaped here.
    pub fn drop_table(&self, name: &str) -> DropTableStatement {
        DropTableStatement::new(quote_ident(name))
    }

    /// Build a DROP INDEX statement. The name is escaped here.
    pub fn drop_index(&self, name: &str) -> DropIndexStatement {
        DropIndexStatement::new(quote_ident(name))
    }

    /// Build the full schema: for each table of the model, one create-table
    /// statement followed by that table's create-index statements. Output
    /// order is the model's declaration order.
    pub fn database(&self, model: &RelationalModel) -> StatementBatch {
        let mut batch = StatementBatch::new();
        for table in model.tables() {
            batch.push(DdlStatement::CreateTable(self.create_table(table)));
            batch.extend(self.table_indexes(table));
        }
        batch
    }

    /// Build the schema restricted to the given table names. Tables absent
    /// from the allow-set are skipped, indexes included.
    pub fn database_subset(
        &self,
        model: &RelationalModel,
        tables: &BTreeSet<String>,
    ) -> StatementBatch {
        let mut batch = StatementBatch::new();
        for table in model.tables() {
            if !tables.contains(table.name.as_str()) {
                continue;
            }
            batch.push(DdlStatement::CreateTable(self.create_table(table)));
            batch.extend(self.table_indexes(table));
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stratum_schema::EntitySet;

    use super::*;

    fn users_table() -> TableDescriptor {
        let mut table = TableDescriptor::new("users");
        table.add_column(ColumnDescriptor::new("id", "INTEGER").auto_increment());
        table.add_column(ColumnDescriptor::new("name", "TEXT"));
        table.add_column(ColumnDescriptor::new("email", "TEXT").nullable().unique());
        table.set_primary_key(["id"]);
        table.add_index(IndexDescriptor::new("ix_users_name", "users", ["name"]));
        table
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("us\"ers"), "\"us\"\"ers\"");
    }

    #[test]
    fn test_quote_ident_truncates_to_dialect_limit() {
        let long = "a".repeat(80);
        let quoted = quote_ident(&long);
        assert_eq!(quoted.len(), 63 + 2);
    }

    #[test]
    fn test_create_table_render() {
        let builder = PostgresDdlBuilder;
        let sql = builder.create_table(&users_table()).render();
        assert_eq!(
            sql,
            "CREATE TABLE \"users\" (\n    \
                 \"id\" SERIAL,\n    \
                 \"name\" TEXT NOT NULL,\n    \
                 \"email\" TEXT UNIQUE,\n    \
                 PRIMARY KEY (\"id\")\n);"
        );
    }

    #[test]
    fn test_create_table_with_collation() {
        let mut table = TableDescriptor::new("tags").with_collation("en_US");
        table.add_column(ColumnDescriptor::new("label", "TEXT"));
        table.add_column(ColumnDescriptor::new("weight", "INTEGER"));

        let sql = PostgresDdlBuilder.create_table(&table).render();
        assert!(sql.contains("\"label\" TEXT COLLATE \"en_US\" NOT NULL"));
        assert!(sql.contains("\"weight\" INTEGER NOT NULL"));
        assert!(!sql.contains("\"weight\" INTEGER COLLATE"));
    }

    #[test]
    fn test_create_table_default_value() {
        let mut table = TableDescriptor::new("posts");
        table.add_column(ColumnDescriptor::new("views", "BIGINT").default_value("0"));

        let sql = PostgresDdlBuilder.create_table(&table).render();
        assert!(sql.contains("\"views\" BIGINT NOT NULL DEFAULT 0"));
    }

    #[test]
    fn test_create_index_render() {
        let index = IndexDescriptor::new("ix_users_name", "users", ["name"]);
        let sql = PostgresDdlBuilder.create_index(&index).render();
        assert_eq!(sql, "CREATE INDEX \"ix_users_name\" ON \"users\" (\"name\");");
    }

    #[test]
    fn test_drop_statements_escape_both_names() {
        let builder = PostgresDdlBuilder;
        assert_eq!(
            builder.drop_table("users").render(),
            "DROP TABLE IF EXISTS \"users\" CASCADE;"
        );
        assert_eq!(
            builder.drop_index("ix_users_name").render(),
            "DROP INDEX IF EXISTS \"ix_users_name\";"
        );
    }

    #[test]
    fn test_database_orders_tables_then_their_indexes() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));
        let mut posts = TableDescriptor::new("posts");
        posts.add_column(ColumnDescriptor::new("id", "INTEGER"));
        model.add_entity_set(EntitySet::new("Post", posts));

        let batch = PostgresDdlBuilder.database(&model);
        let sql = batch.render();

        let create_users = sql.find("CREATE TABLE \"users\"").unwrap();
        let create_ix = sql.find("CREATE INDEX \"ix_users_name\"").unwrap();
        let create_posts = sql.find("CREATE TABLE \"posts\"").unwrap();
        assert!(create_users < create_ix);
        assert!(create_ix < create_posts);
    }

    #[test]
    fn test_database_skips_covered_association_sets() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));
        let mut link = TableDescriptor::new("user_roles");
        link.add_column(ColumnDescriptor::new("user_id", "INTEGER"));
        model.add_entity_set(EntitySet::new("UserRole", link.clone()).pure_association());
        model.add_association_table(link);

        let batch = PostgresDdlBuilder.database(&model);
        let sql = batch.render();
        assert_eq!(sql.matches("CREATE TABLE \"user_roles\"").count(), 1);
    }

    #[test]
    fn test_database_subset_filters_by_table_name() {
        let mut model = RelationalModel::new();
        model.add_entity_set(EntitySet::new("User", users_table()));
        let mut posts = TableDescriptor::new("posts");
        posts.add_column(ColumnDescriptor::new("id", "INTEGER"));
        model.add_entity_set(EntitySet::new("Post", posts));

        let allow: BTreeSet<String> = ["posts".to_string()].into();
        let batch = PostgresDdlBuilder.database_subset(&model, &allow);
        let sql = batch.render();

        assert!(sql.contains("CREATE TABLE \"posts\""));
        assert!(!sql.contains("CREATE TABLE \"users\""));
        assert!(!sql.contains("ix_users_name"));
    }
}
