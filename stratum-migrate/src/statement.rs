//! The DDL statement model.
//!
//! Statements are plain values that render to literal SQL text. Leaf
//! statements substitute already-escaped identifiers and precomputed SQL
//! fragments into fixed templates; they perform no escaping of their own.
//! [`StatementBatch`] is the ordered collection: it renders its children in
//! insertion order, joined with [`STATEMENT_SEPARATOR`]. Rendering is pure
//! and never fails for a well-formed statement.

/// Separator between statements in a rendered batch.
pub const STATEMENT_SEPARATOR: &str = "\r\n";

/// A single DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    /// `CREATE TABLE ...`
    CreateTable(CreateTableStatement),
    /// `CREATE INDEX ...`
    CreateIndex(CreateIndexStatement),
    /// `DROP TABLE ...`
    DropTable(DropTableStatement),
    /// `DROP INDEX ...`
    DropIndex(DropIndexStatement),
}

impl DdlStatement {
    /// Render the statement to SQL text.
    pub fn render(&self) -> String {
        match self {
            Self::CreateTable(stmt) => stmt.render(),
            Self::CreateIndex(stmt) => stmt.render(),
            Self::DropTable(stmt) => stmt.render(),
            Self::DropIndex(stmt) => stmt.render(),
        }
    }
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    /// Escaped table name.
    pub table: String,
    /// Column and constraint definitions, already rendered and joined.
    pub body: String,
}

impl CreateTableStatement {
    /// Create a new statement from an escaped name and a rendered body.
    pub fn new(table: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            body: body.into(),
        }
    }

    /// Render the statement to SQL text.
    pub fn render(&self) -> String {
        format!("CREATE TABLE {} (\n    {}\n);", self.table, self.body)
    }
}

/// A `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexStatement {
    /// Escaped index name.
    pub index: String,
    /// Escaped table name.
    pub table: String,
    /// Escaped column list, already joined.
    pub columns: String,
    /// Whether to create a unique index.
    pub unique: bool,
}

impl CreateIndexStatement {
    /// Create a new statement from escaped names and a rendered column list.
    pub fn new(
        index: impl Into<String>,
        table: impl Into<String>,
        columns: impl Into<String>,
        unique: bool,
    ) -> Self {
        Self {
            index: index.into(),
            table: table.into(),
            columns: columns.into(),
            unique,
        }
    }

    /// Render the statement to SQL text.
    pub fn render(&self) -> String {
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({});",
            unique, self.index, self.table, self.columns
        )
    }
}

/// A `DROP TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableStatement {
    /// Escaped table name.
    pub table: String,
}

impl DropTableStatement {
    /// Create a new statement from an escaped name.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Render the statement to SQL text.
    pub fn render(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE;", self.table)
    }
}

/// A `DROP INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexStatement {
    /// Escaped index name.
    pub index: String,
}

impl DropIndexStatement {
    /// Create a new statement from an escaped name.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
        }
    }

    /// Render the statement to SQL text.
    pub fn render(&self) -> String {
        format!("DROP INDEX IF EXISTS {};", self.index)
    }
}

/// An ordered collection of DDL statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    statements: Vec<DdlStatement>,
}

impl StatementBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement.
    pub fn push(&mut self, statement: DdlStatement) {
        self.statements.push(statement);
    }

    /// Append every statement of another batch, preserving order.
    pub fn extend(&mut self, other: StatementBatch) {
        self.statements.extend(other.statements);
    }

    /// Check if the batch contains no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of statements in the batch.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Render the batch: child renderings joined with the separator. An
    /// empty batch renders as the empty string.
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .map(DdlStatement::render)
            .collect::<Vec<_>>()
            .join(STATEMENT_SEPARATOR)
    }
}
