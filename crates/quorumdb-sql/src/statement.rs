//! Parsed statement variants.
//!
//! Every statement the layer executes is one of a closed set of variants; the
//! orchestrator pattern-matches exhaustively instead of inspecting query text
//! at runtime. Each instance carries the original query text for logging and
//! for the prepared-statement registry.

use quorumdb_commons::{KeyspaceName, TableName};

/// A parsed statement plus its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CqlStatement {
    sql_text: String,
    kind: CqlStatementKind,
}

impl CqlStatement {
    pub fn new(sql_text: String, kind: CqlStatementKind) -> Self {
        Self { sql_text, kind }
    }

    /// The original query text.
    pub fn as_str(&self) -> &str {
        &self.sql_text
    }

    pub fn kind(&self) -> &CqlStatementKind {
        &self.kind
    }

    pub fn into_parts(self) -> (String, CqlStatementKind) {
        (self.sql_text, self.kind)
    }

    /// True for statements whose effect is a schema mutation.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self.kind,
            CqlStatementKind::CreateKeyspace(_)
                | CqlStatementKind::DropKeyspace(_)
                | CqlStatementKind::CreateTable(_)
                | CqlStatementKind::DropTable(_)
        )
    }

    /// True for statements that modify data or schema.
    pub fn is_write_operation(&self) -> bool {
        !matches!(
            self.kind,
            CqlStatementKind::Select(_) | CqlStatementKind::UseKeyspace(_)
        )
    }

    /// Human-readable statement name.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            CqlStatementKind::Select(_) => "SELECT",
            CqlStatementKind::Insert(_) => "INSERT",
            CqlStatementKind::Update(_) => "UPDATE",
            CqlStatementKind::Delete(_) => "DELETE",
            CqlStatementKind::CreateKeyspace(_) => "CREATE KEYSPACE",
            CqlStatementKind::DropKeyspace(_) => "DROP KEYSPACE",
            CqlStatementKind::CreateTable(_) => "CREATE TABLE",
            CqlStatementKind::DropTable(_) => "DROP TABLE",
            CqlStatementKind::UseKeyspace(_) => "USE",
        }
    }
}

/// The closed set of statement variants this layer executes.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlStatementKind {
    /// SELECT ... FROM ... [WHERE pk = term]
    Select(SelectStatement),
    /// INSERT INTO ... (cols) VALUES (terms)
    Insert(InsertStatement),
    /// UPDATE ... SET ... WHERE pk = term
    Update(UpdateStatement),
    /// DELETE FROM ... WHERE pk = term
    Delete(DeleteStatement),
    /// CREATE KEYSPACE <name>
    CreateKeyspace(CreateKeyspaceStatement),
    /// DROP KEYSPACE <name>
    DropKeyspace(DropKeyspaceStatement),
    /// CREATE TABLE [ks.]<name> (col type [PRIMARY KEY], ...)
    CreateTable(CreateTableStatement),
    /// DROP TABLE [ks.]<name>
    DropTable(DropTableStatement),
    /// USE <name>
    UseKeyspace(UseKeyspaceStatement),
}

/// A table reference as written: keyspace-qualified or bare.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub keyspace: Option<KeyspaceName>,
    pub table: TableName,
}

/// A value term: a literal or a `?` bind marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Literal(Literal),
    BindMarker,
}

/// An untyped literal as written in the query text.
///
/// Typing happens at compile time against the referenced column.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Single-quoted string.
    String(String),
    /// Numeric token, sign included, not yet sized.
    Number(String),
    /// `true` / `false`.
    Boolean(bool),
    /// `0x...` hex token.
    Hex(Vec<u8>),
}

/// Projection of a SELECT: `*` or an explicit column list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    All,
    Named(Vec<String>),
}

/// A single-column equality restriction (`WHERE col = term`).
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub column: String,
    pub value: Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: TableRef,
    pub columns: SelectColumns,
    pub restriction: Option<Restriction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub values: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub restriction: Restriction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub restriction: Restriction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateKeyspaceStatement {
    pub keyspace: KeyspaceName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropKeyspaceStatement {
    pub keyspace: KeyspaceName,
}

/// One column definition as written in a CREATE TABLE.
///
/// The type is kept as its raw spelling; resolution against the known type
/// names happens at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnClause {
    pub name: String,
    pub type_name: String,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table: TableRef,
    pub columns: Vec<ColumnClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub table: TableRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseKeyspaceStatement {
    pub keyspace: KeyspaceName,
}
