//! Statement compilation: keyspace resolution, schema validation, literal
//! coercion and bind-marker numbering.
//!
//! Compilation is stateless and side-effect-free. DDL statements compile to
//! variants whose schema mutation is carried out later by the orchestrator
//! against the schema registry; everything the compiler does is read-only
//! against a [`SchemaLookup`].

use crate::statement::*;
use quorumdb_commons::{
    ColumnDefinition, ColumnSpec, CqlType, CqlValue, KeyspaceName, QualifiedTable, QueryError,
    QueryResult, TableSchema,
};
use std::sync::Arc;

/// Read-only schema access the compiler needs.
///
/// Implemented by the schema registry in `quorumdb-core`; defined here so the
/// compiler does not depend on the registry implementation.
pub trait SchemaLookup: Send + Sync {
    fn keyspace_exists(&self, keyspace: &KeyspaceName) -> bool;
    fn table_schema(&self, table: &QualifiedTable) -> Option<Arc<TableSchema>>;
}

/// A term with its literal coerced to the column's declared type and bind
/// markers numbered in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTerm {
    Value(CqlValue),
    BindMarker(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRestriction {
    /// Always the table's primary-key column.
    pub column: String,
    pub value: ResolvedTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSelect {
    pub table: QualifiedTable,
    pub schema: Arc<TableSchema>,
    pub projection: Projection,
    pub restriction: Option<CompiledRestriction>,
}

/// Validated projection of a compiled SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledInsert {
    pub table: QualifiedTable,
    pub schema: Arc<TableSchema>,
    /// Column names paired positionally with `values`.
    pub columns: Vec<String>,
    pub values: Vec<ResolvedTerm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUpdate {
    pub table: QualifiedTable,
    pub schema: Arc<TableSchema>,
    pub assignments: Vec<(String, ResolvedTerm)>,
    pub restriction: CompiledRestriction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDelete {
    pub table: QualifiedTable,
    pub schema: Arc<TableSchema>,
    pub restriction: CompiledRestriction,
}

/// Compiled statement variants with every table reference fully qualified.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledKind {
    Select(CompiledSelect),
    Insert(CompiledInsert),
    Update(CompiledUpdate),
    Delete(CompiledDelete),
    CreateKeyspace(KeyspaceName),
    DropKeyspace(KeyspaceName),
    CreateTable(TableSchema),
    DropTable(QualifiedTable),
    UseKeyspace(KeyspaceName),
}

/// The immutable output of compilation.
///
/// A compiled statement captures the keyspace it was resolved against, so a
/// prepared statement keeps executing against the keyspace that was current
/// when it was prepared, regardless of later `USE` calls on any session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    source: String,
    kind: CompiledKind,
    bind_types: Vec<CqlType>,
    result_metadata: Vec<ColumnSpec>,
}

impl CompiledStatement {
    /// The original query text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> &CompiledKind {
        &self.kind
    }

    /// Declared types of the bind variables, in marker order.
    pub fn bind_types(&self) -> &[CqlType] {
        &self.bind_types
    }

    /// Metadata of the result columns this statement produces.
    pub fn result_metadata(&self) -> &[ColumnSpec] {
        &self.result_metadata
    }

    /// The table this statement reads or writes, if any.
    pub fn table(&self) -> Option<&QualifiedTable> {
        match &self.kind {
            CompiledKind::Select(s) => Some(&s.table),
            CompiledKind::Insert(i) => Some(&i.table),
            CompiledKind::Update(u) => Some(&u.table),
            CompiledKind::Delete(d) => Some(&d.table),
            CompiledKind::CreateTable(schema) => Some(&schema.table),
            CompiledKind::DropTable(table) => Some(table),
            CompiledKind::CreateKeyspace(_)
            | CompiledKind::DropKeyspace(_)
            | CompiledKind::UseKeyspace(_) => None,
        }
    }

    /// The keyspace this statement resolves against, if any.
    pub fn keyspace(&self) -> Option<&KeyspaceName> {
        match &self.kind {
            CompiledKind::CreateKeyspace(ks)
            | CompiledKind::DropKeyspace(ks)
            | CompiledKind::UseKeyspace(ks) => Some(ks),
            _ => self.table().map(|t| &t.keyspace),
        }
    }
}

/// Compiles a parsed statement against the given context keyspace.
///
/// Unqualified table references resolve against `context_keyspace`; explicit
/// `keyspace.table` references override it. Fails with
/// [`QueryError::InvalidRequest`] for unknown keyspaces, tables or columns,
/// and when an unqualified reference is made with no keyspace set.
pub fn compile(
    statement: CqlStatement,
    context_keyspace: Option<&KeyspaceName>,
    schema: &dyn SchemaLookup,
) -> QueryResult<CompiledStatement> {
    let mut ctx = CompileContext {
        schema,
        context_keyspace,
        bind_types: Vec::new(),
    };

    let (source, parsed) = statement.into_parts();
    let kind = match parsed {
        CqlStatementKind::Select(select) => ctx.compile_select(select)?,
        CqlStatementKind::Insert(insert) => ctx.compile_insert(insert)?,
        CqlStatementKind::Update(update) => ctx.compile_update(update)?,
        CqlStatementKind::Delete(delete) => ctx.compile_delete(delete)?,
        CqlStatementKind::CreateKeyspace(create) => {
            CompiledKind::CreateKeyspace(create.keyspace)
        }
        CqlStatementKind::DropKeyspace(drop) => {
            ctx.require_keyspace(&drop.keyspace)?;
            CompiledKind::DropKeyspace(drop.keyspace)
        }
        CqlStatementKind::CreateTable(create) => ctx.compile_create_table(create)?,
        CqlStatementKind::DropTable(drop) => {
            let (table, _) = ctx.resolve_table(&drop.table)?;
            CompiledKind::DropTable(table)
        }
        CqlStatementKind::UseKeyspace(use_ks) => {
            ctx.require_keyspace(&use_ks.keyspace)?;
            CompiledKind::UseKeyspace(use_ks.keyspace)
        }
    };

    let result_metadata = match &kind {
        CompiledKind::Select(select) => select_metadata(select),
        _ => Vec::new(),
    };

    log::debug!(
        "compiled {} with {} bind variable(s)",
        source,
        ctx.bind_types.len()
    );

    Ok(CompiledStatement {
        source,
        kind,
        bind_types: ctx.bind_types,
        result_metadata,
    })
}

fn select_metadata(select: &CompiledSelect) -> Vec<ColumnSpec> {
    // Metadata order follows the projection as written, or schema order for
    // `*`. Named columns were validated during compilation.
    match &select.projection {
        Projection::All => select.schema.all_column_specs(),
        Projection::Named(names) => names
            .iter()
            .filter_map(|name| select.schema.column(name))
            .map(|column| ColumnSpec::new(column.name.clone(), column.data_type))
            .collect(),
    }
}

struct CompileContext<'a> {
    schema: &'a dyn SchemaLookup,
    context_keyspace: Option<&'a KeyspaceName>,
    bind_types: Vec<CqlType>,
}

impl<'a> CompileContext<'a> {
    fn require_keyspace(&self, keyspace: &KeyspaceName) -> QueryResult<()> {
        if self.schema.keyspace_exists(keyspace) {
            Ok(())
        } else {
            Err(QueryError::invalid_request(format!(
                "unknown keyspace '{}'",
                keyspace
            )))
        }
    }

    /// Resolves a table reference to a qualified table plus its schema.
    fn resolve_table(
        &self,
        table_ref: &TableRef,
    ) -> QueryResult<(QualifiedTable, Arc<TableSchema>)> {
        let keyspace = match (&table_ref.keyspace, self.context_keyspace) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(context)) => context.clone(),
            (None, None) => {
                return Err(QueryError::invalid_request(
                    "no keyspace has been specified; use USE or qualify the table name",
                ))
            }
        };
        let table = QualifiedTable::new(keyspace, table_ref.table.clone());
        let schema = self.schema.table_schema(&table).ok_or_else(|| {
            QueryError::invalid_request(format!("unknown table '{}'", table))
        })?;
        Ok((table, schema))
    }

    /// Coerces a term against the declared type of the column it targets.
    fn resolve_term(&mut self, term: Term, column: &ColumnDefinition) -> QueryResult<ResolvedTerm> {
        match term {
            Term::BindMarker => {
                self.bind_types.push(column.data_type);
                Ok(ResolvedTerm::BindMarker(self.bind_types.len() - 1))
            }
            Term::Literal(literal) => {
                let value = coerce_literal(&literal, column)?;
                Ok(ResolvedTerm::Value(value))
            }
        }
    }

    /// Compiles a WHERE restriction, enforcing that it targets the primary
    /// key.
    fn resolve_restriction(
        &mut self,
        restriction: Restriction,
        schema: &TableSchema,
    ) -> QueryResult<CompiledRestriction> {
        let column = schema.column(&restriction.column).ok_or_else(|| {
            QueryError::invalid_request(format!(
                "unknown column '{}' in table '{}'",
                restriction.column, schema.table
            ))
        })?;
        if !column.primary_key {
            return Err(QueryError::invalid_request(format!(
                "only primary key restrictions are supported, '{}' is not the primary key",
                restriction.column
            )));
        }
        let column = column.clone();
        let value = self.resolve_term(restriction.value, &column)?;
        Ok(CompiledRestriction {
            column: column.name,
            value,
        })
    }

    fn compile_select(&mut self, select: SelectStatement) -> QueryResult<CompiledKind> {
        let (table, schema) = self.resolve_table(&select.table)?;

        let projection = match select.columns {
            SelectColumns::All => Projection::All,
            SelectColumns::Named(names) => {
                for name in &names {
                    if schema.column(name).is_none() {
                        return Err(QueryError::invalid_request(format!(
                            "unknown column '{}' in table '{}'",
                            name, table
                        )));
                    }
                }
                Projection::Named(names)
            }
        };

        let restriction = match select.restriction {
            Some(r) => Some(self.resolve_restriction(r, &schema)?),
            None => None,
        };

        Ok(CompiledKind::Select(CompiledSelect {
            table,
            schema,
            projection,
            restriction,
        }))
    }

    fn compile_insert(&mut self, insert: InsertStatement) -> QueryResult<CompiledKind> {
        let (table, schema) = self.resolve_table(&insert.table)?;

        if insert.columns.len() != insert.values.len() {
            return Err(QueryError::invalid_request(format!(
                "unmatched column and value counts: {} columns, {} values",
                insert.columns.len(),
                insert.values.len()
            )));
        }

        let pk = schema.primary_key_column().name.clone();
        if !insert.columns.contains(&pk) {
            return Err(QueryError::invalid_request(format!(
                "INSERT must set the primary key column '{}'",
                pk
            )));
        }

        let mut seen: Vec<&str> = Vec::new();
        let mut values = Vec::with_capacity(insert.values.len());
        for (name, term) in insert.columns.iter().zip(insert.values) {
            if seen.contains(&name.as_str()) {
                return Err(QueryError::invalid_request(format!(
                    "duplicate column '{}' in INSERT",
                    name
                )));
            }
            let column = schema.column(name).ok_or_else(|| {
                QueryError::invalid_request(format!(
                    "unknown column '{}' in table '{}'",
                    name, table
                ))
            })?;
            let column = column.clone();
            values.push(self.resolve_term(term, &column)?);
            seen.push(name.as_str());
        }

        Ok(CompiledKind::Insert(CompiledInsert {
            table,
            schema,
            columns: insert.columns,
            values,
        }))
    }

    fn compile_update(&mut self, update: UpdateStatement) -> QueryResult<CompiledKind> {
        let (table, schema) = self.resolve_table(&update.table)?;

        let mut assignments = Vec::with_capacity(update.assignments.len());
        for assignment in update.assignments {
            let column = schema.column(&assignment.column).ok_or_else(|| {
                QueryError::invalid_request(format!(
                    "unknown column '{}' in table '{}'",
                    assignment.column, table
                ))
            })?;
            if column.primary_key {
                return Err(QueryError::invalid_request(format!(
                    "cannot update primary key column '{}'",
                    column.name
                )));
            }
            let column = column.clone();
            let value = self.resolve_term(assignment.value, &column)?;
            assignments.push((column.name, value));
        }

        let restriction = self.resolve_restriction(update.restriction, &schema)?;
        Ok(CompiledKind::Update(CompiledUpdate {
            table,
            schema,
            assignments,
            restriction,
        }))
    }

    fn compile_delete(&mut self, delete: DeleteStatement) -> QueryResult<CompiledKind> {
        let (table, schema) = self.resolve_table(&delete.table)?;
        let restriction = self.resolve_restriction(delete.restriction, &schema)?;
        Ok(CompiledKind::Delete(CompiledDelete {
            table,
            schema,
            restriction,
        }))
    }

    fn compile_create_table(&mut self, create: CreateTableStatement) -> QueryResult<CompiledKind> {
        let keyspace = match (&create.table.keyspace, self.context_keyspace) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(context)) => context.clone(),
            (None, None) => {
                return Err(QueryError::invalid_request(
                    "no keyspace has been specified; use USE or qualify the table name",
                ))
            }
        };
        self.require_keyspace(&keyspace)?;

        let mut columns = Vec::with_capacity(create.columns.len());
        let mut pk_count = 0usize;
        for clause in &create.columns {
            if columns
                .iter()
                .any(|c: &ColumnDefinition| c.name == clause.name)
            {
                return Err(QueryError::invalid_request(format!(
                    "duplicate column '{}' in CREATE TABLE",
                    clause.name
                )));
            }
            let data_type = CqlType::parse(&clause.type_name).ok_or_else(|| {
                QueryError::invalid_request(format!("unknown type '{}'", clause.type_name))
            })?;
            if clause.primary_key {
                pk_count += 1;
            }
            columns.push(ColumnDefinition {
                name: clause.name.clone(),
                data_type,
                primary_key: clause.primary_key,
            });
        }
        if pk_count != 1 {
            return Err(QueryError::invalid_request(format!(
                "expected exactly one PRIMARY KEY column, found {}",
                pk_count
            )));
        }

        let table = QualifiedTable::new(keyspace, create.table.table.clone());
        Ok(CompiledKind::CreateTable(TableSchema::new(table, columns)))
    }
}

/// Coerces an untyped literal to a value of the column's declared type.
fn coerce_literal(literal: &Literal, column: &ColumnDefinition) -> QueryResult<CqlValue> {
    let mismatch = || {
        QueryError::invalid_request(format!(
            "literal does not match declared type {} of column '{}'",
            column.data_type, column.name
        ))
    };

    match (literal, column.data_type) {
        (Literal::String(s), CqlType::Text) => Ok(CqlValue::Text(s.clone())),
        (Literal::String(s), CqlType::Uuid) => parse_uuid(s).ok_or_else(mismatch),
        (Literal::Number(n), CqlType::Int) => {
            n.parse::<i32>().map(CqlValue::Int).map_err(|_| mismatch())
        }
        (Literal::Number(n), CqlType::BigInt) => n
            .parse::<i64>()
            .map(CqlValue::BigInt)
            .map_err(|_| mismatch()),
        (Literal::Number(n), CqlType::Timestamp) => n
            .parse::<i64>()
            .map(CqlValue::Timestamp)
            .map_err(|_| mismatch()),
        (Literal::Number(n), CqlType::Float) => n
            .parse::<f32>()
            .map(CqlValue::Float)
            .map_err(|_| mismatch()),
        (Literal::Number(n), CqlType::Double) => n
            .parse::<f64>()
            .map(CqlValue::Double)
            .map_err(|_| mismatch()),
        (Literal::Boolean(b), CqlType::Boolean) => Ok(CqlValue::Boolean(*b)),
        (Literal::Hex(bytes), CqlType::Blob) => Ok(CqlValue::Blob(bytes.clone())),
        _ => Err(mismatch()),
    }
}

/// Parses the canonical 8-4-4-4-12 UUID spelling.
fn parse_uuid(s: &str) -> Option<CqlValue> {
    let hex: String = s.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 || s.split('-').map(str::len).collect::<Vec<_>>() != [8, 4, 4, 4, 12] {
        return None;
    }
    let mut bytes = [0u8; 16];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(CqlValue::Uuid(bytes))
}
