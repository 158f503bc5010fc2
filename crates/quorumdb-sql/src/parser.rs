//! Hand-rolled parser for the supported statement grammar.
//!
//! The grammar covers exactly the statements the execution layer
//! orchestrates: SELECT / INSERT / UPDATE / DELETE with `?` bind markers,
//! the keyspace and table DDL, and USE. Malformed text fails with
//! [`QueryError::Syntax`]; nothing here touches a schema.

use crate::statement::*;
use quorumdb_commons::{KeyspaceName, QueryError, QueryResult, TableName};

/// Parses query text into a [`CqlStatement`].
pub fn parse(sql: &str) -> QueryResult<CqlStatement> {
    let tokens = tokenize(sql)?;
    let mut parser = Parser { tokens, pos: 0 };
    let kind = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(CqlStatement::new(sql.to_string(), kind))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    StringLit(String),
    Number(String),
    Hex(Vec<u8>),
    Symbol(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("'{}'", s),
            Token::StringLit(_) => "string literal".to_string(),
            Token::Number(n) => format!("number '{}'", n),
            Token::Hex(_) => "hex literal".to_string(),
            Token::Symbol(c) => format!("'{}'", c),
        }
    }
}

fn tokenize(sql: &str) -> QueryResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '\'' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('\'') => {
                        // '' escapes a single quote inside the literal
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            s.push('\'');
                        } else {
                            break;
                        }
                    }
                    Some(ch) => s.push(ch),
                    None => return Err(QueryError::syntax("unterminated string literal")),
                }
            }
            tokens.push(Token::StringLit(s));
        } else if c.is_ascii_digit() || c == '-' {
            let mut raw = String::new();
            raw.push(c);
            chars.next();
            if c == '-' && !chars.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                return Err(QueryError::syntax("unexpected '-'"));
            }
            while let Some(&ch) = chars.peek() {
                if ch.is_ascii_alphanumeric() || ch == '.' {
                    raw.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if raw.starts_with("0x") || raw.starts_with("0X") {
                tokens.push(Token::Hex(parse_hex(&raw[2..])?));
            } else {
                tokens.push(Token::Number(raw));
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    ident.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident.to_lowercase()));
        } else if matches!(c, '(' | ')' | ',' | '=' | '?' | '*' | '.' | ';') {
            chars.next();
            tokens.push(Token::Symbol(c));
        } else {
            return Err(QueryError::syntax(format!("unexpected character '{}'", c)));
        }
    }

    Ok(tokens)
}

fn parse_hex(digits: &str) -> QueryResult<Vec<u8>> {
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(QueryError::syntax("hex literal must have an even number of digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| QueryError::syntax(format!("invalid hex literal 0x{}", digits)))
        })
        .collect()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> QueryResult<&Token> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| QueryError::syntax("unexpected end of statement"))?;
        self.pos += 1;
        Ok(token)
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == kw)
    }

    fn expect_keyword(&mut self, kw: &str) -> QueryResult<()> {
        match self.next()? {
            Token::Ident(s) if s == kw => Ok(()),
            other => Err(QueryError::syntax(format!(
                "expected {}, got {}",
                kw.to_uppercase(),
                other.describe()
            ))),
        }
    }

    fn expect_symbol(&mut self, sym: char) -> QueryResult<()> {
        match self.next()? {
            Token::Symbol(c) if *c == sym => Ok(()),
            other => Err(QueryError::syntax(format!(
                "expected '{}', got {}",
                sym,
                other.describe()
            ))),
        }
    }

    fn eat_symbol(&mut self, sym: char) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(c)) if *c == sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_identifier(&mut self) -> QueryResult<String> {
        match self.next()? {
            Token::Ident(s) => Ok(s.clone()),
            other => Err(QueryError::syntax(format!(
                "expected identifier, got {}",
                other.describe()
            ))),
        }
    }

    fn parse_keyspace_name(&mut self) -> QueryResult<KeyspaceName> {
        let name = self.parse_identifier()?;
        KeyspaceName::try_new(name).map_err(|e| QueryError::syntax(e.to_string()))
    }

    fn parse_table_ref(&mut self) -> QueryResult<TableRef> {
        let first = self.parse_identifier()?;
        if self.eat_symbol('.') {
            let second = self.parse_identifier()?;
            Ok(TableRef {
                keyspace: Some(
                    KeyspaceName::try_new(first).map_err(|e| QueryError::syntax(e.to_string()))?,
                ),
                table: TableName::try_new(second)
                    .map_err(|e| QueryError::syntax(e.to_string()))?,
            })
        } else {
            Ok(TableRef {
                keyspace: None,
                table: TableName::try_new(first).map_err(|e| QueryError::syntax(e.to_string()))?,
            })
        }
    }

    fn parse_term(&mut self) -> QueryResult<Term> {
        match self.next()? {
            Token::StringLit(s) => Ok(Term::Literal(Literal::String(s.clone()))),
            Token::Number(n) => Ok(Term::Literal(Literal::Number(n.clone()))),
            Token::Hex(bytes) => Ok(Term::Literal(Literal::Hex(bytes.clone()))),
            Token::Ident(s) if s == "true" => Ok(Term::Literal(Literal::Boolean(true))),
            Token::Ident(s) if s == "false" => Ok(Term::Literal(Literal::Boolean(false))),
            Token::Symbol('?') => Ok(Term::BindMarker),
            other => Err(QueryError::syntax(format!(
                "expected a value or bind marker, got {}",
                other.describe()
            ))),
        }
    }

    fn parse_restriction(&mut self) -> QueryResult<Restriction> {
        self.expect_keyword("where")?;
        let column = self.parse_identifier()?;
        self.expect_symbol('=')?;
        let value = self.parse_term()?;
        Ok(Restriction { column, value })
    }

    fn expect_end(&mut self) -> QueryResult<()> {
        self.eat_symbol(';');
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(QueryError::syntax(format!(
                "unexpected trailing {}",
                token.describe()
            ))),
        }
    }

    fn parse_statement(&mut self) -> QueryResult<CqlStatementKind> {
        let keyword = match self.peek() {
            Some(Token::Ident(kw)) => kw.clone(),
            Some(token) => {
                return Err(QueryError::syntax(format!(
                    "expected a statement, got {}",
                    token.describe()
                )))
            }
            None => return Err(QueryError::syntax("empty statement")),
        };
        match keyword.as_str() {
            "select" => self.parse_select(),
            "insert" => self.parse_insert(),
            "update" => self.parse_update(),
            "delete" => self.parse_delete(),
            "create" => self.parse_create(),
            "drop" => self.parse_drop(),
            "use" => self.parse_use(),
            other => Err(QueryError::syntax(format!(
                "unsupported statement '{}'",
                other.to_uppercase()
            ))),
        }
    }

    fn parse_select(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("select")?;
        let columns = if self.eat_symbol('*') {
            SelectColumns::All
        } else {
            let mut names = vec![self.parse_identifier()?];
            while self.eat_symbol(',') {
                names.push(self.parse_identifier()?);
            }
            SelectColumns::Named(names)
        };
        self.expect_keyword("from")?;
        let table = self.parse_table_ref()?;
        let restriction = if self.at_keyword("where") {
            Some(self.parse_restriction()?)
        } else {
            None
        };
        Ok(CqlStatementKind::Select(SelectStatement {
            table,
            columns,
            restriction,
        }))
    }

    fn parse_insert(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("insert")?;
        self.expect_keyword("into")?;
        let table = self.parse_table_ref()?;

        self.expect_symbol('(')?;
        let mut columns = vec![self.parse_identifier()?];
        while self.eat_symbol(',') {
            columns.push(self.parse_identifier()?);
        }
        self.expect_symbol(')')?;

        self.expect_keyword("values")?;
        self.expect_symbol('(')?;
        let mut values = vec![self.parse_term()?];
        while self.eat_symbol(',') {
            values.push(self.parse_term()?);
        }
        self.expect_symbol(')')?;

        Ok(CqlStatementKind::Insert(InsertStatement {
            table,
            columns,
            values,
        }))
    }

    fn parse_update(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("update")?;
        let table = self.parse_table_ref()?;
        self.expect_keyword("set")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_identifier()?;
            self.expect_symbol('=')?;
            let value = self.parse_term()?;
            assignments.push(Assignment { column, value });
            if !self.eat_symbol(',') {
                break;
            }
        }

        let restriction = self.parse_restriction()?;
        Ok(CqlStatementKind::Update(UpdateStatement {
            table,
            assignments,
            restriction,
        }))
    }

    fn parse_delete(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("delete")?;
        self.expect_keyword("from")?;
        let table = self.parse_table_ref()?;
        let restriction = self.parse_restriction()?;
        Ok(CqlStatementKind::Delete(DeleteStatement { table, restriction }))
    }

    fn parse_create(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("create")?;
        if self.at_keyword("keyspace") {
            self.expect_keyword("keyspace")?;
            let keyspace = self.parse_keyspace_name()?;
            Ok(CqlStatementKind::CreateKeyspace(CreateKeyspaceStatement {
                keyspace,
            }))
        } else {
            self.expect_keyword("table")?;
            let table = self.parse_table_ref()?;
            self.expect_symbol('(')?;
            let mut columns = Vec::new();
            loop {
                let name = self.parse_identifier()?;
                let type_name = self.parse_identifier()?;
                let primary_key = if self.at_keyword("primary") {
                    self.expect_keyword("primary")?;
                    self.expect_keyword("key")?;
                    true
                } else {
                    false
                };
                columns.push(ColumnClause {
                    name,
                    type_name,
                    primary_key,
                });
                if !self.eat_symbol(',') {
                    break;
                }
            }
            self.expect_symbol(')')?;
            Ok(CqlStatementKind::CreateTable(CreateTableStatement {
                table,
                columns,
            }))
        }
    }

    fn parse_drop(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("drop")?;
        if self.at_keyword("keyspace") {
            self.expect_keyword("keyspace")?;
            let keyspace = self.parse_keyspace_name()?;
            Ok(CqlStatementKind::DropKeyspace(DropKeyspaceStatement {
                keyspace,
            }))
        } else {
            self.expect_keyword("table")?;
            let table = self.parse_table_ref()?;
            Ok(CqlStatementKind::DropTable(DropTableStatement { table }))
        }
    }

    fn parse_use(&mut self) -> QueryResult<CqlStatementKind> {
        self.expect_keyword("use")?;
        let keyspace = self.parse_keyspace_name()?;
        Ok(CqlStatementKind::UseKeyspace(UseKeyspaceStatement {
            keyspace,
        }))
    }
}
