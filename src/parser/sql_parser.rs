use sqlparser::dialect::{Dialect, GenericDialect};
use sqlparser::parser::Parser;

use crate::error::{Error, Result};
use crate::parser::ast::Statement;
use crate::parser::lower;

/// Parse SQL text into raw `sqlparser` statements with the given dialect.
pub fn parse_raw_with(dialect: &dyn Dialect, sql: &str) -> Result<Vec<sqlparser::ast::Statement>> {
    Ok(Parser::parse_sql(dialect, sql)?)
}

/// Parse SQL text into raw `sqlparser` statements with the generic dialect.
pub fn parse_raw(sql: &str) -> Result<Vec<sqlparser::ast::Statement>> {
    parse_raw_with(&GenericDialect {}, sql)
}

/// Parse exactly one DML statement and lower it into the analysis grammar.
pub fn parse_statement(sql: &str) -> Result<Statement> {
    parse_statement_with(&GenericDialect {}, sql)
}

/// Like [`parse_statement`] with an explicit dialect.
pub fn parse_statement_with(dialect: &dyn Dialect, sql: &str) -> Result<Statement> {
    let mut statements = parse_raw_with(dialect, sql)?;
    match statements.len() {
        0 => Err(Error::EmptySql),
        1 => lower::lower_statement(&statements.remove(0)),
        n => Err(Error::MultipleStatements(n)),
    }
}

/// Parse every statement of a script, pairing each with its rendered SQL.
/// Statements outside the DML subset are returned as
/// `Err(UnsupportedStatement)` entries, keeping their position.
pub fn parse_statements(sql: &str) -> Result<Vec<(String, Result<Statement>)>> {
    Ok(parse_raw(sql)?
        .iter()
        .map(|raw| (raw.to_string(), lower::lower_statement(raw)))
        .collect())
}
