/// Errors raised outside the pure analysis core: parsing, configuration,
/// rewriting and output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SQL text could not be parsed.
    #[error("SQL parse error: {0}")]
    Parse(String),
    /// The SQL text contained no statement.
    #[error("SQL text contains no statement")]
    EmptySql,
    /// A single statement was expected.
    #[error("expected a single statement, found {0}")]
    MultipleStatements(usize),
    /// The statement is not a SELECT, INSERT, UPDATE or DELETE.
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
    /// The policy configuration could not be read.
    #[error("invalid policy configuration: {0}")]
    Config(String),
    /// A policy rule is structurally invalid.
    #[error("invalid rule '{name}': {reason}")]
    InvalidRule {
        /// Name of the offending rule (may be empty).
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The host-supplied rewriter failed.
    #[error("rewrite failed: {0}")]
    Rewrite(String),
    /// Writing a report failed.
    #[error("{0}")]
    Output(String),
}

impl From<sqlparser::parser::ParserError> for Error {
    fn from(value: sqlparser::parser::ParserError) -> Self {
        Error::Parse(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Config(value.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
