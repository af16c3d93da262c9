/// Closed statement grammar analysed by the core, with SQL rendering.
pub mod ast;
/// Helpers over `sqlparser` expressions and object names.
pub mod expr;
/// Lowering from `sqlparser`'s syntax tree into [`ast`].
pub mod lower;
/// Identifier normalization and qualified-name splitting.
pub mod names;
/// Thin wrapper around `sqlparser` for statement parsing.
pub mod sql_parser;
