/// Recursive detection of an existing sentinel-column condition.
pub mod predicate_scanner;
/// Discriminator column type shared by the scanner and the guard.
pub mod sentinel;
/// Representative-table resolution through subqueries and set operations.
pub mod table_resolver;

pub use predicate_scanner::{insert_has_sentinel, scan};
pub use sentinel::Sentinel;
pub use table_resolver::resolve;
