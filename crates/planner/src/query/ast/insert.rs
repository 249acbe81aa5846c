//! Defines the AST for an INSERT statement.

use crate::query::ast::common::TableRef;

/// A single-row INSERT whose values are positional placeholders, for use
/// as a prepared statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
}
