//! Database abstraction layer
//!
//! This module provides a database-agnostic interface for schema discovery,
//! paged reads, and single-record mutations.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export the main trait
pub use traits::{DatabaseError, DatabaseProvider};

/// Quote an identifier (table or column name) to prevent SQL injection
///
/// Both SQLite and PostgreSQL use double quotes for identifiers. Embedded
/// double quotes are escaped by doubling them.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Convert a row count or position to a SQL integer parameter
///
/// Values beyond `i64::MAX` clamp to it rather than wrapping negative.
pub(crate) fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_bound_clamps() {
        assert_eq!(sql_bound(30), 30);
        assert_eq!(sql_bound(i64::MAX as u64), i64::MAX);
        assert_eq!(sql_bound(u64::MAX), i64::MAX);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("table\"name"), "\"table\"\"name\"");
        assert_eq!(quote_identifier("with space"), "\"with space\"");
    }
}
