//! Database provider trait
//!
//! This trait defines the interface that all database implementations must provide.

use crate::schema::{FieldValue, RecordValues, TableDescriptor, TableInfo};
use async_trait::async_trait;
use thiserror::Error;

/// Database provider trait for schema discovery and record access
///
/// Implementations read live metadata on every call; nothing is cached
/// between requests. Connections are borrowed from the pool per query.
///
/// Record keys arrive as text from the URL. A key that cannot be converted to
/// the primary-key column's type matches no row: `fetch_record` returns
/// `None` and `update_record`/`delete_record` affect zero rows.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// List all user tables in the database, ordered by name
    async fn list_tables(&self) -> Result<Vec<TableInfo>, DatabaseError>;

    /// Describe a table from live metadata
    ///
    /// # Errors
    ///
    /// * [`DatabaseError::TableNotFound`] if the table has no columns
    /// * [`DatabaseError::MissingPrimaryKey`] unless exactly one column is the key
    async fn describe_table(&self, table: &str) -> Result<TableDescriptor, DatabaseError>;

    /// Count all rows in a described table
    async fn count_rows(&self, table: &TableDescriptor) -> Result<u64, DatabaseError>;

    /// Fetch one page of rows ordered by primary key
    ///
    /// `limit` and `offset` beyond the range of SQL integers are clamped.
    ///
    /// # Arguments
    ///
    /// * `table` - Described table
    /// * `limit` - Maximum rows to return
    /// * `offset` - Rows to skip
    async fn fetch_rows(
        &self,
        table: &TableDescriptor,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<RecordValues>, DatabaseError>;

    /// Fetch the row whose primary key equals `key`, if any
    async fn fetch_record(
        &self,
        table: &TableDescriptor,
        key: &str,
    ) -> Result<Option<RecordValues>, DatabaseError>;

    /// Insert one row; an empty field list inserts default values
    async fn insert_record(
        &self,
        table: &TableDescriptor,
        fields: &[FieldValue],
    ) -> Result<u64, DatabaseError>;

    /// Update the row whose primary key equals `key`
    ///
    /// Returns the number of affected rows; zero is not an error.
    async fn update_record(
        &self,
        table: &TableDescriptor,
        key: &str,
        fields: &[FieldValue],
    ) -> Result<u64, DatabaseError>;

    /// Delete the row whose primary key equals `key`
    ///
    /// Returns the number of affected rows; zero is not an error.
    async fn delete_record(&self, table: &TableDescriptor, key: &str) -> Result<u64, DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Generic database error
    #[error("Database error: {0}")]
    Query(String),

    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// No row matches the requested primary key
    #[error("Record not found: {key} in {table}")]
    RecordNotFound { table: String, key: String },

    /// The table has no single-column primary key
    #[error("Table {0} has no primary key; records cannot be addressed")]
    MissingPrimaryKey(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
