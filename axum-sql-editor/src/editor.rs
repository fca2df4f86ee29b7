//! Table editing operations
//!
//! Every operation that addresses a table describes it first from live
//! metadata, so a table without a usable primary key fails here with
//! [`DatabaseError::MissingPrimaryKey`] before any row is read or written.

use std::sync::Arc;

use crate::database::{DatabaseError, DatabaseProvider};
use crate::pagination::PageContext;
use crate::schema::{RecordValues, TableDescriptor, TableInfo};
use crate::settings::EditorSettings;

/// One page of rows together with the schema used to render it
#[derive(Debug, Clone)]
pub struct ListPage {
    pub table: TableDescriptor,
    pub rows: Vec<RecordValues>,
    pub page: PageContext,
}

/// A record loaded for the edit form
#[derive(Debug, Clone)]
pub struct RecordView {
    pub table: TableDescriptor,
    pub key: String,
    pub values: RecordValues,
}

/// Request-scoped operations over a database provider
pub struct TableEditor<DB: DatabaseProvider> {
    database: Arc<DB>,
    settings: Arc<EditorSettings>,
}

impl<DB: DatabaseProvider> Clone for TableEditor<DB> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<DB: DatabaseProvider> TableEditor<DB> {
    pub fn new(database: Arc<DB>, settings: Arc<EditorSettings>) -> Self {
        Self { database, settings }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// All tables, ordered by name
    pub async fn tables(&self) -> Result<Vec<TableInfo>, DatabaseError> {
        self.database.list_tables().await
    }

    /// Describe a table from live metadata
    pub async fn describe(&self, table: &str) -> Result<TableDescriptor, DatabaseError> {
        self.database.describe_table(table).await
    }

    /// Count and fetch one page of rows
    ///
    /// `page` is clamped to at least 1; pages past the end come back empty.
    pub async fn list_page(&self, table: &str, page: u64) -> Result<ListPage, DatabaseError> {
        let table = self.describe(table).await?;
        let total_count = self.database.count_rows(&table).await?;
        let page = PageContext::new(&table.name, page, self.settings.page_size, total_count);

        tracing::debug!(
            table = %table.name,
            page = page.page,
            offset = page.offset(),
            limit = page.limit(),
            "fetching rows"
        );
        if page.offset() >= total_count {
            return Ok(ListPage {
                table,
                rows: Vec::new(),
                page,
            });
        }
        let rows = self
            .database
            .fetch_rows(&table, page.limit(), page.offset())
            .await?;

        Ok(ListPage { table, rows, page })
    }

    /// Load one record by primary key
    pub async fn record(&self, table: &str, key: &str) -> Result<RecordView, DatabaseError> {
        let table = self.describe(table).await?;
        let values = self
            .database
            .fetch_record(&table, key)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound {
                table: table.name.clone(),
                key: key.to_string(),
            })?;

        Ok(RecordView {
            table,
            key: key.to_string(),
            values,
        })
    }

    /// Insert a record from submitted fields
    ///
    /// Unknown fields and the primary key are dropped before inserting.
    pub async fn create(&self, table: &str, fields: &[(String, String)]) -> Result<u64, DatabaseError> {
        let table = self.describe(table).await?;
        let accepted = table.filter_fields(fields);

        tracing::info!(table = %table.name, columns = accepted.len(), "creating record");
        self.database.insert_record(&table, &accepted).await
    }

    /// Update the record addressed by `key`; a missing record is a no-op
    pub async fn update(
        &self,
        table: &str,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<u64, DatabaseError> {
        let table = self.describe(table).await?;
        let accepted = table.filter_fields(fields);

        let affected = self.database.update_record(&table, key, &accepted).await?;
        tracing::info!(table = %table.name, key, affected, "updated record");
        Ok(affected)
    }

    /// Delete the record addressed by `key`; a missing record is a no-op
    pub async fn delete(&self, table: &str, key: &str) -> Result<u64, DatabaseError> {
        let table = self.describe(table).await?;

        let affected = self.database.delete_record(&table, key).await?;
        tracing::info!(table = %table.name, key, affected, "deleted record");
        Ok(affected)
    }
}
