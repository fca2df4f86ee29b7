//! SQLite database provider implementation

use crate::database::{quote_identifier, sql_bound};
use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ColumnDescriptor, FieldValue, RecordValues, TableDescriptor, TableInfo};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};

/// SQLite database provider
pub struct SqliteProvider {
    pool: SqlitePool,
}

impl SqliteProvider {
    /// Create a new SQLite provider
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert a SQLite row into record values
    fn row_to_record(row: &SqliteRow) -> Result<RecordValues, DatabaseError> {
        let mut record = RecordValues::default();

        for column in row.columns() {
            match Self::extract_column_value(row, column)? {
                CellValue::Plain(value) => record.insert(column.name(), value),
                CellValue::Binary(length) => {
                    record.insert_opaque(column.name(), format!("[BLOB: {} bytes]", length))
                }
            }
        }

        Ok(record)
    }

    /// Extract a column value from a SQLite row
    fn extract_column_value(
        row: &SqliteRow,
        column: &sqlx::sqlite::SqliteColumn,
    ) -> Result<CellValue, DatabaseError> {
        let ordinal = column.ordinal();

        if row.try_get_raw(ordinal)?.is_null() {
            return Ok(CellValue::Plain(Value::Null));
        }

        // SQLite is dynamically typed; the declared type is only a hint, so a
        // failed decode falls through to the generic chain below
        match column.type_info().name() {
            "INTEGER" | "BIGINT" | "INT8" => {
                if let Ok(value) = row.try_get::<i64, _>(ordinal) {
                    return Ok(CellValue::Plain(Value::Number(value.into())));
                }
            }
            "REAL" | "FLOAT" | "DOUBLE" => {
                if let Ok(value) = row.try_get::<f64, _>(ordinal) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Ok(CellValue::Plain(Value::Number(number)));
                    }
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(ordinal) {
                    return Ok(blob_value(value));
                }
            }
            _ => {
                if let Ok(value) = row.try_get::<String, _>(ordinal) {
                    return Ok(CellValue::Plain(Value::String(value)));
                }
            }
        }

        if let Ok(value) = row.try_get::<i64, _>(ordinal) {
            return Ok(CellValue::Plain(Value::Number(value.into())));
        }
        if let Ok(value) = row.try_get::<f64, _>(ordinal) {
            if let Some(number) = serde_json::Number::from_f64(value) {
                return Ok(CellValue::Plain(Value::Number(number)));
            }
        }
        if let Ok(value) = row.try_get::<String, _>(ordinal) {
            return Ok(CellValue::Plain(Value::String(value)));
        }
        if let Ok(value) = row.try_get::<Vec<u8>, _>(ordinal) {
            return Ok(blob_value(value));
        }

        Ok(CellValue::Plain(Value::Null))
    }
}

/// A decoded column value
#[derive(Debug, PartialEq)]
enum CellValue {
    Plain(Value),
    /// Binary data of the given length that has no text form
    Binary(usize),
}

/// Show UTF-8 blobs as text; anything else is binary
fn blob_value(bytes: Vec<u8>) -> CellValue {
    match String::from_utf8(bytes) {
        Ok(text) => CellValue::Plain(Value::String(text)),
        Err(error) => CellValue::Binary(error.as_bytes().len()),
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, DatabaseError> {
        let query = "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            tables.push(TableInfo { name });
        }

        Ok(tables)
    }

    async fn describe_table(&self, table: &str) -> Result<TableDescriptor, DatabaseError> {
        let table_info_query = format!("PRAGMA table_info({})", quote_identifier(table));
        tracing::debug!(table, "describing sqlite table");

        let column_rows = sqlx::query(&table_info_query).fetch_all(&self.pool).await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in column_rows {
            // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i32 = row.try_get("notnull")?;
            let default_value: Option<String> = row.try_get("dflt_value").ok().flatten();
            let primary_key: i32 = row.try_get("pk")?;

            columns.push(ColumnDescriptor::new(
                name,
                data_type,
                not_null == 0,
                default_value,
                primary_key > 0,
            ));
        }

        TableDescriptor::new(table, columns)
    }

    async fn count_rows(&self, table: &TableDescriptor) -> Result<u64, DatabaseError> {
        let count_query = format!("SELECT COUNT(*) FROM {}", quote_identifier(&table.name));

        let count: i64 = sqlx::query_scalar(&count_query).fetch_one(&self.pool).await?;

        Ok(count.max(0) as u64)
    }

    async fn fetch_rows(
        &self,
        table: &TableDescriptor,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<RecordValues>, DatabaseError> {
        let primary_key = table.primary_key()?;
        let select_query = format!(
            "SELECT * FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name)
        );

        let rows = sqlx::query(&select_query)
            .bind(sql_bound(limit))
            .bind(sql_bound(offset))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn fetch_record(
        &self,
        table: &TableDescriptor,
        key: &str,
    ) -> Result<Option<RecordValues>, DatabaseError> {
        let primary_key = table.primary_key()?;
        let select_query = format!(
            "SELECT * FROM {} WHERE {} = ? LIMIT 1",
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name)
        );

        let row = sqlx::query(&select_query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn insert_record(
        &self,
        table: &TableDescriptor,
        fields: &[FieldValue],
    ) -> Result<u64, DatabaseError> {
        let insert_query = if fields.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(&table.name))
        } else {
            let columns: Vec<String> = fields
                .iter()
                .map(|field| quote_identifier(&field.column))
                .collect();
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_identifier(&table.name),
                columns.join(", "),
                placeholders
            )
        };

        let mut sql_query = sqlx::query(&insert_query);
        for field in fields {
            sql_query = sql_query.bind(field.value.as_deref());
        }

        let result = sql_query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update_record(
        &self,
        table: &TableDescriptor,
        key: &str,
        fields: &[FieldValue],
    ) -> Result<u64, DatabaseError> {
        let primary_key = table.primary_key()?;
        if fields.is_empty() {
            return Ok(0);
        }

        let assignments: Vec<String> = fields
            .iter()
            .map(|field| format!("{} = ?", quote_identifier(&field.column)))
            .collect();
        let update_query = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(&table.name),
            assignments.join(", "),
            quote_identifier(&primary_key.name)
        );

        let mut sql_query = sqlx::query(&update_query);
        for field in fields {
            sql_query = sql_query.bind(field.value.as_deref());
        }
        let result = sql_query.bind(key).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn delete_record(&self, table: &TableDescriptor, key: &str) -> Result<u64, DatabaseError> {
        let primary_key = table.primary_key()?;
        let delete_query = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name)
        );

        let result = sqlx::query(&delete_query)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_value_utf8() {
        assert_eq!(
            blob_value(b"hello".to_vec()),
            CellValue::Plain(Value::String("hello".to_string()))
        );
    }

    #[test]
    fn test_blob_value_binary() {
        assert_eq!(blob_value(vec![0xff, 0xfe, 0x00]), CellValue::Binary(3));
    }
}
