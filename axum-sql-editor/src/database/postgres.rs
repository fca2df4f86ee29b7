//! PostgreSQL database provider implementation

use crate::database::{quote_identifier, sql_bound};
use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ColumnDescriptor, FieldValue, RecordValues, TableDescriptor, TableInfo};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

/// SQLSTATE codes raised when text cannot be converted to a column type:
/// invalid text representation, numeric out of range, invalid datetime
/// format and datetime field overflow
const INVALID_INPUT_CODES: &[&str] = &["22P02", "22003", "22007", "22008"];

fn is_invalid_input_code(code: &str) -> bool {
    INVALID_INPUT_CODES.contains(&code)
}

fn is_invalid_input(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(database_error) => database_error
            .code()
            .is_some_and(|code| is_invalid_input_code(&code)),
        _ => false,
    }
}

/// Column type without length or precision modifiers
///
/// An explicit cast to a length-limited type truncates, so parameters are cast
/// to the unmodified type and the column's own limit applies on assignment.
/// Bare `character` and `bit` mean length 1 and map to their unbounded names.
fn cast_target(data_type: &str) -> String {
    let mut unmodified = String::with_capacity(data_type.len());
    let mut depth = 0usize;
    for character in data_type.chars() {
        match character {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => unmodified.push(character),
            _ => {}
        }
    }

    let (base, array_suffix) = match unmodified.find('[') {
        Some(index) => unmodified.split_at(index),
        None => (unmodified.as_str(), ""),
    };
    let base = match base.trim() {
        "character" => "bpchar",
        "bit" => "varbit",
        other => other,
    };
    format!("{}{}", base, array_suffix)
}

/// PostgreSQL database provider
///
/// Only tables in the `public` schema are visible.
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    /// Create a new PostgreSQL provider
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Select list that renders every column as text
    ///
    /// Values are opaque to the editor, so the server does the formatting and
    /// every type (numeric, timestamp, uuid, enums, arrays) decodes the same way.
    fn text_select_list(table: &TableDescriptor) -> String {
        table
            .columns
            .iter()
            .map(|column| {
                let quoted = quote_identifier(&column.name);
                format!("{}::text AS {}", quoted, quoted)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Placeholder that casts a text parameter to the column type
    fn typed_placeholder(index: usize, data_type: &str) -> String {
        format!("CAST(${} AS {})", index, cast_target(data_type))
    }

    /// Whether `key` converts to the primary-key type
    ///
    /// A key that does not convert can match no row, so callers answer with
    /// "no record" instead of failing the whole statement.
    async fn key_converts(&self, table: &TableDescriptor, key: &str) -> Result<bool, DatabaseError> {
        let primary_key = table.primary_key()?;
        let check_query = format!("SELECT {}", Self::typed_placeholder(1, &primary_key.data_type));

        match sqlx::query(&check_query).bind(key).execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(error) if is_invalid_input(&error) => {
                tracing::debug!(table = %table.name, key, "key does not convert to the key type");
                Ok(false)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Convert a text-projected row into record values
    fn row_to_record(table: &TableDescriptor, row: &PgRow) -> Result<RecordValues, DatabaseError> {
        let mut record = RecordValues::default();

        for column in &table.columns {
            let value: Option<String> = row.try_get(column.name.as_str())?;
            record.insert(
                column.name.clone(),
                value
                    .map(serde_json::Value::String)
                    .unwrap_or(serde_json::Value::Null),
            );
        }

        Ok(record)
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, DatabaseError> {
        let query = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("table_name")?;
            tables.push(TableInfo { name });
        }

        Ok(tables)
    }

    async fn describe_table(&self, table: &str) -> Result<TableDescriptor, DatabaseError> {
        // format_type gives the declared type including its length, which is
        // both what the kind inference needs and a valid CAST target
        let column_query = r#"
            SELECT
                a.attname AS column_name,
                format_type(a.atttypid, a.atttypmod) AS data_type,
                NOT a.attnotnull AS is_nullable,
                pg_get_expr(d.adbin, d.adrelid) AS column_default,
                EXISTS (
                    SELECT 1
                    FROM pg_index i
                    WHERE i.indrelid = a.attrelid
                      AND i.indisprimary
                      AND a.attnum = ANY(i.indkey)
                ) AS is_primary_key
            FROM pg_attribute a
            JOIN pg_class c ON c.oid = a.attrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
            WHERE n.nspname = 'public'
              AND c.relname = $1
              AND c.relkind IN ('r', 'p')
              AND a.attnum > 0
              AND NOT a.attisdropped
            ORDER BY a.attnum
        "#;

        tracing::debug!(table, "describing postgres table");
        let column_rows = sqlx::query(column_query)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let columns = column_rows
            .iter()
            .map(|row| {
                Ok(ColumnDescriptor::new(
                    row.try_get::<String, _>("column_name")?,
                    row.try_get::<String, _>("data_type")?,
                    row.try_get::<bool, _>("is_nullable")?,
                    row.try_get::<Option<String>, _>("column_default")?,
                    row.try_get::<bool, _>("is_primary_key")?,
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

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
            "SELECT {} FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            Self::text_select_list(table),
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name)
        );

        let rows = sqlx::query(&select_query)
            .bind(sql_bound(limit))
            .bind(sql_bound(offset))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Self::row_to_record(table, row))
            .collect()
    }

    async fn fetch_record(
        &self,
        table: &TableDescriptor,
        key: &str,
    ) -> Result<Option<RecordValues>, DatabaseError> {
        let primary_key = table.primary_key()?;
        if !self.key_converts(table, key).await? {
            return Ok(None);
        }
        let select_query = format!(
            "SELECT {} FROM {} WHERE {} = {} LIMIT 1",
            Self::text_select_list(table),
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name),
            Self::typed_placeholder(1, &primary_key.data_type)
        );

        let row = sqlx::query(&select_query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(|row| Self::row_to_record(table, row))
            .transpose()
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
            let placeholders: Vec<String> = fields
                .iter()
                .enumerate()
                .map(|(index, field)| Self::typed_placeholder(index + 1, &field.data_type))
                .collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_identifier(&table.name),
                columns.join(", "),
                placeholders.join(", ")
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
        if fields.is_empty() || !self.key_converts(table, key).await? {
            return Ok(0);
        }

        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                format!(
                    "{} = {}",
                    quote_identifier(&field.column),
                    Self::typed_placeholder(index + 1, &field.data_type)
                )
            })
            .collect();
        let update_query = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote_identifier(&table.name),
            assignments.join(", "),
            quote_identifier(&primary_key.name),
            Self::typed_placeholder(fields.len() + 1, &primary_key.data_type)
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
        if !self.key_converts(table, key).await? {
            return Ok(0);
        }
        let delete_query = format!(
            "DELETE FROM {} WHERE {} = {}",
            quote_identifier(&table.name),
            quote_identifier(&primary_key.name),
            Self::typed_placeholder(1, &primary_key.data_type)
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

    fn accounts() -> TableDescriptor {
        TableDescriptor::new(
            "accounts",
            vec![
                ColumnDescriptor::new("id", "integer", false, None, true),
                ColumnDescriptor::new("email", "character varying(120)", false, None, false),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_text_select_list() {
        assert_eq!(
            PostgresProvider::text_select_list(&accounts()),
            "\"id\"::text AS \"id\", \"email\"::text AS \"email\""
        );
    }

    #[test]
    fn test_typed_placeholder() {
        assert_eq!(
            PostgresProvider::typed_placeholder(3, "timestamp without time zone"),
            "CAST($3 AS timestamp without time zone)"
        );
        assert_eq!(
            PostgresProvider::typed_placeholder(1, "character varying(120)"),
            "CAST($1 AS character varying)"
        );
    }

    #[test]
    fn test_cast_target_drops_modifiers() {
        assert_eq!(cast_target("character varying(120)"), "character varying");
        assert_eq!(cast_target("numeric(10,2)"), "numeric");
        assert_eq!(cast_target("timestamp(3) without time zone"), "timestamp without time zone");
        assert_eq!(cast_target("integer"), "integer");
        assert_eq!(cast_target("character varying(20)[]"), "character varying[]");
    }

    #[test]
    fn test_cast_target_keeps_fixed_width_types_unbounded() {
        assert_eq!(cast_target("character(12)"), "bpchar");
        assert_eq!(cast_target("bit(8)"), "varbit");
        assert_eq!(cast_target("character(3)[]"), "bpchar[]");
        assert_eq!(cast_target("bit varying(5)"), "bit varying");
    }

    #[test]
    fn test_invalid_input_codes() {
        assert!(is_invalid_input_code("22P02"));
        assert!(is_invalid_input_code("22003"));
        assert!(is_invalid_input_code("22007"));
        assert!(!is_invalid_input_code("23505"));
        assert!(!is_invalid_input_code("42P01"));
    }

    #[test]
    fn test_non_database_errors_are_not_invalid_input() {
        assert!(!is_invalid_input(&sqlx::Error::RowNotFound));
        assert!(!is_invalid_input(&sqlx::Error::PoolTimedOut));
    }
}
