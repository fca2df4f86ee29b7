//! Schema types for dynamic database introspection
//!
//! These types represent table metadata discovered at request time. Nothing
//! here is cached; a fresh [`TableDescriptor`] is built for every request that
//! addresses a table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::database::DatabaseError;

/// Runtime-derived metadata for one database table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    /// Name of the table
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Build a descriptor, checking that exactly one column is the primary key
    ///
    /// Tables without a primary key, and tables whose key spans several
    /// columns, cannot address a single record and are rejected with
    /// [`DatabaseError::MissingPrimaryKey`].
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Result<Self, DatabaseError> {
        let name = name.into();
        let key_columns = columns.iter().filter(|column| column.is_primary_key).count();
        if key_columns != 1 {
            return Err(DatabaseError::MissingPrimaryKey(name));
        }
        Ok(Self { name, columns })
    }

    /// The primary-key column used to address single records
    pub fn primary_key(&self) -> Result<&ColumnDescriptor, DatabaseError> {
        self.columns
            .iter()
            .find(|column| column.is_primary_key)
            .ok_or_else(|| DatabaseError::MissingPrimaryKey(self.name.clone()))
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Keep only submitted fields that name a non-key column of this table
    ///
    /// Unknown names and control fields such as `_method` are dropped
    /// silently, as is any value for the primary key. If a column is
    /// submitted twice the last value wins. Empty values for columns of kind
    /// [`ColumnKind::Other`] become `None` so they are stored as `NULL`, and so
    /// do empty values of nullable columns named by a [`NULL_MARKER_FIELD`].
    pub fn filter_fields(&self, fields: &[(String, String)]) -> Vec<FieldValue> {
        let null_columns: BTreeSet<&str> = fields
            .iter()
            .filter(|(name, _)| name == NULL_MARKER_FIELD)
            .map(|(_, column)| column.as_str())
            .collect();
        let mut accepted: Vec<FieldValue> = Vec::new();

        for (name, value) in fields {
            let Some(column) = self.column(name) else {
                continue;
            };
            if column.is_primary_key {
                continue;
            }

            let stores_null = column.kind == ColumnKind::Other
                || (column.nullable && null_columns.contains(column.name.as_str()));
            let value = if value.is_empty() && stores_null {
                None
            } else {
                Some(value.clone())
            };

            match accepted.iter_mut().find(|field| field.column == column.name) {
                Some(existing) => existing.value = value,
                None => accepted.push(FieldValue {
                    column: column.name.clone(),
                    data_type: column.data_type.clone(),
                    value,
                }),
            }
        }

        accepted
    }
}

/// Form field naming a column whose empty value means NULL
pub const NULL_MARKER_FIELD: &str = "_null";

/// Information about a single column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// SQL data type as reported by the database (e.g. "INTEGER", "VARCHAR(255)")
    pub data_type: String,

    /// Display kind inferred from `data_type`
    pub kind: ColumnKind,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Whether this column is the primary key
    pub is_primary_key: bool,
}

impl ColumnDescriptor {
    /// Create a column, inferring its kind from the raw type string
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        nullable: bool,
        default_value: Option<String>,
        is_primary_key: bool,
    ) -> Self {
        let data_type = data_type.into();
        Self {
            name: name.into(),
            kind: ColumnKind::from_sql_type(&data_type),
            data_type,
            nullable,
            default_value,
            is_primary_key,
        }
    }

    /// Declared length of a character column, e.g. 255 for `VARCHAR(255)`
    pub fn declared_length(&self) -> Option<u32> {
        extract_length(&self.data_type)
    }
}

/// Closed set of display kinds used to pick form widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    /// Character column with a declared length
    ShortText,
    /// Character column without a declared length
    LongText,
    /// Anything that is not character data
    Other,
}

/// Type names that are always unbounded text
const LONG_TEXT_TYPES: &[&str] = &[
    "TEXT",
    "CLOB",
    "STRING",
    "CITEXT",
    "TINYTEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
];

/// Character type names that are short text when a length is declared
const CHARACTER_TYPES: &[&str] = &[
    "VARCHAR",
    "CHARACTER VARYING",
    "VARYING CHARACTER",
    "NATIVE CHARACTER",
    "NVARCHAR",
    "NCHAR",
    "CHARACTER",
    "CHAR",
    "BPCHAR",
];

impl ColumnKind {
    /// Map raw database type metadata to a display kind
    ///
    /// Matching is case-insensitive. A character type with a declared length
    /// is short text; the same type without a length is long text.
    pub fn from_sql_type(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let base = upper
            .split('(')
            .next()
            .unwrap_or_default()
            .trim();

        if LONG_TEXT_TYPES.contains(&base) {
            return ColumnKind::LongText;
        }

        if CHARACTER_TYPES.contains(&base) {
            return match extract_length(&upper) {
                Some(_) => ColumnKind::ShortText,
                None => ColumnKind::LongText,
            };
        }

        ColumnKind::Other
    }
}

/// Extract the length from a type like "VARCHAR(255)"
fn extract_length(data_type: &str) -> Option<u32> {
    let start = data_type.find('(')?;
    let end = data_type[start..].find(')')? + start;
    data_type[start + 1..end].trim().parse::<u32>().ok()
}

/// A filtered column value ready to be bound into an INSERT or UPDATE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Target column
    pub column: String,

    /// SQL data type of the target column
    pub data_type: String,

    /// Value to bind, `None` for NULL
    pub value: Option<String>,
}

/// Raw values of one row, keyed by column name
///
/// A value the editor cannot show as text, such as binary data, is kept as a
/// placeholder and marked opaque. Opaque values are displayed but never
/// offered for editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordValues {
    values: serde_json::Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    opaque: BTreeSet<String>,
}

impl RecordValues {
    /// Raw value of a column, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Set a column value
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        self.opaque.remove(&column);
        self.values.insert(column, value);
    }

    /// Set a placeholder for a value that cannot round-trip through a form
    pub fn insert_opaque(&mut self, column: impl Into<String>, placeholder: impl Into<String>) {
        let column = column.into();
        self.values.insert(column.clone(), Value::String(placeholder.into()));
        self.opaque.insert(column);
    }

    pub fn is_opaque(&self, column: &str) -> bool {
        self.opaque.contains(column)
    }

    /// Whether the column holds NULL; missing columns are not NULL
    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.get(column), Some(Value::Null))
    }

    /// Full display text of a column; NULL and missing columns render empty
    pub fn display(&self, column: &str) -> String {
        match self.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Information about a table (for listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Table name
    pub name: String,
}
