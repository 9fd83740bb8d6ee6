//! Tabular dataset model
//!
//! A [`Dataset`] is an already-parsed table: an ordered list of [`Column`]s and
//! a sequence of rows, each row a map from column name to JSON value. The engine
//! never parses source files itself; the JSON document form handled here exists
//! so the CLI can exchange datasets with the ingestion side.
//!
//! ```json
//! {
//!   "columns": [{"name": "id", "type": "identifier"}, {"name": "email", "type": "email"}],
//!   "rows": [{"id": 1, "email": "jane@example.com"}]
//! }
//! ```

use super::errors::VeilError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// One dataset row
pub type Row = serde_json::Map<String, Value>;

/// Declared semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free text
    #[default]
    Text,
    /// Integer or decimal numbers
    Numeric,
    /// Calendar dates or timestamps
    Date,
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Personal names
    Name,
    /// Postal addresses
    Address,
    /// Record identifiers
    Identifier,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Name => "name",
            Self::Address => "address",
            Self::Identifier => "identifier",
        };
        write!(f, "{s}")
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within the dataset
    pub name: String,

    /// Declared semantic type
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,

    /// Whether the column may hold nulls
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Creates a nullable column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    /// Marks the column as non-nullable
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// In-memory tabular dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset, rejecting duplicate column names
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(VeilError::Dataset("column names cannot be empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(VeilError::Dataset(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parses a dataset JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Dataset = serde_json::from_str(json)?;
        Self::new(raw.columns, raw.rows)
    }

    /// Reads a dataset JSON document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VeilError::Io(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Serializes the dataset as a pretty-printed JSON document
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ordered column list
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row sequence
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Count of non-null values in a column (missing keys count as null)
    pub fn non_null_count(&self, column: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(column).map_or(false, |v| !v.is_null()))
            .count()
    }

    /// Consumes the dataset, returning its parts
    pub fn into_parts(self) -> (Vec<Column>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// Textual form of a cell, `None` for null
///
/// Strings are returned verbatim, numbers and booleans in their JSON form,
/// nested values as compact JSON.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
