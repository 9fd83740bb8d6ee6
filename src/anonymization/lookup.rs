//! Lookup table generation
//!
//! A lookup table maps original values to their anonymized replacements, one
//! record per non-null original cell of every anonymized field. It is as
//! sensitive as the raw data it maps: records are zeroized on drop, `Debug`
//! never prints values, and files are written owner-readable only on Unix.

use crate::domain::{cell_text, Dataset, Result, VeilError};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One original-to-anonymized mapping
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct LookupRecord {
    /// Unique-identifier value of the row, as written to the anonymized dataset
    pub unique_identifier_value: Option<String>,
    /// Column the value came from
    pub field_name: String,
    /// Value before anonymization
    pub original_value: String,
    /// Value after anonymization
    pub anonymized_value: String,
}

impl LookupRecord {
    /// Record for one cell; `None` when the original is null
    pub fn for_cell(
        unique_identifier_value: Option<&str>,
        field_name: &str,
        original: &Value,
        anonymized: &Value,
    ) -> Option<Self> {
        let original_value = cell_text(original)?;
        Some(Self {
            unique_identifier_value: unique_identifier_value.map(str::to_string),
            field_name: field_name.to_string(),
            original_value,
            anonymized_value: cell_text(anonymized).unwrap_or_default(),
        })
    }
}

impl fmt::Debug for LookupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupRecord")
            .field("field_name", &self.field_name)
            .field("unique_identifier_value", &"[REDACTED]")
            .field("original_value", &"[REDACTED]")
            .field("anonymized_value", &"[REDACTED]")
            .finish()
    }
}

/// Field whose record count disagrees with its non-null cell count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessMismatch {
    /// Field name
    pub field: String,
    /// Non-null values in the source dataset
    pub expected: usize,
    /// Records in the table
    pub actual: usize,
}

/// Complete lookup table for one commit
#[derive(Clone)]
pub struct LookupTable {
    file_name: PathBuf,
    unique_identifier_column: String,
    fields: Vec<String>,
    records: Vec<LookupRecord>,
}

impl LookupTable {
    /// File name the table should be persisted under
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Unique-identifier column used as join key
    pub fn unique_identifier_column(&self) -> &str {
        &self.unique_identifier_column
    }

    /// Anonymized fields covered by the table
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// All records, in row order
    pub fn records(&self) -> &[LookupRecord] {
        &self.records
    }

    /// Records for one field
    pub fn records_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a LookupRecord> + 'a {
        self.records.iter().filter(move |r| r.field_name == field)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record count per field, including fields with no records
    pub fn counts_by_field(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            self.fields.iter().map(|f| (f.clone(), 0)).collect();
        for record in &self.records {
            *counts.entry(record.field_name.clone()).or_default() += 1;
        }
        counts
    }

    /// Checks one record per non-null source value for every covered field
    pub fn verify_completeness(
        &self,
        source: &Dataset,
    ) -> std::result::Result<(), Vec<CompletenessMismatch>> {
        let counts = self.counts_by_field();
        let mismatches: Vec<CompletenessMismatch> = self
            .fields
            .iter()
            .filter_map(|field| {
                let expected = source.non_null_count(field);
                let actual = counts.get(field).copied().unwrap_or(0);
                (expected != actual).then(|| CompletenessMismatch {
                    field: field.clone(),
                    expected,
                    actual,
                })
            })
            .collect();
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(mismatches)
        }
    }

    /// Delimited form with header
    /// `original_value,anonymized_value,field_name,<unique identifier column>`
    pub fn to_csv(&self) -> Result<String> {
        let bytes = self.csv_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            VeilError::Serialization("lookup table is not valid UTF-8".to_string())
        })
    }

    fn csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());
        writer
            .write_record([
                "original_value",
                "anonymized_value",
                "field_name",
                self.unique_identifier_column.as_str(),
            ])
            .map_err(csv_error)?;
        for r in &self.records {
            writer
                .write_record([
                    r.original_value.as_str(),
                    r.anonymized_value.as_str(),
                    r.field_name.as_str(),
                    r.unique_identifier_value.as_deref().unwrap_or(""),
                ])
                .map_err(csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|e| VeilError::Io(format!("Failed to flush lookup table: {}", e.error())))
    }

    /// Writes the CSV form to `path`
    ///
    /// On Unix the file is created owner-only, and an existing file is
    /// restricted before any record is written to it.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let io_error = |e: std::io::Error| {
            VeilError::Io(format!("Failed to write lookup table {}: {}", path.display(), e))
        };

        let mut file = open_private(path).map_err(io_error)?;
        let mut bytes = self.csv_bytes()?;
        let written = file.write_all(&bytes).and_then(|()| file.sync_all());
        bytes.zeroize();
        written.map_err(io_error)?;

        tracing::info!(
            path = %path.display(),
            records = self.records.len(),
            "Lookup table written"
        );
        Ok(())
    }

    /// Writes the CSV form into `dir` under [`file_name`](Self::file_name)
    ///
    /// # Errors
    ///
    /// Fails when the file name is not a plain file name, so the table can
    /// never land outside `dir`.
    pub fn write_into(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.path_in(dir)?;
        self.write_to(&path)?;
        Ok(path)
    }

    /// Where [`write_into`](Self::write_into) would put the table
    pub fn path_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        if !is_plain_file_name(&self.file_name) {
            return Err(VeilError::Io(format!(
                "Lookup file name '{}' must not contain directories",
                self.file_name.display()
            )));
        }
        Ok(dir.as_ref().join(&self.file_name))
    }
}

/// Whether `name` is a single normal path component (no `/`, `..` or root)
pub fn is_plain_file_name(name: impl AsRef<Path>) -> bool {
    let mut components = name.as_ref().components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn csv_error(e: csv::Error) -> VeilError {
    VeilError::Io(format!("Failed to encode lookup table: {e}"))
}

impl fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupTable")
            .field("file_name", &self.file_name)
            .field("unique_identifier_column", &self.unique_identifier_column)
            .field("fields", &self.fields)
            .field("records", &self.records.len())
            .finish()
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Accumulates lookup records during one commit
///
/// A disabled generator drops everything it is given, so callers can feed it
/// unconditionally.
pub struct LookupGenerator {
    enabled: bool,
    records: Vec<LookupRecord>,
}

impl LookupGenerator {
    /// Generator that keeps records only when `enabled`
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: Vec::new(),
        }
    }

    /// Whether records are being kept
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records one transformed cell; null originals are skipped
    pub fn record(
        &mut self,
        unique_identifier_value: Option<&str>,
        field_name: &str,
        original: &Value,
        anonymized: &Value,
    ) {
        if !self.enabled {
            return;
        }
        if let Some(record) =
            LookupRecord::for_cell(unique_identifier_value, field_name, original, anonymized)
        {
            self.records.push(record);
        }
    }

    /// Appends records produced elsewhere, e.g. by a worker shard
    pub fn extend(&mut self, records: impl IntoIterator<Item = LookupRecord>) {
        if self.enabled {
            self.records.extend(records);
        }
    }

    /// Records held so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record; each is zeroized
    pub fn discard(&mut self) {
        self.records.clear();
    }

    /// Finishes the table, or `None` when disabled
    pub fn finish(
        self,
        file_name: PathBuf,
        unique_identifier_column: &str,
        fields: Vec<String>,
    ) -> Option<LookupTable> {
        self.enabled.then(|| LookupTable {
            file_name,
            unique_identifier_column: unique_identifier_column.to_string(),
            fields,
            records: self.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnType};
    use serde_json::json;
    use tempfile::TempDir;
    use test_case::test_case;

    fn table() -> LookupTable {
        let mut generator = LookupGenerator::new(true);
        generator.record(Some("1"), "email", &json!("a@x.com"), &json!("b@y.com"));
        generator.record(Some("2"), "email", &Value::Null, &Value::Null);
        generator.record(Some("3"), "note", &json!("say \"hi\", ok"), &json!("[REMOVED]"));
        generator
            .finish(
                PathBuf::from("lookup.csv"),
                "id",
                vec!["email".to_string(), "note".to_string()],
            )
            .unwrap()
    }

    #[test]
    fn test_null_originals_skipped() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records_for("email").count(), 1);
    }

    #[test]
    fn test_disabled_generator() {
        let mut generator = LookupGenerator::new(false);
        generator.record(Some("1"), "email", &json!("a@x.com"), &json!("x"));
        assert!(generator.is_empty());
        assert!(generator
            .finish(PathBuf::from("x.csv"), "id", vec![])
            .is_none());
    }

    #[test]
    fn test_csv_quoting() {
        let csv = table().to_csv().unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "original_value,anonymized_value,field_name,id");
        assert_eq!(lines[1], "a@x.com,b@y.com,email,1");
        assert_eq!(lines[2], "\"say \"\"hi\"\", ok\",[REMOVED],note,3");
    }

    #[test]
    fn test_debug_hides_values() {
        let table = table();
        let debug = format!("{table:?} {:?}", table.records()[0]);
        assert!(!debug.contains("a@x.com"));
        assert!(debug.contains("records: 2"));
    }

    #[test]
    fn test_verify_completeness() {
        let source = Dataset::new(
            vec![
                Column::new("id", ColumnType::Identifier),
                Column::new("email", ColumnType::Email),
                Column::new("note", ColumnType::Text),
            ],
            vec![
                json!({"id": 1, "email": "a@x.com", "note": null}).as_object().cloned().unwrap(),
                json!({"id": 2, "email": null, "note": null}).as_object().cloned().unwrap(),
                json!({"id": 3, "email": null, "note": "say \"hi\", ok"}).as_object().cloned().unwrap(),
            ],
        )
        .unwrap();
        assert!(table().verify_completeness(&source).is_ok());

        let mut generator = LookupGenerator::new(true);
        generator.record(Some("1"), "email", &json!("a@x.com"), &json!("b"));
        let partial = generator
            .finish(PathBuf::from("x.csv"), "id", vec!["email".into(), "note".into()])
            .unwrap();
        let mismatches = partial.verify_completeness(&source).unwrap_err();
        assert_eq!(
            mismatches,
            vec![CompletenessMismatch {
                field: "note".to_string(),
                expected: 1,
                actual: 0
            }]
        );
    }

    #[test]
    fn test_write_into_dir() {
        let dir = TempDir::new().unwrap();
        let path = table().write_into(dir.path().join("out")).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("original_value,"));
        assert!(path.ends_with("lookup.csv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_lookup_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();

        let fresh = dir.path().join("fresh.csv");
        table().write_to(&fresh).unwrap();
        let mode = std::fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let existing = dir.path().join("existing.csv");
        std::fs::write(&existing, "stale").unwrap();
        std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();
        table().write_to(&existing).unwrap();
        let mode = std::fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(std::fs::read_to_string(&existing)
            .unwrap()
            .starts_with("original_value,"));
    }

    #[test]
    fn test_file_name_cannot_leave_directory() {
        let dir = TempDir::new().unwrap();
        for name in ["../escape.csv", "/tmp/escape.csv", "nested/lookup.csv", ".."] {
            let mut generator = LookupGenerator::new(true);
            generator.record(Some("1"), "email", &json!("a@x.com"), &json!("b"));
            let table = generator
                .finish(PathBuf::from(name), "id", vec!["email".to_string()])
                .unwrap();
            assert!(table.write_into(dir.path()).is_err(), "accepted {name}");
        }
        assert!(!dir.path().parent().unwrap().join("escape.csv").exists());
    }

    #[test_case("lookup.csv", true ; "plain")]
    #[test_case("../lookup.csv", false ; "parent")]
    #[test_case("/etc/lookup.csv", false ; "absolute")]
    #[test_case("a/b.csv", false ; "nested")]
    #[test_case("", false ; "empty")]
    fn test_is_plain_file_name(name: &str, expected: bool) {
        assert_eq!(is_plain_file_name(name), expected);
    }
}
