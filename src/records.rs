//! Sources of already-scraped records.
//!
//! Scrapers dump what they collect to CSV or JSON; a [`RecordSource`] loads
//! those dumps into [`Record`]s so the matcher never depends on how the text
//! was obtained.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum RecordSourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of objects, found {0}")]
    UnexpectedJson(String),

    #[error("unsupported record file '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

/// One scraped item: ordered column/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// The column as text. Only string values count; null, numbers and
    /// missing columns give `None`.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    /// Cell text for tabular output.
    pub fn display(&self, column: &str) -> String {
        match self.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

/// Anything that yields scraped records.
pub trait RecordSource {
    fn name(&self) -> &str;
    fn load(&self) -> Result<Vec<Record>, RecordSourceError>;
}

/// Records from a CSV file with a header row.
pub struct CsvRecordSource {
    path: PathBuf,
    name: String,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl RecordSource for CsvRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Record>, RecordSourceError> {
        let now = Instant::now();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut records = vec![];
        for row in reader.records() {
            let row = row?;
            let mut record = Record::new();
            // short rows leave trailing columns missing
            for (column, cell) in headers.iter().zip(row.iter()) {
                record.insert(column, cell);
            }
            records.push(record);
        }

        log::debug!(
            "took {}ms to read {} records from {}",
            now.elapsed().as_micros() as f64 / 1000.0,
            records.len(),
            self.name
        );

        Ok(records)
    }
}

/// Records from a JSON array of objects.
pub struct JsonRecordSource {
    path: PathBuf,
    name: String,
}

impl JsonRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn parse(data: &str) -> Result<Vec<Record>, RecordSourceError> {
        let value: Value = serde_json::from_str(data)?;
        let items = match value {
            Value::Array(items) => items,
            other => return Err(RecordSourceError::UnexpectedJson(json_kind(&other).into())),
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(Record::from(map)),
                other => Err(RecordSourceError::UnexpectedJson(format!(
                    "array containing {}",
                    json_kind(&other)
                ))),
            })
            .collect()
    }
}

impl RecordSource for JsonRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Record>, RecordSourceError> {
        let data = std::fs::read_to_string(&self.path)?;
        let records = Self::parse(&data)?;
        log::debug!("read {} records from {}", records.len(), self.name);
        Ok(records)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pick a source from the file extension.
pub fn source_for_path(path: &Path) -> Result<Box<dyn RecordSource>, RecordSourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvRecordSource::new(path))),
        Some("json") => Ok(Box::new(JsonRecordSource::new(path))),
        _ => Err(RecordSourceError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_text_only_for_strings() {
        let record = Record::new()
            .with("Post", "hello")
            .with("Likes", 42)
            .with("Reply Text", Value::Null);

        assert_eq!(record.text("Post"), Some("hello"));
        assert_eq!(record.text("Likes"), None);
        assert_eq!(record.text("Reply Text"), None);
        assert_eq!(record.text("Missing"), None);
        assert!(record.contains("Reply Text"));
        assert!(!record.contains("Missing"));
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = Record::new().with("a", "1").with("b", "2");
        record.insert("a", "3");

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.text("a"), Some("3"));
    }

    #[test]
    fn test_record_display() {
        let record = Record::new()
            .with("s", "text")
            .with("n", 1.5)
            .with("null", Value::Null)
            .with("b", true);

        assert_eq!(record.display("s"), "text");
        assert_eq!(record.display("n"), "1.5");
        assert_eq!(record.display("null"), "");
        assert_eq!(record.display("b"), "true");
        assert_eq!(record.display("missing"), "");
    }

    #[test]
    fn test_csv_source_reads_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("posts.csv");
        std::fs::write(
            &path,
            "Profile Handle,DocURL,Post\n@a,https://x.com/1,\"Hello, builders\"\n@b,https://x.com/2\n",
        )
        .unwrap();

        let records = CsvRecordSource::new(&path).load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Post"), Some("Hello, builders"));
        assert_eq!(records[0].text("Profile Handle"), Some("@a"));
        assert!(!records[1].contains("Post"));
    }

    #[test]
    fn test_json_source_preserves_values() {
        let records = JsonRecordSource::parse(
            r#"[{"Comment Text": "Great post", "Profile Link": "https://l.in/a"},
                {"Comment Text": null},
                {"Profile Link": "https://l.in/c"}]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].text("Comment Text"), Some("Great post"));
        assert!(records[1].contains("Comment Text"));
        assert_eq!(records[1].text("Comment Text"), None);
        assert!(!records[2].contains("Comment Text"));
    }

    #[test]
    fn test_json_source_rejects_non_array() {
        let result = JsonRecordSource::parse(r#"{"Post": "x"}"#);
        assert!(matches!(result, Err(RecordSourceError::UnexpectedJson(_))));

        let result = JsonRecordSource::parse(r#"["x"]"#);
        assert!(matches!(result, Err(RecordSourceError::UnexpectedJson(_))));
    }

    #[test]
    fn test_source_for_path() {
        assert_eq!(
            source_for_path(Path::new("a/posts.CSV")).unwrap().name(),
            "a/posts.CSV"
        );
        assert!(source_for_path(Path::new("posts.json")).is_ok());
        assert!(matches!(
            source_for_path(Path::new("posts.xlsx")),
            Err(RecordSourceError::UnsupportedFormat(_))
        ));
    }
}
