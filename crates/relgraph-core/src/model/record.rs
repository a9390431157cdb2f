//! Source records.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Column;

/// A single column value extracted from the source database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convert a JSON scalar; arrays and objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

/// One (column, value) pair of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub column: Column,
    pub value: Value,
}

/// One source row, as an ordered list of column values.
///
/// Records are never mutated by the importer; projections build new ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<ColumnValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Column, V)>,
        V: Into<Value>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(column, value)| ColumnValue {
                    column,
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn push(&mut self, column_value: ColumnValue) {
        self.values.push(column_value);
    }

    /// Value for a column name (case-insensitive, quoting ignored).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|cv| cv.column.matches(name))
            .map(|cv| &cv.value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|cv| cv.column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_name() {
        let rec = Record::from_pairs([
            (Column::new("id"), Value::Int(7)),
            (Column::new("Name"), Value::from("Ada")),
        ]);
        assert_eq!(rec.get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(rec.get("ID"), Some(&Value::Int(7)));
        assert_eq!(rec.get("missing"), None);
    }

    #[test]
    fn test_temporal_display() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-02-29");
        let dt = d.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-02-29T13:05:00");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(&serde_json::json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(&serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(&serde_json::json!("x")), Value::from("x"));
    }
}
