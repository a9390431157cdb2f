//! Column descriptors.

use serde::{Deserialize, Serialize};

/// Graph-side type tag of a column.
///
/// Only dates and datetimes change how a statement is rendered: their values
/// travel as ISO-8601 strings and are converted inside the query by the
/// matching constructor function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GraphDataType {
    Date,
    DateTime,
    Scalar(String),
}

impl GraphDataType {
    /// Parse from a type tag (case-insensitive for the temporal tags).
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            _ => Self::Scalar(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Scalar(tag) => tag.as_str(),
        }
    }

    /// Wrap a placeholder in the constructor function for this type, if any.
    pub fn wrap_placeholder(&self, placeholder: &str) -> String {
        match self {
            Self::Date => format!("date({placeholder})"),
            Self::DateTime => format!("datetime({placeholder})"),
            Self::Scalar(_) => placeholder.to_string(),
        }
    }
}

impl Default for GraphDataType {
    fn default() -> Self {
        Self::Scalar("string".to_string())
    }
}

impl From<String> for GraphDataType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<GraphDataType> for String {
    fn from(t: GraphDataType) -> Self {
        t.as_str().to_string()
    }
}

/// A relational column as seen by the graph target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Participates in the migration.
    #[serde(default = "default_true")]
    pub selected: bool,
    /// The relational type has a known graph property mapping.
    #[serde(default = "default_true")]
    pub graph_type_supported: bool,
    #[serde(default)]
    pub graph_data_type: GraphDataType,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// A selected, supported column with a generic scalar type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selected: true,
            graph_type_supported: true,
            graph_data_type: GraphDataType::default(),
        }
    }

    pub fn with_type(mut self, data_type: GraphDataType) -> Self {
        self.graph_data_type = data_type;
        self
    }

    pub fn unselected(mut self) -> Self {
        self.selected = false;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.graph_type_supported = false;
        self
    }

    /// Both selected and mapped to a graph property type.
    pub fn is_eligible(&self) -> bool {
        self.selected && self.graph_type_supported
    }

    /// Name as a property key: double quotes from quoted identifiers removed.
    pub fn property_name(&self) -> String {
        self.name.replace('"', "")
    }

    /// Case-insensitive name comparison, ignoring identifier quoting.
    pub fn matches(&self, name: &str) -> bool {
        self.property_name().eq_ignore_ascii_case(&name.replace('"', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(GraphDataType::from_tag("DATE"), GraphDataType::Date);
        assert_eq!(GraphDataType::from_tag("datetime"), GraphDataType::DateTime);
        assert_eq!(
            GraphDataType::from_tag("integer"),
            GraphDataType::Scalar("integer".to_string())
        );
    }

    #[test]
    fn test_wrap_placeholder() {
        assert_eq!(GraphDataType::Date.wrap_placeholder("$0"), "date($0)");
        assert_eq!(GraphDataType::DateTime.wrap_placeholder("$3"), "datetime($3)");
        assert_eq!(GraphDataType::default().wrap_placeholder("$1"), "$1");
    }

    #[test]
    fn test_quoted_names() {
        let col = Column::new("\"Order\"");
        assert_eq!(col.property_name(), "Order");
        assert!(col.matches("order"));
        assert!(col.matches("\"ORDER\""));
    }

    #[test]
    fn test_deserialize_defaults() {
        let col: Column = serde_json::from_str(r#"{"name": "born", "graph_data_type": "date"}"#).unwrap();
        assert!(col.is_eligible());
        assert_eq!(col.graph_data_type, GraphDataType::Date);
    }
}
