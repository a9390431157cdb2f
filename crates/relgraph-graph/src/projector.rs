//! Source-to-target record projection.

use relgraph_core::{Record, Vertex};

/// Build the target record for a vertex: the source pairs whose column is
/// selected on the vertex, in source order. Everything else is dropped.
pub fn project_record(vertex: &Vertex, source: &Record) -> Record {
    let mut target = Record::new();
    for cv in &source.values {
        if vertex.is_selected(&cv.column.name) {
            target.push(cv.clone());
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::{Column, Value};

    #[test]
    fn test_keeps_selected_columns_in_source_order() {
        let vertex = Vertex::new(
            "Item",
            "items",
            vec![Column::new("c"), Column::new("b").unselected(), Column::new("a")],
        );
        let source = Record::from_pairs([
            (Column::new("a"), Value::Int(1)),
            (Column::new("b"), Value::Int(2)),
            (Column::new("c"), Value::Int(3)),
        ]);

        let target = project_record(&vertex, &source);
        let names: Vec<_> = target.column_names().collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(target.get("a"), Some(&Value::Int(1)));
        assert_eq!(target.get("c"), Some(&Value::Int(3)));
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_unmapped_columns_dropped() {
        let vertex = Vertex::new("Item", "items", vec![Column::new("id")]);
        let source = Record::from_pairs([
            (Column::new("legacy"), Value::from("x")),
            (Column::new("ID"), Value::Int(9)),
        ]);
        let target = project_record(&vertex, &source);
        assert_eq!(target.len(), 1);
        assert_eq!(target.get("id"), Some(&Value::Int(9)));
    }
}
