//! Cypher statement builders for the four write shapes.
//!
//! Placeholders are numbered Cypher parameters (`$0`, `$1`, ...) in emission
//! order. Every builder records, per placeholder, the record column whose
//! value fills it; the binder walks that list so the two stay in lock-step.
//!
//! ```cypher
//! CREATE (n:Person {id:$0, born:date($1)}) RETURN n
//! MATCH (n:Order), (m:Customer) WHERE n.customer_id = m.id CREATE (n)-[r:PLACED_BY]->(m) RETURN count(r)
//! ```

use relgraph_core::{Column, Edge, EdgeKind, Vertex};

/// Column name of the aggregate every edge statement returns.
pub const COUNT_COLUMN: &str = "count(r)";

/// Statement text plus the record column behind each placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub slots: Vec<String>,
}

impl Statement {
    fn new() -> Self {
        Self {
            text: String::new(),
            slots: Vec::new(),
        }
    }

    /// Emit the next placeholder for `column` and return its text.
    fn placeholder(&mut self, column: &str) -> String {
        let p = format!("${}", self.slots.len());
        self.slots.push(column.to_string());
        p
    }

    /// Number of placeholders found by scanning the rendered text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.text)
    }
}

/// Count `$<digits>` parameters in statement text.
pub fn count_placeholders(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
            count += 1;
            i += 1;
            while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    count
}

/// Render `{name:$i, ...}` for the given columns.
fn property_map<'a>(stmt: &mut Statement, columns: impl Iterator<Item = &'a Column>) -> String {
    let mut props = Vec::new();
    for col in columns {
        let name = col.property_name();
        let p = stmt.placeholder(&col.name);
        props.push(format!("{}:{}", name, col.graph_data_type.wrap_placeholder(&p)));
    }
    format!("{{{}}}", props.join(", "))
}

/// `CREATE (n:<label> {...}) RETURN n` over the selected, supported columns.
///
/// Returns `None` when no column qualifies.
pub fn vertex_create(vertex: &Vertex) -> Option<Statement> {
    if vertex.eligible_columns().next().is_none() {
        return None;
    }
    let mut stmt = Statement::new();
    let props = property_map(&mut stmt, vertex.eligible_columns());
    stmt.text = format!("CREATE (n:{} {}) RETURN n", vertex.label, props);
    Some(stmt)
}

/// Relationship pattern for the edge direction.
fn create_clause(edge: &Edge, label: &str, props: &str) -> String {
    match edge.kind {
        EdgeKind::TwoWay => format!("CREATE (m)-[r:{label}{props}]->(n) RETURN {COUNT_COLUMN}"),
        EdgeKind::Simple | EdgeKind::JoinTable => {
            format!("CREATE (n)-[r:{label}{props}]->(m) RETURN {COUNT_COLUMN}")
        }
    }
}

fn match_clause(edge: &Edge) -> String {
    format!("MATCH (n:{}), (m:{})", edge.start_label, edge.end_label)
}

/// Relationship for the FK mapping at `index`, matched on stored properties.
pub fn edge_create(edge: &Edge, index: usize) -> Option<Statement> {
    let mapping = edge.mapping(index)?;
    let mut stmt = Statement::new();
    stmt.text = format!(
        "{} WHERE n.{} = m.{} {}",
        match_clause(edge),
        mapping.fk_column,
        mapping.ref_column,
        create_clause(edge, &edge.label, "")
    );
    Some(stmt)
}

/// Incremental variant of [`edge_create`]: the referenced side is pinned to a
/// bound value so only the newly arrived row is linked.
pub fn cdc_edge_create(edge: &Edge, index: usize) -> Option<Statement> {
    let mapping = edge.mapping(index)?;
    let mut stmt = Statement::new();
    let p = stmt.placeholder(&mapping.ref_column);
    stmt.text = format!(
        "{} WHERE n.{fk} = m.{rf} AND m.{rf} = {p} {}",
        match_clause(edge),
        create_clause(edge, &edge.label, ""),
        fk = mapping.fk_column,
        rf = mapping.ref_column,
    );
    Some(stmt)
}

/// Many-to-many relationship collapsed from a join table.
///
/// Both endpoints are pinned by placeholders bound from the join row's FK
/// columns, followed by the relationship properties. For a self-referencing
/// join the start predicate uses the second mapping's referenced column.
pub fn join_edge_create(edge: &Edge) -> Option<Statement> {
    let (first, second) = match edge.fk_mappings.as_slice() {
        [first, second, ..] => (first, second),
        _ => return None,
    };
    let start_ref = if edge.is_self_referencing() {
        &second.ref_column
    } else {
        &first.ref_column
    };

    let mut stmt = Statement::new();
    let p0 = stmt.placeholder(&first.fk_column);
    let p1 = stmt.placeholder(&second.fk_column);
    let props = if edge.columns.is_empty() {
        String::new()
    } else {
        format!(" {}", property_map(&mut stmt, edge.columns.iter()))
    };
    stmt.text = format!(
        "{} WHERE n.{} = {} AND m.{} = {} {}",
        match_clause(edge),
        start_ref,
        p0,
        second.ref_column,
        p1,
        create_clause(edge, &edge.label.replace(' ', "_"), &props)
    );
    Some(stmt)
}
