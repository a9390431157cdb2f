//! Dry run: render the statements of a plan.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use relgraph_core::{Edge, EdgeKind};
use relgraph_graph::query::{self, Statement};
use std::path::PathBuf;

use crate::migration::MigrationPlan;
use crate::output;

#[derive(Args)]
pub struct PlanArgs {
    /// Migration plan file (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// Render incremental edge statements
    #[arg(long)]
    pub cdc: bool,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let plan = MigrationPlan::load(&args.plan)?;
    if plan.is_empty() {
        println!("{}", "Plan is empty.".dimmed());
        return Ok(());
    }

    if !plan.vertices.is_empty() {
        println!("{}", "Vertices".bold());
        for entry in &plan.vertices {
            let vertex = &entry.vertex;
            let heading = format!("{} ({} rows)", vertex.label, entry.rows.len());
            match vertex.validate() {
                Ok(()) => output::print_statements(&heading, &[query::vertex_create(vertex)]),
                Err(e) => output::print_invalid(&heading, &e),
            }
        }
    }

    if !plan.edges.is_empty() {
        println!("\n{}", "Edges".bold());
        for entry in &plan.edges {
            let edge = &entry.edge;
            let heading = format!("{} [{}]", edge.label, edge.kind);
            match edge.validate() {
                Ok(()) => output::print_statements(&heading, &edge_statements(edge, args.cdc)),
                Err(e) => output::print_invalid(&heading, &e),
            }
        }
    }

    if !plan.cdc_objects.is_empty() {
        println!("\n{}", "CDC objects".bold());
        for object in &plan.cdc_objects {
            let heading = format!("{} via {} ({} rows)", object.vertex, object.edge, object.rows.len());
            // References were checked when the plan was loaded.
            if let Some(edge) = plan.edge(&object.edge) {
                output::print_statements(&heading, &edge_statements(edge, true));
            }
        }
    }

    Ok(())
}

/// Statements an edge import runs, in execution order.
fn edge_statements(edge: &Edge, cdc: bool) -> Vec<Option<Statement>> {
    match edge.kind {
        EdgeKind::JoinTable => vec![query::join_edge_create(edge)],
        _ => (0..edge.fk_mappings.len())
            .map(|i| {
                if cdc {
                    query::cdc_edge_create(edge, i)
                } else {
                    query::edge_create(edge, i)
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::FkMapping;

    #[test]
    fn test_edge_statements_per_mapping() {
        let edge = Edge::new(
            "Order",
            "Person",
            "PLACED_BY",
            EdgeKind::Simple,
            vec![
                FkMapping::new("buyer_id", "id"),
                FkMapping::new("seller_id", "id"),
            ],
        );
        let full = edge_statements(&edge, false);
        assert_eq!(full.len(), 2);
        assert!(full.iter().flatten().all(|s| s.slots.is_empty()));

        let cdc = edge_statements(&edge, true);
        assert!(cdc.iter().flatten().all(|s| s.placeholder_count() == 1));
    }

    #[test]
    fn test_join_edge_single_statement() {
        let edge = Edge::new(
            "Student",
            "Course",
            "ENROLLED_IN",
            EdgeKind::JoinTable,
            vec![
                FkMapping::new("student_id", "id"),
                FkMapping::new("course_id", "id"),
            ],
        );
        let statements = edge_statements(&edge, true);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].as_ref().unwrap().placeholder_count(), 2);
    }
}
