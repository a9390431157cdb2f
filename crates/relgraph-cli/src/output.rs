//! Terminal output formatting.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use colored::Colorize;
use relgraph_graph::{ImportEvent, Statement};

/// Print the statements rendered for one definition.
pub fn print_statements(heading: &str, statements: &[Option<Statement>]) {
    println!("  {}", heading.cyan());
    for stmt in statements {
        match stmt {
            Some(stmt) => println!("    {}", stmt.text),
            None => println!("    {}", "no statement (no eligible column)".yellow()),
        }
    }
}

pub fn print_invalid(heading: &str, error: &impl Display) {
    println!("  {} {}", heading.cyan(), error.to_string().red());
}

/// Event totals of one run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Committed elements per target.
    pub imported: BTreeMap<String, usize>,
    pub skipped_records: usize,
    pub rolled_back: usize,
    pub mismatches: usize,
    pub failed_imports: usize,
    /// One line per failure, in arrival order.
    pub failures: Vec<String>,
}

impl Summary {
    pub fn from_events(events: &[ImportEvent]) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                ImportEvent::Imported { target, count } => {
                    *summary.imported.entry(target.to_string()).or_default() += count;
                }
                ImportEvent::RecordFailed { error, .. } => {
                    summary.skipped_records += 1;
                    summary.failures.push(format!("skipped: {error}"));
                }
                ImportEvent::RolledBack {
                    target, lost, error, ..
                } => {
                    summary.rolled_back += lost;
                    summary
                        .failures
                        .push(format!("{target}: rolled back {lost} ({error})"));
                }
                ImportEvent::CountMismatch {
                    target,
                    attempted,
                    affected,
                } => {
                    summary.mismatches += 1;
                    summary
                        .failures
                        .push(format!("{target}: {affected} of {attempted} written"));
                }
                ImportEvent::ImportFailed {
                    target,
                    attempted,
                    error,
                } => {
                    summary.failed_imports += 1;
                    summary
                        .failures
                        .push(format!("{target}: failed with {attempted} attempted ({error})"));
                }
            }
        }
        summary
    }
}

pub fn print_summary(summary: &Summary, elapsed: Duration) {
    println!(
        "\n{} {}",
        "Import finished".green().bold(),
        format!("in {:.1}s", elapsed.as_secs_f64()).dimmed()
    );
    println!("{}", "─".repeat(50));

    if summary.imported.is_empty() {
        println!("  {}", "Nothing imported.".dimmed());
    }
    for (target, count) in &summary.imported {
        println!("  {:<40} {}", target, count.to_string().cyan());
    }

    if !summary.failures.is_empty() {
        println!("\n{} ({}):", "Problems".bold(), summary.failures.len());
        for line in &summary.failures {
            println!("  {} {}", "•".dimmed(), line.yellow());
        }
    }
    println!("{}", "─".repeat(50));
}
