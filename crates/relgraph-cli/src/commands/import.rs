//! Run a migration plan against Neo4j.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use futures::future::join_all;
use relgraph_graph::{
    BoltProvider, CollectingSink, EventSink, FanoutSink, GraphImporter, ImporterConfig,
    TracingSink, TransientSignatures,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::migration::{to_records, MigrationPlan};
use crate::output;

#[derive(Args)]
pub struct ImportArgs {
    /// Migration plan file (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// Importer configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Link FK edges incrementally from the plan rows
    #[arg(long)]
    pub cdc: bool,
}

pub async fn execute(args: ImportArgs) -> Result<()> {
    let plan = MigrationPlan::load(&args.plan)?;
    // The target is Neo4j, so bolt failures are the transient ones unless
    // the file says otherwise.
    let mut config =
        ImporterConfig::load_with_signatures(args.config.as_deref(), TransientSignatures::bolt())
            .context("Failed to load configuration")?;
    if args.cdc {
        config.cdc = true;
    }

    let run_id = Uuid::new_v4();
    run(plan, config)
        .instrument(info_span!("run", id = %run_id))
        .await
}

async fn run(plan: MigrationPlan, config: ImporterConfig) -> Result<()> {
    let provider = BoltProvider::connect(&config.target)
        .await
        .with_context(|| format!("Failed to connect to {}", config.target.uri))?;
    info!(uri = %config.target.uri, cdc = config.cdc, "Connected");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning pending retries");
            interrupt.cancel();
        }
    });

    let collected = Arc::new(CollectingSink::new());
    let sinks: Vec<Arc<dyn EventSink>> = vec![collected.clone(), Arc::new(TracingSink)];
    let importer = GraphImporter::new(
        provider,
        config,
        Arc::new(FanoutSink::new(sinks)),
        cancel.clone(),
    );
    let started = Instant::now();

    // Nodes first: edge statements match on node properties.
    let vertex_records: Vec<_> = plan
        .vertices
        .iter()
        .map(|v| to_records(&v.vertex.columns, &v.rows))
        .collect();
    let vertex_counts = join_all(
        plan.vertices
            .iter()
            .zip(&vertex_records)
            .map(|(v, records)| importer.import_vertex(&v.vertex, records)),
    )
    .await;

    let edge_records: Vec<_> = plan
        .edges
        .iter()
        .map(|e| to_records(&e.edge.columns, &e.rows))
        .collect();
    let edge_counts = join_all(
        plan.edges
            .iter()
            .zip(&edge_records)
            .map(|(e, records)| importer.import_edge(&e.edge, records)),
    )
    .await;

    let mut cdc_counts = Vec::with_capacity(plan.cdc_objects.len());
    for object in &plan.cdc_objects {
        let (Some(vertex), Some(edge)) = (plan.vertex(&object.vertex), plan.edge(&object.edge))
        else {
            continue;
        };
        let records = to_records(&vertex.columns, &object.rows);
        cdc_counts.push(importer.import_cdc_object(vertex, edge, &records).await);
    }

    let summary = output::Summary::from_events(&collected.take());
    output::print_summary(&summary, started.elapsed());
    println!(
        "  {} nodes, {} relationships",
        vertex_counts.iter().sum::<usize>().to_string().cyan(),
        (edge_counts.iter().sum::<usize>() + cdc_counts.iter().sum::<usize>())
            .to_string()
            .cyan()
    );

    if cancel.is_cancelled() {
        bail!("Run interrupted");
    }
    if summary.failed_imports > 0 {
        bail!("{} import(s) failed", summary.failed_imports);
    }
    Ok(())
}
