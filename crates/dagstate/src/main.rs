//! dagstate reconcile harness
//!
//! Reads a snapshot of a graph, an execution and the observed jobs, runs
//! one reconcile pass and prints the updated execution as JSON.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dagstate::{
    config::EngineConfig,
    engine::StatusEngine,
    model::{Execution, Graph, Job, Vertex},
    ResultExt, StatusResult,
};

#[derive(Parser)]
#[command(name = "dagstate-reconcile")]
#[command(version, about = "Run one status reconcile pass over an execution snapshot", long_about = None)]
struct Cli {
    /// Snapshot file (.json, .yaml or .yml)
    snapshot: PathBuf,

    /// Write the updated execution here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Everything a reconcile pass needs.
#[derive(Debug, Deserialize)]
struct Snapshot {
    graph: Vec<Vertex>,
    execution: Execution,
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    context: HashMap<String, String>,
}

/// Settings that only concern this binary, read with the same `DAGSTATE_` prefix.
///
/// - `DAGSTATE_LOG_JSON`: Emit JSON logs (default: false)
#[derive(Debug, Default, Deserialize)]
struct HarnessConfig {
    #[serde(default)]
    log_json: bool,
}

impl HarnessConfig {
    fn from_env() -> StatusResult<Self> {
        Ok(envy::prefixed("DAGSTATE_").from_env::<HarnessConfig>()?)
    }
}

/// Initialize tracing/logging.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,dagstate=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_snapshot(path: &Path) -> StatusResult<Snapshot> {
    let raw = fs::read_to_string(path)?;
    let snapshot = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
        _ => serde_json::from_str(&raw)?,
    };
    Ok(snapshot)
}

fn build_graph(vertices: Vec<Vertex>) -> StatusResult<Graph> {
    Ok(Graph::new(vertices)?)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let harness = HarnessConfig::from_env()?;
    init_tracing(harness.log_json);
    let config = EngineConfig::from_env()?;
    let cli = Cli::parse();

    let snapshot = load_snapshot(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let graph = build_graph(snapshot.graph).log("validating graph")?;
    let jobs: HashMap<String, Job> = snapshot
        .jobs
        .into_iter()
        .map(|job| (job.name.clone(), job))
        .collect();

    let engine = StatusEngine::new(config);
    let mut exec = snapshot.execution;
    let report = engine
        .reconcile(&mut exec, &graph, &jobs, &snapshot.context)
        .log(format!("reconciling {}", exec.key()))?;

    info!(
        execution = %exec.key(),
        ready = ?report.ready,
        skipped = ?report.skipped,
        finished = ?report.finished,
        completed = report.completed,
        "Reconciled"
    );

    let rendered = serde_json::to_string_pretty(&exec)?;
    match cli.output {
        Some(path) => fs::write(&path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
