//! `research-core`: a minimal command-line surface over the orchestration
//! core, standing in for the out-of-scope HTTP API (`spec.md` §1). Grounded
//! on `forge`'s and `agent-agency`'s `clap::Parser`-based CLIs.

mod app;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use research_contracts::{Bag, CoreConfig, ResearchRunId};
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "research-core")]
#[command(about = "Fan out to discovery services, score and propose integrations, queue findings for review")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a research run for `topic` and execute it to completion.
    Run {
        topic: String,
        #[arg(long, default_value = "cli")]
        created_by: String,
    },
    /// Print a run's current status and counters.
    Status { run_id: String },
    /// Print a run's full audit timeline and summary report.
    Timeline { run_id: String },
    /// Print per-run metrics, or aggregate metrics across every run.
    Metrics {
        run_id: Option<String>,
        #[arg(long)]
        aggregate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let app = App::new(CoreConfig::from_env());

    match cli.command {
        Command::Run { topic, created_by } => run_command(&app, &topic, &created_by).await,
        Command::Status { run_id } => status_command(&app, &run_id).await,
        Command::Timeline { run_id } => timeline_command(&app, &run_id).await,
        Command::Metrics { run_id, aggregate } => metrics_command(&app, run_id, aggregate).await,
    }
}

fn parse_run_id(raw: &str) -> Result<ResearchRunId> {
    ResearchRunId::from_str(raw).with_context(|| format!("'{raw}' is not a valid research run id"))
}

async fn run_command(app: &App, topic: &str, created_by: &str) -> Result<()> {
    let run_id = app.orchestrator.create(topic, created_by, Bag::new()).await?;
    println!("created run {run_id}");

    let finished = app.orchestrator.execute(run_id).await?;
    println!("status: {:?}", finished.status);
    println!(
        "discovered={} assessed={} approved={}",
        finished.counters.sources_discovered, finished.counters.sources_assessed, finished.counters.sources_approved
    );
    if let Some(error) = &finished.error_details {
        println!("error: {error}");
    }
    Ok(())
}

async fn status_command(app: &App, run_id: &str) -> Result<()> {
    let run_id = parse_run_id(run_id)?;
    let run = app.orchestrator.get(run_id).await?;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}

async fn timeline_command(app: &App, run_id: &str) -> Result<()> {
    let run_id = parse_run_id(run_id)?;
    let timeline = app.audit.timeline(run_id).await?;
    for event in &timeline {
        println!(
            "{} [{:?}] {:?} {}",
            event.timestamp.to_rfc3339(),
            event.level,
            event.event_type,
            serde_json::to_string(&event.payload)?
        );
    }

    let report = app.audit.report(run_id).await?;
    println!(
        "\n{} events, error_rate={:.3}, warning_rate={:.3}",
        report.total_events, report.error_rate, report.warning_rate
    );
    Ok(())
}

async fn metrics_command(app: &App, run_id: Option<String>, aggregate: bool) -> Result<()> {
    if aggregate || run_id.is_none() {
        let metrics = app.metrics.aggregate(None).await?;
        println!("total_runs={}", metrics.total_runs);
        println!("success_rate={:.3}", metrics.success_rate);
        println!("quality: avg={:.3} min={:.3} max={:.3}", metrics.quality.avg, metrics.quality.min, metrics.quality.max);
        println!(
            "trend: success_rate_slope={:.4} avg_duration_slope={:.4}",
            metrics.trend.success_rate_slope, metrics.trend.avg_duration_slope
        );
        return Ok(());
    }

    let run_id = parse_run_id(&run_id.unwrap())?;
    let metrics = app.metrics.run(run_id).await?;
    println!("total_events={} error_rate={:.3}", metrics.total_events, metrics.error_rate);
    for (phase, duration) in &metrics.phase_durations {
        println!("phase {phase}: {}ms", duration.num_milliseconds());
    }
    for (field, total) in &metrics.throughput {
        println!("throughput {field}: {total}");
    }
    Ok(())
}
