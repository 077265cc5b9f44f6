use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{Instant, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

use oceanwatch::duration::{format_duration, parse_duration};
use oceanwatch::{LivenessEngine, Settings, StatisticsReport};

#[derive(Parser, Debug)]
#[command(name = "oceanwatch")]
#[command(about = "Infer live sensor units and aggregators from RabbitMQ metadata")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-run deadline (e.g., "15s", "2.5s"); overrides the settings file
    #[arg(short, long)]
    deadline: Option<String>,

    /// Keep re-running inference until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Delay between runs in watch mode
    #[arg(short, long, default_value = "30s")]
    interval: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,
}

fn init_logging() {
    let filter = std::env::var("OCEANWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(deadline) = &args.deadline {
        settings.engine.deadline =
            parse_duration(deadline).context("Invalid --deadline")?;
    }
    let interval = parse_duration(&args.interval).context("Invalid --interval")?;

    let engine = LivenessEngine::from_settings(&settings)?;
    let deadline = settings.engine.deadline;

    if !args.watch {
        return run_once(&engine, deadline, &args).await;
    }

    tracing::info!(
        interval = %format_duration(interval),
        deadline = %format_duration(deadline),
        "Watching broker"
    );
    run_watch(&engine, deadline, interval, &args).await
}

/// Run one inference and emit its report.
async fn run_once(engine: &LivenessEngine, deadline: Duration, args: &Args) -> Result<()> {
    let inference = engine.infer(Instant::now() + deadline).await;
    let report = StatisticsReport::from_inference(&inference);

    match &args.export {
        Some(path) => report
            .export(path, args.pretty)
            .with_context(|| format!("Failed to export report to {}", path.display())),
        None => {
            println!("{}", report.to_json(args.pretty)?);
            Ok(())
        }
    }
}

/// Re-run inference every `interval` until Ctrl-C.
async fn run_watch(
    engine: &LivenessEngine,
    deadline: Duration,
    interval: Duration,
    args: &Args,
) -> Result<()> {
    watch_until(interval, tokio::signal::ctrl_c(), move || async move {
        if let Err(e) = run_once(engine, deadline, args).await {
            tracing::warn!(error = %e, "Failed to emit report");
        }
    })
    .await;

    tracing::info!("Interrupted, stopping");
    Ok(())
}

/// Call `run` every `interval` until `shutdown` resolves, including while a
/// run is in progress.
async fn watch_until<S, F, Fut>(interval: Duration, shutdown: S, mut run: F)
where
    S: Future,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => return,
        }

        tokio::select! {
            _ = run() => {}
            _ = &mut shutdown => return,
        }
    }
}
