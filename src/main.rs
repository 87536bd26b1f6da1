// src/main.rs - Printer monitor entry point
use ankermake_monitor::communication::FileReplaySource;
use ankermake_monitor::config;
use ankermake_monitor::monitor::{self, Monitor, MonitorError, MonitorSettings};
use ankermake_monitor::printer::{self, PrinterEngine};
use ankermake_monitor::{filament, web};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Parser)]
#[command(name = "ankermake-monitor", version, about = "Track AnkerMake printer state from its MQTT relay")]
struct Cli {
    /// Maximum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor a printer until interrupted
    Run {
        #[arg(short, long, default_value = "printer.toml")]
        config: PathBuf,
    },
    /// Feed a recorded message trace through the engine and print the result
    Replay { trace: PathBuf },
    /// Guess the filament type of job names
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    match cli.command {
        Command::Run { config } => run(config).await,
        Command::Replay { trace } => replay(trace).await,
        Command::Classify { names } => {
            for name in names {
                println!("{}\t{}", filament::classify(&name), name);
            }
            Ok(())
        }
    }
}

async fn run(config_path: PathBuf) -> Result<(), BoxError> {
    tracing::info!("Loading configuration from: {}", config_path.display());
    let config = config::load_config(&config_path).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", config_path.display(), e);
        MonitorError::from(e)
    })?;

    tracing::info!("Monitoring printer: {}", config.printer.name);

    let engine = printer::shared(PrinterEngine::with_heartbeat_timeout(Duration::from_secs(
        config.monitor.heartbeat_timeout_secs,
    )));

    let mut supervisor = Monitor::new(
        engine.clone(),
        monitor::source_from_config(&config.source)?,
        MonitorSettings::from(&config.monitor),
    );
    if let Some(status_source) = monitor::status_source_from_config(&config) {
        supervisor = supervisor.with_status_source(status_source);
    }
    let shutdown_tx = supervisor.shutdown_handle();
    let monitor_task = tokio::spawn(supervisor.run());

    if config.web.enabled {
        let app = web::api::create_router(engine.clone());
        let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
        tracing::info!("Web API listening on http://{}", listener.local_addr()?);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Web API stopped: {}", e);
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received");
    let _ = shutdown_tx.send(());
    monitor_task.await?;
    Ok(())
}

async fn replay(trace: PathBuf) -> Result<(), BoxError> {
    let engine = printer::shared(PrinterEngine::new());
    let source = FileReplaySource::new(trace);
    let stats = monitor::ingest(&engine, &source).await.map_err(MonitorError::from)?;
    tracing::info!(
        "Replayed {} messages ({} rejected, {} skipped)",
        stats.dispatched,
        stats.rejected,
        stats.skipped
    );

    let mut engine = engine.write().await;
    let status = engine.evaluate_and_transition();
    let response = web::models::SnapshotResponse {
        status,
        online: engine.online(),
        snapshot: engine.snapshot().clone(),
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
