pub mod api;
pub mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use stockcast_core::{ForecastContext, ForecastResponse, PipelineConfig};
use tracing::{error, info};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Consumption forecasting from a pre-trained sequence model")]
struct Cli {
    #[command(flatten)]
    pipeline: PipelineConfig,

    /// Service config file (TOML)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the forecast form and API over HTTP
    Serve {
        /// API port (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Forecast once and print the JSON response
    Predict {
        /// Today's consumption
        consumption: String,
    },
    /// Print the loaded scaler parameters and history prefix
    Inspect,
}

fn load_context(pipeline: &PipelineConfig) -> Result<ForecastContext> {
    let ctx = ForecastContext::load(pipeline).context("Failed to load forecasting artifacts")?;
    info!(
        model = ctx.model_kind().as_str(),
        window_size = ctx.window_size(),
        history_rows = ctx.history().source_rows(),
        "Forecasting pipeline ready"
    );
    Ok(ctx)
}

fn serve(ctx: ForecastContext, config: Config, port: Option<u16>) -> Result<()> {
    let mut api = config.api;
    if let Some(port) = port {
        api.port = port;
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(api::run_api_server(Arc::new(ctx), &api))
}

fn predict_once(ctx: &ForecastContext, consumption: &str) -> Result<()> {
    let outcome = ctx.respond(consumption);
    let failed = outcome.is_err();

    println!(
        "{}",
        serde_json::to_string_pretty(&ForecastResponse::from(outcome))?
    );
    if failed {
        anyhow::bail!("forecast for {:?} failed", consumption);
    }
    Ok(())
}

fn inspect(ctx: &ForecastContext) -> Result<()> {
    let report = serde_json::json!({
        "model": ctx.model_kind().as_str(),
        "window_size": ctx.window_size(),
        "history_rows": ctx.history().source_rows(),
        "prefix": ctx.history().prefix(),
        "scaler": ctx.scaler().params(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref().map(Path::new))?;

    // Artifacts load before any command runs; a missing one is fatal.
    let ctx = load_context(&cli.pipeline)?;

    match cli.command {
        Commands::Serve { port } => serve(ctx, config, port),
        Commands::Predict { consumption } => predict_once(&ctx, &consumption),
        Commands::Inspect => inspect(&ctx),
    }
}

fn main() {
    // Initialize structured logging; also captures `log` records from the core crate.
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    info!(
        pipeline = ?cli.pipeline,
        "Starting stockcast with Configuration"
    );

    if let Err(e) = run(cli) {
        error!(error = %format!("{:#}", e), "Fatal Error");
        std::process::exit(1);
    }
}
