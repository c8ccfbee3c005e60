//! Headless runner: plays a toroidal Game of Life session in the terminal.

#[macro_use]
mod telemetry;
mod driver;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use life_core::{FillMode, RunnerConfig};
use life_world::patterns;
use std::path::PathBuf;
use telemetry::LogFormat;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "life-runner")]
#[command(about = "Conway's Game of Life on a toroidal grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation, printing every generation to stdout
    Run(RunArgs),
    /// List the built-in seed patterns
    Patterns,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FillArg {
    Empty,
    Random,
}

impl From<FillArg> for FillMode {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Empty => FillMode::Empty,
            FillArg::Random => FillMode::Random,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Random seed for reproducible fills
    #[arg(long)]
    seed: Option<u64>,

    /// Initial fill when no pattern is given
    #[arg(long, value_enum)]
    fill: Option<FillArg>,

    /// Named pattern to place at the grid centre
    #[arg(long)]
    pattern: Option<String>,

    /// Speed (0 to 900); the step interval is 1000ms minus this
    #[arg(long)]
    speed: Option<u64>,

    /// Stop after this many generations
    #[arg(long)]
    generations: Option<u64>,

    /// Do not print generations
    #[arg(long)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl RunArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    fn resolve_config(&self) -> Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                RunnerConfig::from_json(&json)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => RunnerConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.session.grid.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.session.grid.cols = cols;
        }
        if let Some(seed) = self.seed {
            config.session.seed = Some(seed);
        }
        if let Some(fill) = self.fill {
            config.initial_fill = fill.into();
        }
        if let Some(pattern) = &self.pattern {
            config.pattern = Some(pattern.clone());
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(generations) = self.generations {
            config.max_generations = Some(generations);
        }
        if self.quiet {
            config.render = false;
        }

        config.session.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Patterns => {
            for name in patterns::names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&RunnerConfig::default())?);
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    telemetry::init_telemetry(args.log_format)?;

    let config = args.resolve_config()?;
    let session = driver::build_session(&config)?;

    info!(
        session_id = %session.id(),
        rows = config.session.grid.rows,
        cols = config.session.grid.cols,
        "Starting life runner"
    );

    let mut stdout = std::io::stdout();
    let summary = driver::drive(&session, &config, &mut stdout, shutdown_signal()).await?;

    info!(
        generations = summary.generations,
        population = summary.population,
        extinct = summary.extinct,
        "Run finished"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
