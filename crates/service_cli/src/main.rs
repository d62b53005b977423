//! Fundsim CLI - Command Line Operations for the Simulation Core
//!
//! Operational entry point for the fund-performance random stream factory and
//! price path simulator.
//!
//! # Commands
//!
//! - `fundsim simulate` - Simulate the price path of every configured zone
//! - `fundsim trials --count <n>` - Run parallel trials and report realised rates
//! - `fundsim sample --purpose <p> --distribution <name>` - Summarise a distribution sample
//! - `fundsim state save|show <file>` - Persist and inspect factory state
//!
//! # Configuration
//!
//! Settings come from the `--config` TOML file, then `FUNDSIM_*` environment
//! variables, then command-line flags, each overriding the previous. `RUST_LOG`
//! overrides the configured log level when set.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_config, CliArgs, LogLevel};

/// Fund-performance simulation CLI
#[derive(Parser)]
#[command(name = "fundsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base seed (integer or text)
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Collapse seeding and variation to fixed values
    #[arg(long, global = true)]
    deterministic: bool,

    /// Log level
    #[arg(long, global = true, value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Restore the factory from a saved state file. Its seed, mode,
    /// correlations and variation factors replace the configured ones.
    #[arg(long, global = true, value_name = "FILE")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the price path of every configured zone
    Simulate {
        /// Simulated horizon in years
        #[arg(short, long)]
        years: Option<u32>,

        /// Instance id of the zone streams
        #[arg(short, long, default_value = "0")]
        instance_id: u64,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Run independent trials in parallel
    Trials {
        /// Number of trials
        #[arg(short = 'n', long)]
        count: u64,

        /// First trial number
        #[arg(long, default_value = "0")]
        first: u64,

        /// Simulated horizon in years
        #[arg(short, long)]
        years: Option<u32>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Summarise a sample of a named distribution
    Sample {
        /// Stream purpose
        #[arg(short, long)]
        purpose: String,

        /// Distribution name (normal, lognormal, uniform, beta, exponential, weibull)
        #[arg(short, long)]
        distribution: String,

        /// Distribution parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = commands::sample::parse_param)]
        params: Vec<(String, f64)>,

        /// Number of draws
        #[arg(short, long, default_value = "10000")]
        size: usize,

        /// Instance id of the stream
        #[arg(short, long, default_value = "0")]
        instance_id: u64,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Persist or inspect factory state
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
enum StateAction {
    /// Save the configured factory state
    Save {
        /// Output file
        file: PathBuf,
    },
    /// Show a saved factory state
    Show {
        /// State file
        file: PathBuf,
    },
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        let years = match &self.command {
            Commands::Simulate { years, .. } | Commands::Trials { years, .. } => *years,
            _ => None,
        };
        CliArgs {
            config_file: self.config.clone(),
            seed: self.seed.clone(),
            deterministic: self.deterministic,
            log_level: self.log_level,
            years,
        }
    }
}

fn init_tracing(log_level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.filter().into())
        .from_env_lossy();
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args())?;

    init_tracing(config.log_level);
    info!(
        years = config.years,
        zones = config.zones.len(),
        deterministic = config.deterministic_mode,
        "Configuration loaded"
    );

    let state = commands::factory_state(&config, cli.state.as_deref())?;

    let output = match cli.command {
        Commands::Simulate {
            instance_id,
            format,
            ..
        } => commands::simulate::run(&config, &state, instance_id, &format)?,
        Commands::Trials {
            count,
            first,
            format,
            ..
        } => commands::trials::run(&config, &state, first, count, &format)?,
        Commands::Sample {
            purpose,
            distribution,
            params,
            size,
            instance_id,
            format,
        } => {
            let request = commands::sample::SampleRequest {
                purpose,
                distribution,
                params,
                size,
                instance_id,
            };
            commands::sample::run(&state, &request, &format)?
        }
        Commands::State { action } => match action {
            StateAction::Save { file } => commands::state::save(&state, &file)?,
            StateAction::Show { file } => commands::state::show(&config, &file)?,
        },
    };

    print!("{}", output);
    Ok(())
}
