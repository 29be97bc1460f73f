use std::fs;
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use slot_optimizer::catalog::ScheduleRequest;
use slot_optimizer::config::{Config, ConfigOverrides};
use slot_optimizer::optimize_request;
use slot_optimizer::output::csv::selection_to_csv;
use slot_optimizer::output::json::{render_json, render_json_compact};
use slot_optimizer::output::table::render_selection_table;
use slot_optimizer::server::run_server;
use slot_optimizer::solver::orchestrator::Scheduler;
use slot_optimizer::solver::SelectionResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "slot-optimizer",
    about = "Pick posting slots that maximize engagement under capacity limits"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Solve one input record read from a file or stdin.
    Optimize {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Day cap used when the input record has none.
        #[arg(long = "max-per-day")]
        max_per_day: Option<usize>,
        /// Platform-day cap used when the input record has none.
        #[arg(long = "max-per-platform-day")]
        max_per_platform_day: Option<usize>,
        #[arg(long = "classical-only")]
        classical_only: bool,
        #[arg(long = "max-iterations")]
        max_iterations: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;

    match &cli.command {
        Commands::Optimize {
            input,
            max_per_day,
            max_per_platform_day,
            classical_only,
            max_iterations,
            seed,
        } => {
            config.apply_overrides(ConfigOverrides {
                max_posts_per_day: *max_per_day,
                max_posts_per_platform_day: *max_per_platform_day,
                classical_only: *classical_only,
                max_iterations: *max_iterations,
                seed: *seed,
                ..ConfigOverrides::default()
            });
            let raw = read_input(input.as_ref())?;
            let request = ScheduleRequest::from_json(&raw).context("invalid input record")?;
            let scheduler = Scheduler::from_config(&config.solver);
            debug!(
                engine = scheduler.optimizer_name().unwrap_or("none"),
                slots = request.slots.len(),
                "optimizing"
            );
            let result = optimize_request(&scheduler, request, config.capacity.as_capacity())
                .context("invalid input record")?;
            print_selection(&result, cli.output)?;
        }
        Commands::Serve { host, port } => {
            config.apply_overrides(ConfigOverrides {
                host: host.clone(),
                port: *port,
                ..ConfigOverrides::default()
            });
            let bind = format!("{}:{}", config.server.host, config.server.port);
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                eprintln!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed reading input: {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed reading input from stdin")?;
            Ok(raw)
        }
    }
}

fn print_selection(result: &SelectionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", render_json_compact(result)?),
        OutputFormat::Pretty => println!("{}", render_json(result)?),
        OutputFormat::Table => println!("{}", render_selection_table(result)),
        OutputFormat::Csv => print!("{}", selection_to_csv(result)?),
    }
    Ok(())
}
