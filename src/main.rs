use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use timetable_solver::transport::DEFAULT_CHUNK_SIZE;
use timetable_solver::{Dataset, FilterConfig, RankingSession, generator, server};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the timetable API over HTTP
    Serve {
        #[arg(long, env = "TIMETABLE_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,

        /// Maximum bytes per chunk of a stored result
        #[arg(long, env = "TIMETABLE_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Generate and rank timetables from JSON files, printing JSON
    Generate {
        #[arg(short, long)]
        dataset: PathBuf,

        #[arg(short, long)]
        filters: Option<PathBuf>,

        /// Print every combination without pruning or ranking
        #[arg(long)]
        all: bool,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::Serve { addr, chunk_size } => {
            anyhow::ensure!(chunk_size > 0, "--chunk-size must be greater than zero");
            server::run_server(&addr, chunk_size).await?;
        }
        Commands::Generate {
            dataset,
            filters,
            all,
        } => {
            let dataset: Dataset = read_json(&dataset)?;
            if all {
                let combinations = generator::enumerate_all(&dataset);
                println!("{}", serde_json::to_string_pretty(&combinations)?);
                return Ok(());
            }

            let filters: FilterConfig = match filters {
                Some(path) => read_json(&path)?,
                None => FilterConfig::default(),
            };
            let session = RankingSession::generate(&dataset, filters)?;
            let report = session.report();
            info!(
                "{} of {} combinations are feasible",
                report.feasible, report.candidates
            );
            println!("{}", serde_json::to_string_pretty(&session.ranked())?);
        }
    }

    Ok(())
}
