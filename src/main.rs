mod config;
mod models;
mod pipeline;
mod report;
mod scraper;
mod storage;
mod tables;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::report::build_report;
use crate::storage::{TABLE_STEMS, TableStore};

#[derive(Parser)]
#[command(name = "filmclub-etl", about = "Letterboxd film-club extraction pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape the film list and rebuild the five data tables
    Extract {
        /// Letterboxd list URL to extract
        #[arg(long, default_value = config::DEFAULT_LIST_URL)]
        list_url: String,

        /// Suffix for output CSV filenames (e.g. _new)
        #[arg(long, default_value = "")]
        suffix: String,

        /// Where to write the comparison report (default: from config)
        #[arg(long)]
        report_path: Option<PathBuf>,
    },

    /// Re-run the consistency report for a suffixed build, without scraping
    Compare {
        /// Suffix of the build to compare against the unsuffixed snapshot
        #[arg(long, default_value = "_new")]
        suffix: String,

        #[arg(long)]
        report_path: Option<PathBuf>,
    },

    /// Row counts of the stored tables
    Stats {
        #[arg(long, default_value = "")]
        suffix: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "filmclub_etl=info,warn",
        1 => "filmclub_etl=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Extract {
            list_url,
            suffix,
            report_path,
        } => {
            let _t = utils::Timer::start("Extraction run");
            let report_path = report_path.unwrap_or_else(|| config.output.report_path.clone());

            let stats = Pipeline::new(config)
                .run(&list_url, &suffix, &report_path)
                .await?;
            info!(
                "Done: {} films, {} table rows, snapshot match: {}",
                stats.films_processed, stats.rows_written, stats.all_match
            );
        }

        Command::Compare {
            suffix,
            report_path,
        } => {
            let _t = utils::Timer::start("Snapshot comparison");
            let report_path = report_path.unwrap_or_else(|| config.output.report_path.clone());
            let store = TableStore::open(&config.output.data_dir)?;

            let pairs: Vec<_> = TABLE_STEMS
                .iter()
                .map(|stem| {
                    (
                        *stem,
                        store.csv_path(stem, &suffix),
                        store.csv_path(stem, ""),
                    )
                })
                .collect();

            let (text, _all_match) = build_report(&pairs, &report_path)?;
            println!("{}", text);
        }

        Command::Stats { suffix } => {
            let store = TableStore::open(&config.output.data_dir)?;
            println!("─────────────────────────────────");
            println!("  filmclub-etl — Stored tables");
            println!("─────────────────────────────────");
            for stem in TABLE_STEMS {
                match store.read_table(stem, &suffix) {
                    Ok(table) => {
                        let (rows, cols) = table.shape();
                        println!("  {:<18}: {} rows × {} cols", stem, rows, cols);
                    }
                    Err(_) => println!("  {:<18}: —", stem),
                }
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
