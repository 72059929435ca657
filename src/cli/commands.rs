use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "govscrape")]
#[command(about = "Configuration-driven scraper for government websites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape configured sources and save the run report
    Run {
        /// Only scrape these source ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,

        /// Number of sources scraped concurrently
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        workers: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Stop issuing requests once this many seconds have passed
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        deadline: Option<u64>,

        /// Print the summary without writing JSON or SQLite output
        #[arg(long)]
        no_save: bool,
    },

    /// List configured sources and their strategies
    Sources,

    /// Show recent runs recorded in the history database
    History {
        /// Number of runs to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Show the sources and items of one run instead
        #[arg(long)]
        run: Option<i64>,
    },
}
