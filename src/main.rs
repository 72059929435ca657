use std::collections::HashSet;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use govscrape::cli::{Cli, Commands};
use govscrape::config::{Settings, SourceCatalog};
use govscrape::domain::Strategy;
use govscrape::errors::{ScrapeError, ScrapeResult};
use govscrape::fetch::HttpFetcher;
use govscrape::services::{DebugDirectory, ScrapeService};
use govscrape::storage::{
    self, JsonReportWriter, ReportSink, RunHistory, SqliteReportStore, SqliteStorage,
};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("govscrape=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> ScrapeResult<()> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;

    match cli.command {
        Commands::Run {
            sources,
            workers,
            timeout,
            deadline,
            no_save,
        } => {
            if let Some(workers) = workers {
                settings.workers = workers;
            }
            if let Some(secs) = timeout {
                settings.timeout = Duration::from_secs(secs);
            }
            let deadline = deadline.map(|secs| Instant::now() + Duration::from_secs(secs));
            cmd_run(&settings, sources, deadline, no_save)
        }
        Commands::Sources => cmd_sources(&settings),
        Commands::History { limit, run } => match run {
            Some(run_id) => cmd_history_run(&settings, run_id),
            None => cmd_history(&settings, limit),
        },
    }
}

fn cmd_run(
    settings: &Settings,
    sources: Option<Vec<String>>,
    deadline: Option<Instant>,
    no_save: bool,
) -> ScrapeResult<()> {
    let catalog = SourceCatalog::from_path(&settings.config_path)?;

    let filter: Option<HashSet<String>> = sources.map(|ids| {
        ids.into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    });
    if let Some(ids) = &filter {
        for id in catalog.unknown_ids(ids) {
            warn!(source = id, "Requested source is not configured");
        }
    }

    let fetcher =
        HttpFetcher::new(&settings.user_agent, settings.timeout)?.with_deadline(deadline);
    let capture = DebugDirectory::new(settings.debug_dir())?;
    let service = ScrapeService::new(fetcher, capture, settings.workers)?;

    let report = service.run_catalog(&catalog, filter.as_ref());

    if !no_save {
        let json = JsonReportWriter::new(&settings.data_dir);
        let history = SqliteReportStore::new(SqliteStorage::new(&settings.db_path)?);
        let sinks: [&dyn ReportSink; 2] = [&json, &history];
        storage::save_all(&sinks, &report);
    }

    let summary = serde_json::json!({
        "total_items": report.total_items,
        "sources_processed": report.sources_scraped.len(),
        "errors": report.errors.len(),
        "timestamp": report.scrape_timestamp.to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn cmd_sources(settings: &Settings) -> ScrapeResult<()> {
    let catalog = SourceCatalog::from_path(&settings.config_path)?;

    if catalog.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("{} (version {}):\n", catalog.name, catalog.version);
    for source in &catalog.sources {
        let note = match &source.strategy {
            Strategy::Unrecognized { .. } => " (unrecognized strategy)".to_string(),
            Strategy::Misconfigured { reason, .. } => format!(" (misconfigured: {})", reason),
            _ => String::new(),
        };
        println!("  {} [{}] {}{}", source.id, source.strategy, source.name, note);
        if let Some(description) = &source.description {
            println!("      {}", description);
        }
    }

    println!("\nTotal: {} source(s)", catalog.sources.len());
    Ok(())
}

fn cmd_history(settings: &Settings, limit: usize) -> ScrapeResult<()> {
    let history = SqliteReportStore::new(SqliteStorage::new(&settings.db_path)?);
    let runs = history.recent_runs(limit)?;

    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    for run in runs {
        println!(
            "#{} {} v{}: {} item(s) from {} source(s), {} error(s)",
            run.id,
            run.scrape_timestamp.format("%Y-%m-%d %H:%M:%S"),
            run.config_version,
            run.total_items,
            run.sources,
            run.errors
        );
    }

    Ok(())
}

fn cmd_history_run(settings: &Settings, run_id: i64) -> ScrapeResult<()> {
    let history = SqliteReportStore::new(SqliteStorage::new(&settings.db_path)?);
    let results = history.results_for_run(run_id)?;

    if results.is_empty() {
        return Err(ScrapeError::InvalidInput(format!("No run #{} recorded", run_id)));
    }

    for result in results {
        println!(
            "{} [{}] {} item(s)",
            result.id,
            result.status.as_str(),
            result.items_found
        );
        if let Some(error) = &result.error {
            println!("    error: {}", error);
        }
        if let Some(warning) = &result.warning {
            println!("    warning: {}", warning);
        }
        for item in &result.items {
            match &item.url {
                Some(url) => println!("    - {} ({})", item.title, url),
                None => println!("    - {}", item.title),
            }
        }
    }

    Ok(())
}
