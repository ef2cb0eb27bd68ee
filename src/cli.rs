//! Command-line interface
//!
//! `serve` (the default) runs the HTTP API; `load` ingests a CSV file into the
//! configured store and prints a short report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::{
    config::Config,
    db::{MemoryStore, PgTitleStore, TitleFilter, TitleStore},
    routes::{create_router, AppState},
    services::ingestion::{self, IngestReport, DEFAULT_CSV_PATH},
};

const SAMPLE_SIZE: usize = 5;

/// Title catalog API
#[derive(Debug, Parser)]
#[command(name = "catalog-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Load titles from a CSV file
    Load {
        /// Path to the CSV file
        #[arg(long, default_value = DEFAULT_CSV_PATH)]
        file: PathBuf,
        /// Delete existing titles before loading
        #[arg(long)]
        clear: bool,
    },
}

/// Picks the store: PostgreSQL when a database URL is configured, memory otherwise
pub async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn TitleStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PgTitleStore::connect(url, config.db_max_connections).await?;
            tracing::info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Load { file, clear } => load(&config, &file, clear).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = build_store(&config).await?;

    if let Some(seed) = config.seed_file.as_deref() {
        seed_store(store.as_ref(), seed).await?;
    }

    let app = create_router(AppState::new(store));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads `path` into the store unless it already holds titles
///
/// Returns `None` when seeding was skipped, so a persistent store can be
/// restarted with the same `SEED_FILE`.
pub async fn seed_store(store: &dyn TitleStore, path: &Path) -> anyhow::Result<Option<IngestReport>> {
    let existing = store.count(&TitleFilter::new()).await?;
    if existing > 0 {
        tracing::info!(existing, "Store already populated, skipping seed");
        return Ok(None);
    }

    let report = ingestion::load_csv(store, path, false).await?;
    tracing::info!(
        loaded = report.loaded,
        failed = report.failed(),
        "Seeded catalog from {}",
        path.display()
    );
    Ok(Some(report))
}

async fn load(config: &Config, file: &Path, clear: bool) -> anyhow::Result<()> {
    let store = build_store(config).await?;

    let report = ingestion::load_csv(store.as_ref(), file, clear).await?;
    print_report(&report);

    let summary = ingestion::summarize(store.as_ref(), SAMPLE_SIZE).await?;
    println!();
    println!("Database summary:");
    println!("  Total titles: {}", summary.total);
    println!("  Movies: {}", summary.movies);
    println!("  TV Shows: {}", summary.tv_shows);
    if !summary.samples.is_empty() {
        println!();
        println!("Sample titles:");
        for sample in &summary.samples {
            println!("  - {}", sample);
        }
    }

    Ok(())
}

fn print_report(report: &IngestReport) {
    if let Some(deleted) = report.cleared {
        println!("Cleared {} existing titles", deleted);
    }
    println!("Successfully loaded {} titles", report.loaded);

    if report.failed() > 0 {
        println!("Failed to process {} rows", report.failed());
        for line in report.error_preview() {
            println!("  {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["catalog-api"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["catalog-api", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn test_load_arguments() {
        let cli = Cli::try_parse_from(["catalog-api", "load"]).unwrap();
        match cli.command {
            Some(Commands::Load { file, clear }) => {
                assert_eq!(file, PathBuf::from(DEFAULT_CSV_PATH));
                assert!(!clear);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli =
            Cli::try_parse_from(["catalog-api", "load", "--file", "titles.csv", "--clear"]).unwrap();
        match cli.command {
            Some(Commands::Load { file, clear }) => {
                assert_eq!(file, PathBuf::from("titles.csv"));
                assert!(clear);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_seeding_skips_populated_store() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description\n\
              s1,Movie,First,,,India,\"September 25, 2021\",2020,PG,90 min,Dramas,Desc\n\
              s2,TV Show,Second,,,Japan,,2019,TV-14,1 Season,Anime Series,Desc\n",
        )
        .unwrap();

        let store = MemoryStore::new();
        let first = seed_store(&store, file.path()).await.unwrap();
        assert_eq!(first.map(|report| report.loaded), Some(2));

        let second = seed_store(&store, file.path()).await.unwrap();
        assert!(second.is_none());
        assert_eq!(store.count(&TitleFilter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seeding_missing_file_fails() {
        let store = MemoryStore::new();
        assert!(seed_store(&store, Path::new("/no/such/seed.csv")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_without_database_url() {
        let config = Config::from_vars(Vec::new()).unwrap();
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }
}
