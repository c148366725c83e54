use anyhow::Result;
use clap::{Parser, Subcommand};
use mtg_collection::logging::{init_tracing, DEFAULT_FILTER};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mtgc", version, about = "Card catalog import and collection store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Create the collection store tables if they do not exist
    InitDb {
        /// Optional override for the SQLite store path
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Import a card catalog JSON export into the store
    Import {
        /// Catalog JSON file (a single array of card objects)
        #[arg(long)]
        json: Option<PathBuf>,
        /// Optional override for the SQLite store path
        #[arg(long)]
        db_path: Option<PathBuf>,
        /// Cards per transaction (defaults to env/1000)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Abort on the first malformed record instead of skipping it
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Only process the first N records
        #[arg(long)]
        limit: Option<usize>,
        /// Disable the progress bar
        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },
    /// Search imported cards by name substring
    Search {
        query: String,
        /// Optional override for the SQLite store path
        #[arg(long)]
        db_path: Option<PathBuf>,
        /// Maximum number of hits
        #[arg(long, default_value_t = 25)]
        limit: i64,
        /// Print hits as a JSON array
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print row counts for the card tables
    DbCounts {
        /// Optional override for the SQLite store path
        #[arg(long)]
        db_path: Option<PathBuf>,
        /// Print counts as a JSON object
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    mtg_collection::util::env::init_env();
    init_tracing(DEFAULT_FILTER)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb { db_path } => {
            use mtg_collection::cli::init_db::{run, InitDbConfig};
            let path = run(InitDbConfig { db_path })?;
            println!("Database tables created or verified in {}.", path.display());
        }
        Commands::Import {
            json,
            db_path,
            batch_size,
            strict,
            limit,
            no_progress,
        } => {
            use mtg_collection::cli::import::{run, ImportConfig};
            let cfg = ImportConfig {
                json_path: json,
                db_path,
                batch_size,
                strict,
                limit,
                no_progress,
            };
            let summary = run(cfg)?;
            println!("{summary}");
        }
        Commands::Search {
            query,
            db_path,
            limit,
            json,
        } => {
            use mtg_collection::cli::search::{run, SearchConfig};
            let hits = run(SearchConfig {
                query: query.clone(),
                db_path,
                limit,
            })?;
            info!(query = %query, hits = hits.len(), "search: completed");
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
                return Ok(());
            }
            for hit in hits {
                let faces = if hit.faces > 0 {
                    format!(" [{} faces]", hit.faces)
                } else {
                    String::new()
                };
                println!(
                    "{}  {} ({}) {}{}",
                    hit.id,
                    hit.name,
                    hit.set,
                    hit.type_line.unwrap_or_default(),
                    faces
                );
            }
        }
        Commands::DbCounts { db_path, json } => {
            use mtg_collection::cli::db_counts::{run, DbCountsConfig};
            println!("{}", run(DbCountsConfig { db_path, json })?);
        }
    }
    Ok(())
}
