use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::database_ops::db::Db;
use crate::orchestrator::{import_records, read_catalog, ImportOptions, ImportSummary, Progress};
use crate::util::env as env_util;

const BAR_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {per_sec} eta {eta}";

#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Catalog JSON (overrides CATALOG_JSON_PATH).
    pub json_path: Option<PathBuf>,
    /// SQLite store (overrides CATALOG_DB_PATH).
    pub db_path: Option<PathBuf>,
    /// Cards per transaction (overrides IMPORT_BATCH_SIZE).
    pub batch_size: Option<usize>,
    pub strict: bool,
    pub limit: Option<usize>,
    pub no_progress: bool,
}

/// Terminal progress bar for the import loop.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix("Importing");
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn run(cfg: ImportConfig) -> Result<ImportSummary> {
    env_util::init_env();
    let json_path = env_util::catalog_json_path(cfg.json_path);
    let db_path = env_util::catalog_db_path(cfg.db_path);
    let opts = ImportOptions {
        batch_size: env_util::import_batch_size(cfg.batch_size),
        strict: env_util::import_strict(cfg.strict),
        limit: cfg.limit,
    };
    env_util::log_config(&json_path, &db_path, opts.batch_size, opts.strict);

    // The store is not touched until the whole document has parsed.
    info!("Loading card catalog from {}", json_path.display());
    let records = read_catalog(&json_path)
        .with_context(|| format!("import of {} failed", json_path.display()))?;

    let mut db = Db::open(&db_path)
        .with_context(|| format!("failed to open store {}", db_path.display()))?;
    db.init_schema().context("schema creation failed")?;
    let progress = BarProgress::new(cfg.no_progress);
    let summary = import_records(&mut db, &records, &opts, &progress)
        .with_context(|| format!("import of {} failed", json_path.display()))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir, json: &str) -> ImportConfig {
        ImportConfig {
            json_path: Some(dir.path().join(json)),
            db_path: Some(dir.path().join("collection.db")),
            no_progress: true,
            ..ImportConfig::default()
        }
    }

    #[test]
    fn missing_source_leaves_no_store_file() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, "missing.json");
        let err = run(cfg.clone()).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
        assert!(!dir.path().join("collection.db").exists());
    }

    #[test]
    fn imports_into_a_fresh_store() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cards.json"),
            r#"[{"id": "bolt", "name": "Lightning Bolt", "set": "lea", "reserved": true}]"#,
        )
        .unwrap();
        let summary = run(config(&dir, "cards.json")).unwrap();
        assert_eq!(summary.imported, 1);

        let db = Db::open_existing(dir.path().join("collection.db")).unwrap();
        let reserved: i64 = db
            .conn()
            .query_row("SELECT reserved FROM cards WHERE id = 'bolt'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(reserved, 1);
    }
}
