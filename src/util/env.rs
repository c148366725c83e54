//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

pub const CATALOG_JSON_PATH: &str = "CATALOG_JSON_PATH";
pub const CATALOG_DB_PATH: &str = "CATALOG_DB_PATH";
pub const IMPORT_BATCH_SIZE: &str = "IMPORT_BATCH_SIZE";
pub const IMPORT_STRICT: &str = "IMPORT_STRICT";

pub const DEFAULT_JSON_PATH: &str = "oracle-cards.json";
pub const DEFAULT_DB_PATH: &str = "mtg_collection.db";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            return;
        }
        // Fallback to Cargo project root
        let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
        let _ = dotenv::from_filename(candidate);
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => {
            let v = raw.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "on" | "yes")
        }
        Err(_) => default,
    }
}

/// Catalog JSON path: explicit override, then env, then default.
pub fn catalog_json_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| env_opt(CATALOG_JSON_PATH).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_PATH))
}

/// SQLite store path: explicit override, then env, then default.
pub fn catalog_db_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| env_opt(CATALOG_DB_PATH).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Batch size; zero or garbage falls back to the default.
pub fn import_batch_size(cli: Option<usize>) -> usize {
    match cli.unwrap_or_else(|| env_parse(IMPORT_BATCH_SIZE, DEFAULT_BATCH_SIZE)) {
        0 => DEFAULT_BATCH_SIZE,
        n => n,
    }
}

/// Strict mode turns the first malformed record into a fatal error.
pub fn import_strict(cli: bool) -> bool {
    cli || env_flag(IMPORT_STRICT, false)
}

/// Log the resolved import configuration.
pub fn log_config(json_path: &Path, db_path: &Path, batch_size: usize, strict: bool) {
    info!(
        target = "config",
        json = %json_path.display(),
        db = %db_path.display(),
        batch_size,
        strict,
        "import configuration"
    );
}
