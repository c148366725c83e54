use std::path::PathBuf;

use anyhow::Result;

use super::open_card_store;
use crate::database_ops::search::table_counts;
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct DbCountsConfig {
    /// Optional override for the SQLite store path.
    pub db_path: Option<PathBuf>,
    /// Emit the counts as a JSON object.
    pub json: bool,
}

pub fn run(cfg: DbCountsConfig) -> Result<String> {
    env_util::init_env();
    let db_path = env_util::catalog_db_path(cfg.db_path);
    let db = open_card_store(&db_path)?;
    let counts = table_counts(&db)?;
    if cfg.json {
        return Ok(serde_json::to_string_pretty(&counts)?);
    }
    let mut out = String::new();
    out.push_str(&format!("cards: {}\n", counts.cards));
    out.push_str(&format!("card_faces: {}\n", counts.card_faces));
    out.push_str(&format!("multi-faced cards: {}", counts.multi_faced_cards));
    Ok(out)
}
