use std::path::PathBuf;

use anyhow::Result;

use super::open_card_store;
use crate::database_ops::search::{search_cards_by_name, SearchHit};
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub query: String,
    pub db_path: Option<PathBuf>,
    pub limit: i64,
}

pub fn run(cfg: SearchConfig) -> Result<Vec<SearchHit>> {
    env_util::init_env();
    let db_path = env_util::catalog_db_path(cfg.db_path);
    let db = open_card_store(&db_path)?;
    let hits = search_cards_by_name(&db, &cfg.query, cfg.limit)?;
    Ok(hits)
}
