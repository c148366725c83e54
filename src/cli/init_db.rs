use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::database_ops::db::Db;
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct InitDbConfig {
    pub db_path: Option<PathBuf>,
}

pub fn run(cfg: InitDbConfig) -> Result<PathBuf> {
    env_util::init_env();
    let db_path = env_util::catalog_db_path(cfg.db_path);
    let db = Db::open(&db_path)
        .with_context(|| format!("failed to open store {}", db_path.display()))?;
    db.init_schema().context("schema creation failed")?;
    info!(db = %db_path.display(), "database tables created or verified");
    Ok(db_path)
}
