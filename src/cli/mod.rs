use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::database_ops::db::Db;

pub mod db_counts;
pub mod import;
pub mod init_db;
pub mod search;

const CARD_TABLES: [&str; 2] = ["cards", "card_faces"];

/// Store for the read-only commands. A missing file or missing card tables
/// is reported instead of being created.
fn open_card_store(db_path: &Path) -> Result<Db> {
    let db = Db::open_existing(db_path).with_context(|| {
        format!(
            "no card store at {} (run `mtgc import` or `mtgc init-db` first)",
            db_path.display()
        )
    })?;
    let missing = db.missing_tables(&CARD_TABLES)?;
    if !missing.is_empty() {
        bail!(
            "store {} has no {} table(s); run `mtgc init-db` first",
            db_path.display(),
            missing.join(", ")
        );
    }
    Ok(db)
}
