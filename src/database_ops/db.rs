use rusqlite::{Connection, OpenFlags, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::schema;

/// Owned handle to the collection store.
///
/// Passed explicitly through the importer; writers borrow it mutably for the
/// lifetime of one transaction.
#[derive(Debug)]
pub struct Db {
    conn: Connection,
}

impl Db {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        apply_sqlite_pragmas(&conn, true)?;
        info!("opened sqlite store");
        Ok(Self { conn })
    }

    /// Open a store that must already exist. Never creates the file and leaves
    /// the journal mode as the importer set it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_existing(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        apply_sqlite_pragmas(&conn, false)?;
        debug!("opened existing sqlite store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_sqlite_pragmas(&conn, false)?;
        Ok(Self { conn })
    }

    /// Create every table that does not exist yet. Safe to call on each run.
    pub fn init_schema(&self) -> rusqlite::Result<()> {
        for ddl in schema::ALL {
            self.conn.execute_batch(ddl)?;
        }
        debug!("schema verified");
        Ok(())
    }

    /// Begin a transaction. Dropping it without `commit()` rolls back.
    pub fn transaction(&mut self) -> rusqlite::Result<Transaction<'_>> {
        self.conn.transaction()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn table_exists(&self, table: &str) -> rusqlite::Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND lower(name) = lower(?1) LIMIT 1",
        )?;
        let mut rows = stmt.query([table])?;
        Ok(rows.next()?.is_some())
    }

    /// Which of `tables` are absent from the store.
    pub fn missing_tables<'t>(&self, tables: &[&'t str]) -> rusqlite::Result<Vec<&'t str>> {
        let mut missing = Vec::new();
        for &table in tables {
            if !self.table_exists(table)? {
                missing.push(table);
            }
        }
        Ok(missing)
    }
}

/// Connection settings for a single-writer batch import. Journaling stays on
/// so an interrupted run keeps only fully committed batches.
fn apply_sqlite_pragmas(conn: &Connection, file_backed: bool) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(3))?;
    if file_backed {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    conn.execute_batch(
        r#"
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
"#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_schema_is_idempotent() {
        let db = Db::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
        for table in ["cards", "card_faces", "collection_cards", "deck_cards", "card_tags"] {
            assert!(db.table_exists(table).unwrap(), "{table} missing");
        }
        assert!(!db.table_exists("prices").unwrap());
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Db::open_in_memory().unwrap();
        db.init_schema().unwrap();
        let err = db
            .conn()
            .execute(
                "INSERT INTO card_faces (card_id, face_index, name) VALUES ('ghost', 0, 'Boo')",
                [],
            )
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY"));
    }

    #[test]
    fn open_existing_never_creates_a_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("typo.db");
        assert!(Db::open_existing(&path).is_err());
        assert!(!path.exists());

        let created = Db::open(&path).unwrap();
        drop(created);
        let db = Db::open_existing(&path).unwrap();
        assert_eq!(db.missing_tables(&["cards", "card_faces"]).unwrap(), vec!["cards", "card_faces"]);
        db.init_schema().unwrap();
        assert!(db.missing_tables(&["cards", "card_faces"]).unwrap().is_empty());
    }
}
