//! Card catalog ingestion into a relational collection store.
//!
//! Pipeline: [`orchestrator`] reads the catalog export, [`normalization`]
//! turns each record into a `cards` row plus ordered `card_faces` rows, and
//! [`database_ops`] persists them with replace-on-conflict writes in
//! batch-sized transactions.
pub mod cli;
pub mod database_ops;
pub mod error;
pub mod logging;
pub mod normalization;
pub mod orchestrator;

pub mod util {
    pub mod env;
}

pub use database_ops::Db;
pub use error::{FaceError, ImportError, NormalizeError, RecordRef};
pub use orchestrator::{import_catalog, import_records, ImportOptions, ImportSummary};
