pub mod db;
pub mod schema;
pub mod search;
pub mod upsert;

pub use db::Db;
pub use upsert::{upsert_card, write_batch, BatchOutcome, CardWrite};
