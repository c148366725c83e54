use std::path::PathBuf;
use thiserror::Error;

/// Where a failing record sits in the source document.
///
/// The identifier is carried whenever the raw record exposes one, otherwise the
/// zero-based position in the top-level array is the only handle we have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub position: usize,
    pub card_id: Option<String>,
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.card_id {
            Some(id) => write!(f, "{id} (#{})", self.position),
            None => write!(f, "#{}", self.position),
        }
    }
}

/// A single card record could not be turned into a `cards` row.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("record {record}: missing required field `{field}`")]
    MissingField {
        record: RecordRef,
        field: &'static str,
    },
    #[error("record {record}: invalid value for `{field}`: {reason}")]
    InvalidField {
        record: RecordRef,
        field: String,
        reason: String,
    },
}

impl NormalizeError {
    pub fn record(&self) -> &RecordRef {
        match self {
            NormalizeError::MissingField { record, .. } => record,
            NormalizeError::InvalidField { record, .. } => record,
        }
    }
}

/// One face sub-object was unusable. Siblings and the parent card still import.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FaceError {
    #[error("card {card_id} face {face_index}: missing required field `{field}`")]
    MissingField {
        card_id: String,
        face_index: usize,
        field: &'static str,
    },
    #[error("card {card_id} face {face_index}: invalid face payload: {reason}")]
    Invalid {
        card_id: String,
        face_index: usize,
        reason: String,
    },
}

/// Run-level failures. Anything in here stops the import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read catalog source {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog source {path:?} is not a JSON array of cards: {source}")]
    SourceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("strict mode: {0}")]
    MalformedRecord(#[from] NormalizeError),
    #[error("batch write failed for {} card(s) [{}]: {source}", .card_ids.len(), .card_ids.join(", "))]
    WriteFailure {
        card_ids: Vec<String>,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
}
