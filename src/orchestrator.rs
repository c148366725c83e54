//! Catalog import run: source document -> normalizer -> face expander -> batched upserts.
//!
//! The whole source array is parsed up front so a broken document aborts
//! before the first write. Normalized rows are only ever held for the current
//! batch. Per-record and per-face problems are logged, counted and skipped;
//! store failures end the run with every earlier batch already committed.
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

use crate::database_ops::{write_batch, CardWrite, Db};
use crate::error::{FaceError, ImportError, NormalizeError, RecordRef};
use crate::normalization::{expand_faces, normalize_card};
use crate::util::env::DEFAULT_BATCH_SIZE;

/// Progress sink for long runs. The CLI renders a bar; library callers and
/// tests use [`NoProgress`].
pub trait Progress {
    fn start(&self, total: u64);
    fn advance(&self, delta: u64);
    fn finish(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _total: u64) {}
    fn advance(&self, _delta: u64) {}
    fn finish(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Cards per transaction.
    pub batch_size: usize,
    /// Abort on the first malformed record instead of skipping it.
    pub strict: bool,
    /// Only process the first N source records.
    pub limit: Option<usize>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            strict: false,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub record: RecordRef,
    pub reason: String,
}

impl From<&NormalizeError> for SkippedRecord {
    fn from(err: &NormalizeError) -> Self {
        let reason = match err {
            NormalizeError::MissingField { field, .. } => {
                format!("missing required field `{field}`")
            }
            NormalizeError::InvalidField { field, reason, .. } => {
                format!("invalid `{field}`: {reason}")
            }
        };
        Self {
            record: err.record().clone(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    /// Source records seen (after `limit`).
    pub total: usize,
    /// Cards committed to the store.
    pub imported: usize,
    pub faces_written: usize,
    pub batches: usize,
    pub skipped: Vec<SkippedRecord>,
    pub skipped_faces: Vec<FaceError>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imported {} cards.", self.imported)?;
        if self.faces_written > 0 {
            write!(f, " ({} card faces)", self.faces_written)?;
        }
        if !self.skipped.is_empty() {
            write!(f, "\nSkipped {} of {} records:", self.skipped.len(), self.total)?;
            for s in &self.skipped {
                write!(f, "\n  - {}: {}", s.record, s.reason)?;
            }
        }
        if !self.skipped_faces.is_empty() {
            write!(f, "\nSkipped {} card faces:", self.skipped_faces.len())?;
            for face in &self.skipped_faces {
                write!(f, "\n  - {face}")?;
            }
        }
        Ok(())
    }
}

/// Read the catalog: one JSON array of card objects.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_catalog(path: &Path) -> Result<Vec<Value>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                ImportError::SourceRead {
                    path: path.to_path_buf(),
                    source: source.into(),
                }
            } else {
                ImportError::SourceParse {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
    info!(count = records.len(), "loaded catalog records");
    Ok(records)
}

/// Full run against a document on disk. Creates missing tables first.
pub fn import_catalog(
    db: &mut Db,
    path: &Path,
    opts: &ImportOptions,
    progress: &dyn Progress,
) -> Result<ImportSummary, ImportError> {
    let records = read_catalog(path)?;
    db.init_schema()?;
    import_records(db, &records, opts, progress)
}

/// Drive already-parsed records through the pipeline.
#[instrument(skip_all, fields(records = records.len(), batch_size = opts.batch_size, strict = opts.strict))]
pub fn import_records(
    db: &mut Db,
    records: &[Value],
    opts: &ImportOptions,
    progress: &dyn Progress,
) -> Result<ImportSummary, ImportError> {
    let batch_size = opts.batch_size.max(1);
    let records = &records[..opts.limit.unwrap_or(records.len()).min(records.len())];
    let mut summary = ImportSummary {
        total: records.len(),
        ..ImportSummary::default()
    };
    let mut pending: Vec<CardWrite> = Vec::with_capacity(batch_size.min(records.len()));

    progress.start(records.len() as u64);
    for (position, value) in records.iter().enumerate() {
        progress.advance(1);
        let (card, raw_faces) = match normalize_card(position, value) {
            Ok(normalized) => normalized,
            Err(err) if opts.strict => {
                error!(error = %err, "malformed record in strict mode; aborting");
                progress.finish();
                return Err(err.into());
            }
            Err(err) => {
                warn!(
                    position,
                    card_id = err.record().card_id.as_deref().unwrap_or("-"),
                    reason = %err,
                    "skipping malformed record"
                );
                summary.skipped.push(SkippedRecord::from(&err));
                continue;
            }
        };

        let expansion = expand_faces(&card.id, raw_faces.as_deref());
        for face_err in &expansion.skipped {
            warn!(card_id = %card.id, reason = %face_err, "skipping malformed face");
        }
        summary.skipped_faces.extend(expansion.skipped);
        pending.push(CardWrite {
            card,
            faces: expansion.faces,
        });

        if pending.len() >= batch_size {
            flush(db, &mut pending, &mut summary).inspect_err(|_| progress.finish())?;
        }
    }
    flush(db, &mut pending, &mut summary).inspect_err(|_| progress.finish())?;
    progress.finish();

    info!(
        total = summary.total,
        imported = summary.imported,
        faces = summary.faces_written,
        skipped = summary.skipped.len(),
        skipped_faces = summary.skipped_faces.len(),
        batches = summary.batches,
        "catalog import finished"
    );
    Ok(summary)
}

fn flush(
    db: &mut Db,
    pending: &mut Vec<CardWrite>,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    if pending.is_empty() {
        return Ok(());
    }
    let batch = summary.batches + 1;
    match write_batch(db, pending) {
        Ok(outcome) => {
            summary.imported += outcome.cards;
            summary.faces_written += outcome.faces;
            summary.batches = batch;
            debug!(
                batch,
                cards = outcome.cards,
                faces = outcome.faces,
                accumulated = summary.imported,
                "batch committed"
            );
            pending.clear();
            Ok(())
        }
        Err(err) => {
            error!(batch, error = %err, "batch rolled back; aborting import");
            Err(err)
        }
    }
}
