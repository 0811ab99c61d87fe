use std::io;

use thiserror::Error;

use crate::types::RowId;

/// Error type for sampler configuration, ingestion, and export failures.
///
/// Data-availability shortfalls are deliberately absent: they are recorded in
/// the [`crate::report::SampleReport`] and logged, never raised.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("row {row} has invalid rating '{value}' (expected 1-5)")]
    InvalidRating { row: RowId, value: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv transport failure: {0}")]
    Csv(#[from] csv::Error),
}
