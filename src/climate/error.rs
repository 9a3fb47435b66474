use crate::store::error::StoreError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Retry budget exhausted after {attempts} attempts for {url}")]
    RetryBudgetExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<ArchiveError>,
    },

    #[error("Failed to parse archive response from {0}")]
    ResponseParse(String, #[source] reqwest::Error),

    #[error(
        "Archive series for {url} has mismatched lengths: {dates} dates, {hi} max values, {lo} min values"
    )]
    SeriesLengthMismatch {
        url: String,
        dates: usize,
        hi: usize,
        lo: usize,
    },
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
