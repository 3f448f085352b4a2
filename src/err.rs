use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, XmlToJsonError>;

#[derive(Debug, Error)]
pub enum XmlToJsonError {
    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8Input(#[from] std::str::Utf8Error),

    /// Reserving the exactly-sized output buffer failed.
    /// Surfaced to the caller instead of producing a truncated document.
    #[error("Failed to allocate {requested} bytes for the JSON output")]
    OutputAllocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("JSON output size mismatch: measured {measured} bytes but wrote {written}")]
    OutputSizeMismatch { measured: usize, written: usize },

    #[error("Failed to relink node while grouping arrays: {reason}")]
    FailedToRelinkNode { reason: String },

    #[error("Rendered JSON is not valid UTF-8: {0}")]
    InvalidUtf8Output(#[from] std::string::FromUtf8Error),

    #[error("An I/O error has occurred: {0}")]
    Io(#[from] io::Error),
}
