//! Crate error type.
//!
//! This module defines [`Error`] and the [`Result`] alias used across the
//! crate, plus the internal record used to keep a producer-side I/O failure
//! around until the consumer has drained the buffered bytes that precede it.

use std::io;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the `stream-readahead` crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An in-flight call observed the interrupt predicate or the abort flag.
    #[error("operation aborted")]
    Aborted,

    /// A seek was rejected up front: unsupported whence, negative target,
    /// non-seekable source, or a target beyond the declared end.
    #[error("invalid seek: {0}")]
    InvalidSeek(&'static str),

    /// The wait for seek completion exceeded the configured timeout.
    ///
    /// The request may still complete in the background; the instance should
    /// be closed after seeing this.
    #[error("timed out waiting for seek completion")]
    SeekTimedOut,

    /// Rejected configuration value.
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),

    /// I/O error from the inner source.
    ///
    /// Uses the concrete `std::io::Error` to preserve error kinds.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Io(inner) => inner,
            Error::Aborted => io::Error::new(io::ErrorKind::Interrupted, e.to_string()),
            Error::InvalidSeek(_) | Error::InvalidSettings(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            Error::SeekTimedOut => io::Error::new(io::ErrorKind::TimedOut, e.to_string()),
        }
    }
}

/// Snapshot of an inner-source failure recorded by the producer.
///
/// `io::Error` is not `Clone`, so the shared state keeps the kind plus the
/// rendered message and re-materializes an `io::Error` each time the failure
/// is surfaced to the consumer.
#[derive(Debug, Clone)]
pub(crate) struct IoFailure {
    kind: io::ErrorKind,
    message: String,
}

impl IoFailure {
    pub(crate) fn aborted() -> Self {
        Self {
            kind: io::ErrorKind::Interrupted,
            message: "operation aborted".into(),
        }
    }

    pub(crate) fn to_io(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

impl From<&io::Error> for IoFailure {
    fn from(e: &io::Error) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
