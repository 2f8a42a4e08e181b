//! Core types: batch-fatal errors and per-line outcomes.

use std::fmt;

/// Errors that abort the whole batch.
///
/// A bad response for a single address is not an error — it is a
/// [`LineOutcome`] and the loop moves on. Only setup problems and transport
/// failures land here.
#[derive(Debug)]
pub enum GeoloadError {
    /// Input file unreadable.
    Io(std::io::Error),
    /// SQLite open, lookup, or insert failure.
    Store(rusqlite::Error),
    /// TLS connector construction failure.
    Tls(native_tls::Error),
    /// Transport failure or non-success HTTP status during a fetch.
    Network(String),
}

impl fmt::Display for GeoloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::Tls(e) => write!(f, "TLS setup error: {}", e),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
        }
    }
}

impl std::error::Error for GeoloadError {}

impl From<std::io::Error> for GeoloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rusqlite::Error> for GeoloadError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e)
    }
}

impl From<native_tls::Error> for GeoloadError {
    fn from(e: native_tls::Error) -> Self {
        Self::Tls(e)
    }
}

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Address already present in the store; no network call made.
    CacheHit,
    /// Fetched, validated, and inserted. Carries the response size in bytes.
    Stored { bytes: usize },
    /// Response body was not valid JSON; nothing cached.
    MalformedJson,
    /// `status` was missing or held an unexpected value; nothing cached.
    Rejected { status: Option<String> },
    /// Line was empty after trimming.
    Blank,
}
