// crates/worldclock-core/src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while making sure the dataset is present in the local cache.
///
/// Each variant names the phase that failed so a caller can tell a network
/// outage apart from a broken archive.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to download {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("bad status downloading {url}: {status}")]
    Status { url: String, status: u16 },

    #[error("failed to write downloaded archive: {0}")]
    ArchiveWrite(#[source] io::Error),

    #[error("failed to open archive: {0}")]
    ArchiveOpen(#[source] zip::result::ZipError),

    #[error("file {0} not found in zip archive")]
    MissingEntry(String),

    #[error("failed to extract {entry}: {source}")]
    Extract {
        entry: String,
        #[source]
        source: io::Error,
    },
}

/// Errors produced by a catalog load. Queries themselves never fail.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not determine the user cache directory")]
    NoCacheDir,

    #[error("failed to download city data: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse city data at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("city source unavailable: {0}")]
    Unavailable(String),
}

/// Errors from reading, validating or writing the clock configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no cities configured")]
    NoCities,

    #[error("city at index {0} has no name")]
    MissingName(usize),

    #[error("city '{0}' has no timezone")]
    MissingTimezone(String),

    #[error("invalid timezone '{timezone}' for city '{city}'")]
    InvalidTimezone { city: String, timezone: String },

    #[error("city '{0}' is already configured")]
    DuplicateCity(String),

    #[error("city '{0}' is not configured")]
    UnknownCity(String),
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("failed to load timezone '{0}'")]
    UnknownTimezone(String),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
