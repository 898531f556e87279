// crates/worldclock-core/src/fetch.rs

//! # Dataset Fetcher
//!
//! Makes sure `cities15000.txt` exists in the user cache directory.
//!
//! A file already present at the target path is trusted as-is: there is no
//! staleness check, a stale cache is only replaced after it is deleted (see
//! [`Fetcher::invalidate`]). On a miss the zip archive is downloaded into a
//! temporary file next to the target, the single entry is extracted into a
//! second temporary file and renamed onto the target. A failed or partial
//! download therefore never leaves anything at the target path.

use crate::error::{CatalogError, FetchError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

pub const GEONAMES_URL: &str = "http://download.geonames.org/export/dump/cities15000.zip";
pub const ARCHIVE_NAME: &str = "cities15000.zip";
pub const DATASET_ENTRY: &str = "cities15000.txt";
pub const CACHE_DIR_NAME: &str = "worldclock";

/// Moves the bytes of a remote resource into a local writer.
///
/// The production implementation is [`HttpTransport`]; tests swap in fakes
/// to simulate outages without touching the network.
pub trait DatasetTransport: Send + Sync {
    /// Streams the body of `url` into `out`, returning the byte count.
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError>;
}

/// Plain blocking HTTP GET via reqwest. No timeout: the load runs on its
/// own thread and callers decide how long they are willing to wait.
#[cfg(feature = "http")]
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

#[cfg(feature = "http")]
impl DatasetTransport for HttpTransport {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source: Box::new(e),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .user_agent(concat!("worldclock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(network)?;

        let mut response = client.get(url).send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.copy_to(out).map_err(network)
    }
}

/// Where the dataset comes from and where it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub url: String,
    pub cache_dir: PathBuf,
    pub archive_name: String,
    pub entry_name: String,
}

impl FetchConfig {
    /// GeoNames defaults rooted at `cache_dir`.
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: GEONAMES_URL.to_string(),
            cache_dir: cache_dir.into(),
            archive_name: ARCHIVE_NAME.to_string(),
            entry_name: DATASET_ENTRY.to_string(),
        }
    }

    /// GeoNames defaults rooted at `<user cache dir>/worldclock`.
    pub fn from_user_cache() -> Result<Self, CatalogError> {
        let dir = Self::default_cache_dir().ok_or(CatalogError::NoCacheDir)?;
        Ok(Self::with_cache_dir(dir))
    }

    pub fn default_cache_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(CACHE_DIR_NAME))
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Path of the extracted dataset file.
    pub fn target_path(&self) -> PathBuf {
        self.cache_dir.join(&self.entry_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was already cached; nothing was downloaded.
    CacheHit(PathBuf),
    Downloaded(PathBuf),
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::CacheHit(p) | FetchOutcome::Downloaded(p) => p,
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    config: FetchConfig,
    transport: Arc<dyn DatasetTransport>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    #[cfg(feature = "http")]
    pub fn new(config: FetchConfig) -> Self {
        Self::with_transport(config, HttpTransport)
    }

    pub fn with_transport(config: FetchConfig, transport: impl DatasetTransport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Returns the cached dataset path, downloading it first on a miss.
    pub fn ensure_cached(&self) -> Result<FetchOutcome, FetchError> {
        let target = self.config.target_path();
        if target.is_file() {
            debug!(path = %target.display(), "city dataset cache hit");
            return Ok(FetchOutcome::CacheHit(target));
        }

        let dir = &self.config.cache_dir;
        fs::create_dir_all(dir).map_err(|source| FetchError::CacheDir {
            path: dir.clone(),
            source,
        })?;

        let mut archive = tempfile::Builder::new()
            .prefix(&self.config.archive_name)
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(FetchError::ArchiveWrite)?;

        info!(url = %self.config.url, "downloading city dataset");
        let result = self
            .transport
            .download(&self.config.url, archive.as_file_mut())
            .and_then(|bytes| {
                debug!(bytes, "archive downloaded");
                let file = archive.reopen().map_err(FetchError::ArchiveWrite)?;
                extract_entry(file, &self.config.entry_name, &target)
            });

        // The archive goes away whatever happened above.
        if let Err(e) = archive.close() {
            warn!(error = %e, "failed to remove temporary archive");
        }

        result?;
        info!(path = %target.display(), "city dataset extracted");
        Ok(FetchOutcome::Downloaded(target))
    }

    /// Deletes the cached dataset so the next fetch downloads it again.
    /// Returns whether a file was removed.
    pub fn invalidate(&self) -> io::Result<bool> {
        match fs::remove_file(self.config.target_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Copies `entry_name` out of the zip in `archive` to `target`.
///
/// The bytes land in a temporary file beside `target` first and are renamed
/// into place only once fully written.
pub fn extract_entry(archive: fs::File, entry_name: &str, target: &Path) -> Result<(), FetchError> {
    let extract = |source: io::Error| FetchError::Extract {
        entry: entry_name.to_string(),
        source,
    };

    let mut zip = ZipArchive::new(archive).map_err(FetchError::ArchiveOpen)?;
    let mut entry = match zip.by_name(entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(FetchError::MissingEntry(entry_name.to_string())),
        Err(e) => return Err(FetchError::ArchiveOpen(e)),
    };

    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut out = NamedTempFile::new_in(dir).map_err(extract)?;
    io::copy(&mut entry, &mut out).map_err(extract)?;
    out.persist(target).map_err(|e| extract(e.error))?;
    Ok(())
}
