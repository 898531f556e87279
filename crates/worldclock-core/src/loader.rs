// crates/worldclock-core/src/loader.rs

//! # Data Loader
//!
//! Glues the fetcher and the parser together behind [`CitySource`], which is
//! all the catalog needs to know about where its records come from.

use crate::error::{CatalogError, Result};
use crate::fetch::Fetcher;
use crate::parser;
use crate::record::CityRecord;
use tracing::debug;

/// Produces the complete record set for a catalog, or fails as a whole.
pub trait CitySource: Send + Sync + 'static {
    fn load(&self) -> Result<Vec<CityRecord>>;
}

/// The GeoNames `cities15000` dump, fetched into the local cache on demand.
#[derive(Debug, Clone)]
pub struct GeoNamesSource {
    fetcher: Fetcher,
}

impl GeoNamesSource {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Default GeoNames source using the user cache directory.
    #[cfg(feature = "http")]
    pub fn from_user_cache() -> Result<Self> {
        let config = crate::fetch::FetchConfig::from_user_cache()?;
        Ok(Self::new(Fetcher::new(config)))
    }
}

impl CitySource for GeoNamesSource {
    fn load(&self) -> Result<Vec<CityRecord>> {
        let outcome = self.fetcher.ensure_cached()?;
        let path = outcome.path();
        let cities = parser::parse_file(path).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(count = cities.len(), path = %path.display(), "parsed city dataset");
        Ok(cities)
    }
}

/// A fixed in-memory record set. Handy for embedding and for tests.
impl CitySource for Vec<CityRecord> {
    fn load(&self) -> Result<Vec<CityRecord>> {
        Ok(self.clone())
    }
}
