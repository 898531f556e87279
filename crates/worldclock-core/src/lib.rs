// crates/worldclock-core/src/lib.rs

//! worldclock-core
//! ===============
//!
//! The data side of the `worldclock` terminal app:
//!
//! - [`CityCatalog`]: searchable in-memory catalog of world cities, loaded
//!   once in the background from the GeoNames `cities15000` dump.
//! - [`fetch`] / [`parser`]: download-and-cache and row parsing for that dump.
//! - [`config`]: the YAML list of configured clocks.
//! - [`clock`]: timezone-aware time/date/offset formatting.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod parser;
pub mod record;
pub mod search;

// Re-exports
pub use crate::catalog::{CityCatalog, LoadStatus};
pub use crate::clock::{sort_by_utc_offset, Clock};
pub use crate::config::{ClockCity, Config, ConfigStore};
pub use crate::error::{CatalogError, ClockError, ConfigError, FetchError, Result};
pub use crate::fetch::{DatasetTransport, FetchConfig, FetchOutcome, Fetcher};
#[cfg(feature = "http")]
pub use crate::fetch::HttpTransport;
pub use crate::loader::{CitySource, GeoNamesSource};
pub use crate::record::CityRecord;
