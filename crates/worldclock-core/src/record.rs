// crates/worldclock-core/src/record.rs
use serde::{Deserialize, Serialize};

/// One city from the reference dataset.
///
/// Records are immutable once built and compare structurally; the dataset
/// contains duplicate names and nothing here deduplicates them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityRecord {
    name: String,
    country_code: String,
    timezone: String,
    /// Population as published by GeoNames. Zero when the column is blank.
    population: u64,
}

impl CityRecord {
    pub fn new(
        name: impl Into<String>,
        country_code: impl Into<String>,
        timezone: impl Into<String>,
        population: u64,
    ) -> Self {
        Self {
            name: name.into(),
            country_code: country_code.into(),
            timezone: timezone.into(),
            population,
        }
    }

    /// Display name, case preserved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ISO-3166 alpha-2 country code (e.g. "DE").
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// IANA timezone identifier (e.g. "Europe/Berlin").
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn population(&self) -> u64 {
        self.population
    }
}

impl std::fmt::Display for CityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {} ({})", self.name, self.country_code, self.timezone)
    }
}
