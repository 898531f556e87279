// crates/worldclock-core/src/config.rs

//! # Clock Configuration
//!
//! The list of clocks lives in `<config dir>/worldclock.yaml`:
//!
//! ```yaml
//! cities:
//!   - name: Local
//!     timezone: Europe/Berlin
//!   - name: Tokyo
//!     timezone: Asia/Tokyo
//! ```
//!
//! A missing file is created with a single `Local` entry in the system
//! timezone.

use crate::clock::{parse_timezone, Clock};
use crate::error::{ClockError, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "worldclock.yaml";
pub const DEFAULT_CITY_NAME: &str = "Local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockCity {
    pub name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cities: Vec<ClockCity>,
}

impl Config {
    /// The configuration written on first run.
    pub fn default_for(system_timezone: &str) -> Self {
        Self {
            cities: vec![ClockCity {
                name: DEFAULT_CITY_NAME.to_string(),
                timezone: system_timezone.to_string(),
            }],
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks that there is at least one city and that every city has a
    /// name and a resolvable timezone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(ConfigError::NoCities);
        }
        for (i, city) in self.cities.iter().enumerate() {
            if city.name.is_empty() {
                return Err(ConfigError::MissingName(i));
            }
            if city.timezone.is_empty() {
                return Err(ConfigError::MissingTimezone(city.name.clone()));
            }
            if parse_timezone(&city.timezone).is_err() {
                return Err(ConfigError::InvalidTimezone {
                    city: city.name.clone(),
                    timezone: city.timezone.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c.name == name)
    }

    /// Appends a city. Names must be unique and the timezone must resolve.
    pub fn add_city(&mut self, name: &str, timezone: &str) -> Result<(), ConfigError> {
        if self.contains(name) {
            return Err(ConfigError::DuplicateCity(name.to_string()));
        }
        if parse_timezone(timezone).is_err() {
            return Err(ConfigError::InvalidTimezone {
                city: name.to_string(),
                timezone: timezone.to_string(),
            });
        }
        self.cities.push(ClockCity {
            name: name.to_string(),
            timezone: timezone.to_string(),
        });
        Ok(())
    }

    /// Removes every named city. Fails without changing anything if one of
    /// the names is not configured.
    pub fn delete_cities<S: AsRef<str>>(&mut self, names: &[S]) -> Result<usize, ConfigError> {
        if let Some(missing) = names.iter().find(|n| !self.contains(n.as_ref())) {
            return Err(ConfigError::UnknownCity(missing.as_ref().to_string()));
        }
        let before = self.cities.len();
        self.cities
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        Ok(before - self.cities.len())
    }

    /// A city in the system timezone may not be deleted.
    pub fn is_protected(&self, name: &str, system_timezone: &str) -> bool {
        self.cities
            .iter()
            .any(|c| c.name == name && c.timezone == system_timezone)
    }

    pub fn clocks(&self) -> Result<Vec<Clock>, ClockError> {
        self.cities
            .iter()
            .map(|c| Clock::new(&c.name, &c.timezone))
            .collect()
    }
}

/// Reads and writes a [`Config`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<user config dir>/worldclock.yaml`.
    pub fn from_user_config() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the configuration, writing the default first if
    /// the file does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            let tz = system_timezone();
            info!(path = %self.path.display(), timezone = %tz, "creating default config");
            self.save(&Config::default_for(&tz))?;
        }

        let text = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let config = Config::from_yaml(&text)?;
        config.validate()?;
        debug!(cities = config.cities.len(), "config loaded");
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }
        let text = config.to_yaml()?;
        fs::write(&self.path, text).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Best guess at the IANA name of the system timezone; `UTC` if unknown.
///
/// Checks `TZ`, then `/etc/timezone`, then the `/etc/localtime` symlink.
pub fn system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if let Some(tz) = valid_timezone(tz.trim_start_matches(':')) {
            return tz;
        }
    }

    if let Ok(content) = fs::read_to_string("/etc/timezone") {
        if let Some(tz) = valid_timezone(content.trim()) {
            return tz;
        }
    }

    if let Ok(target) = fs::read_link("/etc/localtime") {
        if let Some(tz) = target.to_str().and_then(timezone_from_zoneinfo_path) {
            return tz;
        }
    }

    "UTC".to_string()
}

fn valid_timezone(name: &str) -> Option<String> {
    parse_timezone(name).ok().map(|_| name.to_string())
}

/// `/usr/share/zoneinfo/America/New_York` -> `America/New_York`.
fn timezone_from_zoneinfo_path(path: &str) -> Option<String> {
    let (_, name) = path.split_once("zoneinfo/")?;
    valid_timezone(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            cities: vec![
                ClockCity {
                    name: "Local".into(),
                    timezone: "Europe/Berlin".into(),
                },
                ClockCity {
                    name: "Tokyo".into(),
                    timezone: "Asia/Tokyo".into(),
                },
            ],
        }
    }

    #[test]
    fn parses_existing_schema() {
        let yaml = "cities:\n  - name: Local\n    timezone: Europe/Berlin\n  - name: Tokyo\n    timezone: Asia/Tokyo\n";
        assert_eq!(Config::from_yaml(yaml).unwrap(), sample());
    }

    #[test]
    fn validation_errors() {
        assert!(matches!(Config::default().validate(), Err(ConfigError::NoCities)));

        let mut cfg = sample();
        cfg.cities[1].name.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingName(1))));

        let mut cfg = sample();
        cfg.cities[0].timezone.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingTimezone(_))));

        let mut cfg = sample();
        cfg.cities[1].timezone = "Asia/Atlantis".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTimezone { .. })));
    }

    #[test]
    fn add_rejects_duplicates_and_bad_zones() {
        let mut cfg = sample();
        cfg.add_city("Lima", "America/Lima").unwrap();
        assert!(cfg.contains("Lima"));
        assert!(matches!(
            cfg.add_city("Tokyo", "Asia/Tokyo"),
            Err(ConfigError::DuplicateCity(_))
        ));
        assert!(matches!(
            cfg.add_city("Nowhere", "Nowhere/Else"),
            Err(ConfigError::InvalidTimezone { .. })
        ));
        assert_eq!(cfg.cities.len(), 3);
    }

    #[test]
    fn delete_is_all_or_nothing() {
        let mut cfg = sample();
        assert!(matches!(
            cfg.delete_cities(&["Tokyo", "Paris"]),
            Err(ConfigError::UnknownCity(ref n)) if n == "Paris"
        ));
        assert_eq!(cfg.cities.len(), 2);

        assert_eq!(cfg.delete_cities(&["Tokyo"]).unwrap(), 1);
        assert_eq!(cfg.cities.len(), 1);
    }

    #[test]
    fn protection_follows_system_timezone() {
        let cfg = sample();
        assert!(cfg.is_protected("Local", "Europe/Berlin"));
        assert!(!cfg.is_protected("Tokyo", "Europe/Berlin"));
    }

    #[test]
    fn store_creates_default_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("conf").join(CONFIG_FILE_NAME));

        let cfg = store.load().unwrap();
        assert_eq!(cfg.cities.len(), 1);
        assert_eq!(cfg.cities[0].name, DEFAULT_CITY_NAME);
        assert!(store.path().exists());

        let mut cfg = cfg;
        cfg.add_city("Tokyo", "Asia/Tokyo").unwrap();
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn store_reports_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "cities: []\n").unwrap();
        assert!(matches!(ConfigStore::new(&path).load(), Err(ConfigError::NoCities)));

        fs::write(&path, "cities: [unterminated\n").unwrap();
        assert!(matches!(ConfigStore::new(&path).load(), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn zoneinfo_symlink_targets() {
        assert_eq!(
            timezone_from_zoneinfo_path("/usr/share/zoneinfo/America/New_York").as_deref(),
            Some("America/New_York")
        );
        assert_eq!(
            timezone_from_zoneinfo_path("../usr/share/zoneinfo/Europe/Berlin").as_deref(),
            Some("Europe/Berlin")
        );
        assert!(timezone_from_zoneinfo_path("/etc/localtime.bak").is_none());
    }

    #[test]
    fn clocks_from_config() {
        let clocks = sample().clocks().unwrap();
        assert_eq!(clocks[1].name(), "Tokyo");
    }
}
