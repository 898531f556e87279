use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for worldclock
#[derive(Debug, Parser)]
#[command(
    name = "worldclock",
    version,
    about = "World clocks in your terminal, with city search from GeoNames"
)]
pub struct CliArgs {
    /// Path to the clock config (default: <config dir>/worldclock.yaml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the cached city dataset (default: <cache dir>/worldclock)
    #[arg(long = "cache-dir", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Override the dataset download URL
    #[arg(long = "dataset-url", global = true)]
    pub dataset_url: Option<String>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the configured clocks, west to east
    Clocks {
        /// Keep redrawing the clocks every second
        #[arg(short = 'w', long)]
        watch: bool,
    },

    /// Search the city database
    Search {
        /// At least three characters of a city name (case-insensitive)
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long = "limit", default_value_t = 50)]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a city from the database to the clocks
    Add {
        /// City name to search for
        query: String,

        /// Which search result to add (1-based)
        #[arg(short = 'p', long = "pick", default_value_t = 1)]
        pick: usize,

        /// Display name for the clock (default: the city name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove clocks by name
    Delete {
        /// Names as shown by `worldclock clocks`
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the largest city using a timezone
    Timezone {
        /// IANA timezone identifier (e.g. Europe/Berlin)
        tz: String,
    },

    /// Download the city dataset into the cache if it is missing
    Fetch,

    /// Delete the cached city dataset and download it again
    Refresh,

    /// Start a background load and report its progress
    Status {
        /// Give up waiting after this many seconds
        #[arg(long = "wait-secs", default_value_t = 30)]
        wait_secs: u64,
    },
}
