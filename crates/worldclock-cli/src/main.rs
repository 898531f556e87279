//! worldclock: world clocks and city search from the terminal
//!
//! Usage examples
//! --------------
//!
//! - Show the configured clocks, sorted west to east
//!   $ worldclock clocks
//!   $ worldclock clocks --watch   # redraw every second until Ctrl-C
//!
//! - Search the city database (at least three characters)
//!   $ worldclock search berlin
//!   $ worldclock search "san jose" --limit 5 --json
//!
//! - Add the second result for "springfield" as a clock
//!   $ worldclock add springfield --pick 2
//!
//! - Remove clocks (the clock in the system timezone is protected)
//!   $ worldclock delete Tokyo "New York"
//!
//! - Largest city in a timezone
//!   $ worldclock timezone America/Chicago
//!
//! Data source
//! -----------
//!
//! City search uses the GeoNames `cities15000` dump. The first command that
//! needs it downloads the zip into `<cache dir>/worldclock` and extracts
//! `cities15000.txt`; later runs reuse that file as-is. Use
//! `worldclock refresh` to replace it, `--cache-dir` to keep it elsewhere.
mod args;
mod logging;
mod view;

use crate::args::{CliArgs, Commands};
use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use tracing::debug;
use worldclock_core::config::system_timezone;
use worldclock_core::search::normalize_query;
use worldclock_core::{
    CityCatalog, Clock, ConfigStore, FetchConfig, FetchOutcome, Fetcher, GeoNamesSource,
    LoadStatus,
};

/// Same cap the interactive add view uses.
const ADD_SEARCH_LIMIT: usize = 50;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logging::init_logging(args.verbose);

    let store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::from_user_config()?,
    };

    let mut fetch_config = match &args.cache_dir {
        Some(dir) => FetchConfig::with_cache_dir(dir),
        None => FetchConfig::from_user_cache()?,
    };
    if let Some(url) = &args.dataset_url {
        fetch_config = fetch_config.with_url(url);
    }
    debug!(
        config = %store.path().display(),
        cache_dir = %fetch_config.cache_dir.display(),
        "resolved paths"
    );
    let fetcher = Fetcher::new(fetch_config);

    match args.command {
        Commands::Clocks { watch } => {
            let config = store.load().context("Error loading config")?;
            let mut clocks = config.clocks()?;
            if watch {
                watch_clocks(&mut clocks)?;
            } else {
                print!("{}", view::render_clocks(&mut clocks, Utc::now()));
            }
        }

        Commands::Search { query, limit, json } => {
            let catalog = load_catalog(&fetcher)?;
            let results = catalog.search(&query, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if normalize_query(&query).is_none() {
                println!("Type at least 3 characters to search...");
            } else if results.is_empty() {
                println!("No cities found");
            } else {
                println!("Results ({}):", results.len());
                for city in &results {
                    println!("  {city}");
                }
            }
        }

        Commands::Add { query, pick, name } => {
            let catalog = load_catalog(&fetcher)?;
            let results = catalog.search(&query, ADD_SEARCH_LIMIT);
            if results.is_empty() {
                bail!("No cities found matching: {query}");
            }
            let Some(city) = pick.checked_sub(1).and_then(|i| results.get(i)) else {
                bail!("--pick must be between 1 and {}", results.len());
            };

            let mut config = store.load().context("Error loading config")?;
            let name = name.unwrap_or_else(|| city.name().to_string());
            config.add_city(&name, city.timezone())?;
            store.save(&config)?;
            println!("Added {name} ({})", city.timezone());
        }

        Commands::Delete { names } => {
            let mut config = store.load().context("Error loading config")?;
            let system_tz = system_timezone();
            if let Some(protected) = names.iter().find(|n| config.is_protected(n, &system_tz)) {
                bail!("'{protected}' uses the system timezone and cannot be deleted");
            }
            let removed = config.delete_cities(names.as_slice())?;
            // An empty clock list would not load again.
            config.validate()?;
            store.save(&config)?;
            match names.as_slice() {
                [only] => println!("Deleted '{only}'"),
                _ => println!("Deleted {removed} cities"),
            }
        }

        Commands::Timezone { tz } => {
            let catalog = load_catalog(&fetcher)?;
            match catalog.find_best_for_timezone(&tz) {
                Some(city) => println!("{}", view::best_city_line(&city)),
                None => eprintln!("No city found for timezone: {tz}"),
            }
        }

        Commands::Fetch => report_fetch(fetcher.ensure_cached()?),

        Commands::Refresh => {
            if fetcher.invalidate().context("failed to remove cached dataset")? {
                println!("Removed cached dataset");
            }
            report_fetch(fetcher.ensure_cached()?);
        }

        Commands::Status { wait_secs } => {
            let catalog = CityCatalog::new(GeoNamesSource::new(fetcher));
            catalog.start_background_load();
            eprintln!("Loading city database...");
            match catalog.wait_timeout(Duration::from_secs(wait_secs)) {
                Some(LoadStatus::Ready { cities }) => println!("City database ready: {cities} cities"),
                Some(LoadStatus::Failed(e)) => bail!("Error loading city database: {e}"),
                Some(LoadStatus::Loading) | None => {
                    bail!("timeout waiting for city database after {wait_secs}s")
                }
            }
        }
    }

    Ok(())
}

fn load_catalog(fetcher: &Fetcher) -> anyhow::Result<CityCatalog> {
    let catalog = CityCatalog::new(GeoNamesSource::new(fetcher.clone()));
    catalog
        .load_blocking()
        .context("Error loading city database")?;
    Ok(catalog)
}

/// Redraws the clocks on every second tick. Runs until interrupted.
fn watch_clocks(clocks: &mut [Clock]) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    loop {
        let now = Utc::now();
        write!(stdout, "{}{}", view::CLEAR_SCREEN, view::render_clocks(clocks, now))?;
        stdout.flush()?;
        thread::sleep(view::until_next_second(Utc::now()));
    }
}

fn report_fetch(outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::CacheHit(path) => println!("Dataset already cached at {}", path.display()),
        FetchOutcome::Downloaded(path) => println!("Downloaded dataset to {}", path.display()),
    }
}
