// crates/worldclock-core/src/catalog.rs

//! # City Catalog
//!
//! In-memory, thread-safe catalog of [`CityRecord`]s.
//!
//! The catalog starts out empty and is filled by exactly one load, either on
//! a background thread ([`CityCatalog::start_background_load`]) or on the
//! caller's thread ([`CityCatalog::load_blocking`]). Its whole state is one
//! immutable [`Snapshot`] behind a read/write lock that is replaced in a
//! single write, so a reader sees either the empty catalog or the complete
//! one, never something in between.
//!
//! Queries never block on the load and never fail: until the catalog is
//! ready they simply return nothing. A failed load is kept and reported
//! through [`CityCatalog::error`].
//!
//! ```no_run
//! use worldclock_core::{CityCatalog, GeoNamesSource};
//!
//! let catalog = CityCatalog::new(GeoNamesSource::from_user_cache().unwrap());
//! catalog.start_background_load();
//!
//! // ... later, from any thread:
//! if catalog.is_ready() {
//!     for city in catalog.search("berlin", 10) {
//!         println!("{city}");
//!     }
//! } else if let Some(err) = catalog.error() {
//!     eprintln!("Error loading city database: {err}");
//! }
//! ```

use crate::error::CatalogError;
use crate::loader::CitySource;
use crate::record::CityRecord;
use crate::search;
use parking_lot::{Condvar, Mutex, RwLock};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Whole-catalog state. Swapped, never edited.
#[derive(Debug)]
enum Snapshot {
    Pending,
    Ready(Vec<CityRecord>),
    Failed(Arc<CatalogError>),
}

/// Point-in-time view of the load, as reported to callers.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// No load has finished yet (it may not even have started).
    Loading,
    Ready { cities: usize },
    Failed(Arc<CatalogError>),
}

struct Shared {
    source: Box<dyn CitySource>,
    state: RwLock<Arc<Snapshot>>,
    /// Set by whoever gets to run the one load.
    claimed: AtomicBool,
    finished: Mutex<bool>,
    finished_signal: Condvar,
}

#[derive(Clone)]
pub struct CityCatalog {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CityCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityCatalog")
            .field("status", &self.status())
            .finish()
    }
}

impl CityCatalog {
    /// Creates an empty catalog. Nothing is loaded until asked for.
    pub fn new(source: impl CitySource) -> Self {
        Self {
            shared: Arc::new(Shared {
                source: Box::new(source),
                state: RwLock::new(Arc::new(Snapshot::Pending)),
                claimed: AtomicBool::new(false),
                finished: Mutex::new(false),
                finished_signal: Condvar::new(),
            }),
        }
    }

    /// Starts fetch, parse and install on a background thread and returns
    /// at once.
    ///
    /// Only the first call (across this and [`load_blocking`](Self::load_blocking))
    /// starts a load; later calls are ignored and return `false`.
    pub fn start_background_load(&self) -> bool {
        if !self.shared.claim() {
            debug!("city catalog load already started");
            return false;
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("city-catalog-load".to_string())
            .spawn(move || shared.run_load());

        if let Err(e) = spawned {
            self.shared.install(Err(CatalogError::Unavailable(format!(
                "failed to spawn loader thread: {e}"
            ))));
        }
        true
    }

    /// Loads on the calling thread and returns the outcome.
    ///
    /// If a load is already running elsewhere this waits for it rather than
    /// starting a second one; if one already finished its result is returned.
    pub fn load_blocking(&self) -> Result<(), Arc<CatalogError>> {
        if self.shared.claim() {
            self.shared.run_load();
        }
        match self.wait() {
            LoadStatus::Failed(e) => Err(e),
            _ => Ok(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.snapshot(), Snapshot::Ready(_))
    }

    /// The error of a failed load, if any.
    pub fn error(&self) -> Option<Arc<CatalogError>> {
        match &*self.snapshot() {
            Snapshot::Failed(e) => Some(Arc::clone(e)),
            _ => None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.snapshot() {
            Snapshot::Pending => LoadStatus::Loading,
            Snapshot::Ready(records) => LoadStatus::Ready {
                cities: records.len(),
            },
            Snapshot::Failed(e) => LoadStatus::Failed(Arc::clone(e)),
        }
    }

    /// Number of loaded records; zero until ready.
    pub fn len(&self) -> usize {
        match &*self.snapshot() {
            Snapshot::Ready(records) => records.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ranked city search, at most `limit` results.
    ///
    /// Empty when the catalog is not ready or the trimmed query is shorter
    /// than three characters. See [`search::rank_matches`] for the ordering.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CityRecord> {
        match &*self.snapshot() {
            Snapshot::Ready(records) => search::rank_matches(records, query, limit),
            _ => Vec::new(),
        }
    }

    /// Most populous city using exactly `timezone`, if the catalog is ready.
    pub fn find_best_for_timezone(&self, timezone: &str) -> Option<CityRecord> {
        match &*self.snapshot() {
            Snapshot::Ready(records) => search::best_for_timezone(records, timezone).cloned(),
            _ => None,
        }
    }

    /// Blocks until the load has finished and returns its outcome.
    ///
    /// Never returns if no load is ever started.
    pub fn wait(&self) -> LoadStatus {
        let mut finished = self.shared.finished.lock();
        while !*finished {
            self.shared.finished_signal.wait(&mut finished);
        }
        drop(finished);
        self.status()
    }

    /// Like [`wait`](Self::wait) with a deadline. `None` if the load was
    /// still running when the timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<LoadStatus> {
        let deadline = Instant::now() + timeout;
        let mut finished = self.shared.finished.lock();
        while !*finished {
            if self
                .shared
                .finished_signal
                .wait_until(&mut finished, deadline)
                .timed_out()
            {
                break;
            }
        }
        let done = *finished;
        drop(finished);
        done.then(|| self.status())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.shared.state.read();
        Arc::clone(&*guard)
    }
}

impl Shared {
    fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn run_load(&self) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.source.load()))
            .unwrap_or_else(|_| Err(CatalogError::Unavailable("city loader panicked".into())));
        self.install(result);
    }

    fn install(&self, result: crate::error::Result<Vec<CityRecord>>) {
        let snapshot = match result {
            Ok(records) => {
                info!(cities = records.len(), "city catalog ready");
                Snapshot::Ready(records)
            }
            Err(e) => {
                warn!(error = %e, "city catalog load failed");
                Snapshot::Failed(Arc::new(e))
            }
        };
        *self.state.write() = Arc::new(snapshot);

        let mut finished = self.finished.lock();
        *finished = true;
        self.finished_signal.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn records() -> Vec<CityRecord> {
        vec![
            CityRecord::new("Berlin", "DE", "Europe/Berlin", 3_426_354),
            CityRecord::new("Berlinetta", "US", "America/Denver", 0),
            CityRecord::new("Potsdam", "DE", "Europe/Berlin", 182_112),
        ]
    }

    struct FailingSource;

    impl CitySource for FailingSource {
        fn load(&self) -> Result<Vec<CityRecord>> {
            Err(CatalogError::Unavailable("offline".into()))
        }
    }

    struct PanickingSource;

    impl CitySource for PanickingSource {
        fn load(&self) -> Result<Vec<CityRecord>> {
            panic!("boom")
        }
    }

    /// Holds the load until the test sends on the gate.
    struct GatedSource {
        gate: std::sync::Mutex<mpsc::Receiver<()>>,
        calls: Arc<AtomicUsize>,
    }

    impl GatedSource {
        fn new() -> (Self, mpsc::Sender<()>, Arc<AtomicUsize>) {
            let (tx, rx) = mpsc::channel();
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                gate: std::sync::Mutex::new(rx),
                calls: Arc::clone(&calls),
            };
            (source, tx, calls)
        }
    }

    impl CitySource for GatedSource {
        fn load(&self) -> Result<Vec<CityRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.lock().unwrap().recv();
            Ok(records())
        }
    }

    #[test]
    fn new_catalog_is_empty_and_not_ready() {
        let catalog = CityCatalog::new(records());
        assert!(!catalog.is_ready());
        assert!(catalog.error().is_none());
        assert!(catalog.search("berlin", 10).is_empty());
        assert!(catalog.find_best_for_timezone("Europe/Berlin").is_none());
        assert!(matches!(catalog.status(), LoadStatus::Loading));
        assert!(catalog.is_empty());
    }

    #[test]
    fn blocking_load_makes_catalog_ready() {
        let catalog = CityCatalog::new(records());
        catalog.load_blocking().unwrap();

        assert!(catalog.is_ready());
        assert!(catalog.error().is_none());
        assert_eq!(catalog.len(), 3);
        let found: Vec<String> = catalog
            .search("berlin", 10)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(found, vec!["Berlin", "Berlinetta"]);
        assert_eq!(
            catalog.find_best_for_timezone("Europe/Berlin").unwrap().name(),
            "Berlin"
        );
    }

    #[test]
    fn short_query_is_empty_when_ready() {
        let catalog = CityCatalog::new(records());
        catalog.load_blocking().unwrap();
        assert!(catalog.search("be", 10).is_empty());
    }

    #[test]
    fn failed_load_is_captured() {
        let catalog = CityCatalog::new(FailingSource);
        let err = catalog.load_blocking().unwrap_err();

        assert!(err.to_string().contains("offline"));
        assert!(!catalog.is_ready());
        assert!(catalog.error().is_some());
        assert!(catalog.search("berlin", 10).is_empty());
        assert!(matches!(catalog.status(), LoadStatus::Failed(_)));

        // The failure belongs to that catalog only.
        let fresh = CityCatalog::new(records());
        fresh.load_blocking().unwrap();
        assert!(fresh.is_ready());
    }

    #[test]
    fn panicking_source_becomes_error() {
        let catalog = CityCatalog::new(PanickingSource);
        assert!(catalog.start_background_load());
        assert!(matches!(catalog.wait(), LoadStatus::Failed(_)));
        assert!(!catalog.is_ready());
    }

    #[test]
    fn background_load_is_started_once() {
        let (source, gate, calls) = GatedSource::new();
        let catalog = CityCatalog::new(source);

        assert!(catalog.start_background_load());
        assert!(!catalog.start_background_load());

        gate.send(()).unwrap();
        assert!(matches!(catalog.wait(), LoadStatus::Ready { cities: 3 }));
        assert!(!catalog.start_background_load());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn queries_during_load_see_nothing() {
        let (source, gate, _calls) = GatedSource::new();
        let catalog = CityCatalog::new(source);
        catalog.start_background_load();

        assert!(!catalog.is_ready());
        assert!(catalog.error().is_none());
        assert!(catalog.search("berlin", 10).is_empty());
        assert!(catalog.wait_timeout(Duration::from_millis(20)).is_none());

        gate.send(()).unwrap();
        let status = catalog.wait_timeout(Duration::from_secs(10));
        assert!(matches!(status, Some(LoadStatus::Ready { .. })));
        assert_eq!(catalog.search("berlin", 10).len(), 2);
    }

    #[test]
    fn blocking_load_joins_background_load() {
        let (source, gate, calls) = GatedSource::new();
        let catalog = CityCatalog::new(source);
        catalog.start_background_load();

        let waiter = {
            let catalog = catalog.clone();
            thread::spawn(move || catalog.load_blocking())
        };
        gate.send(()).unwrap();

        assert!(waiter.join().unwrap().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let catalog = CityCatalog::new(FailingSource);
        catalog.load_blocking().unwrap_err();
        assert!(!catalog.start_background_load());
        assert!(catalog.load_blocking().is_err());
        assert!(!matches!(catalog.status(), LoadStatus::Loading));
    }
}
