//! Test utilities for infinite-scroll integration tests
#![allow(dead_code, unused_imports)]

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::Level;

// Re-export useful types
pub use infinite_scroll::ankurah_signals::{Get, Peek, Subscribe};
pub use infinite_scroll::pagination::paginate;
pub use infinite_scroll::visibility::Span;
pub use infinite_scroll::{
    IntersectionEntry, ListConfig, ListController, ListError, ListState, LoadOutcome, Page,
    PageSource, Phase, SkipReason, SourceError, StaticSource, VisibilityConfig,
    VisibilityObserver,
};

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        let level = level.parse::<Level>().unwrap_or(Level::INFO);
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_test_writer()
            .try_init();
    }
}

/// Dataset of `n` sequential ids
pub fn numbers(n: u32) -> Vec<u32> {
    (0..n).collect()
}

/// Fully visible entry for element `id`
pub fn visible(id: u32) -> IntersectionEntry<u32> {
    IntersectionEntry::new(id, true, 1.0)
}

/// Entry for element `id` having scrolled out of the root
pub fn hidden(id: u32) -> IntersectionEntry<u32> {
    IntersectionEntry::new(id, false, 0.0)
}

// ============================================================================
// MockObserver
// ============================================================================

#[derive(Debug, Default)]
pub struct ObserverLog {
    /// Element currently observed
    pub observing: Option<u32>,
    /// Every element ever passed to observe, in order
    pub observed: Vec<u32>,
    pub disconnects: usize,
    pub last_config: Option<VisibilityConfig>,
}

/// Stands in for a platform intersection observer, recording what the controller asks of it.
///
/// Clones share one log, so a test keeps a clone after handing one to the controller.
/// Element handles are the item's index in the rendered list.
#[derive(Clone, Default)]
pub struct MockObserver {
    log: Arc<Mutex<ObserverLog>>,
}

impl MockObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observing(&self) -> Option<u32> {
        self.log.lock().unwrap().observing
    }

    pub fn observed(&self) -> Vec<u32> {
        self.log.lock().unwrap().observed.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.log.lock().unwrap().disconnects
    }

    pub fn last_config(&self) -> Option<VisibilityConfig> {
        self.log.lock().unwrap().last_config.clone()
    }
}

impl VisibilityObserver for MockObserver {
    type Handle = u32;

    fn observe(&self, target: &u32, config: &VisibilityConfig) {
        let mut log = self.log.lock().unwrap();
        log.observing = Some(*target);
        log.observed.push(*target);
        log.last_config = Some(config.clone());
    }

    fn disconnect(&self) {
        let mut log = self.log.lock().unwrap();
        log.observing = None;
        log.disconnects += 1;
    }
}

// ============================================================================
// TestSource
// ============================================================================

/// Page source with call accounting, an optional release gate, and injectable failures.
///
/// Clones share their counters and gate.
#[derive(Clone)]
pub struct TestSource<T> {
    data: Vec<T>,
    gate: Option<Arc<Semaphore>>,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<usize>>>,
    fail_next: Arc<AtomicUsize>,
}

impl<T: Clone + Send + Sync + 'static> TestSource<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold every fetch until [`release`](Self::release) lets it through
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` held (or future) fetches resolve
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Make the next `n` fetches fail
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_pages(&self) -> Vec<usize> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PageSource<T> for TestSource<T> {
    async fn fetch_page(&self, page: usize, page_size: NonZeroUsize) -> Result<Page<T>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(page);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| SourceError::Unavailable(e.to_string()))?
                .forget();
        }

        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }

        Ok(paginate(&self.data, page, page_size))
    }
}

// ============================================================================
// Setup helpers
// ============================================================================

pub type TestController = ListController<u32, TestSource<u32>, MockObserver>;

/// Controller over `n` sequential ids with the given page size
pub fn controller(
    n: u32,
    page_size: usize,
) -> Result<(TestController, TestSource<u32>, MockObserver), ListError> {
    let source = TestSource::new(numbers(n));
    let observer = MockObserver::new();
    let ctl = ListController::new(
        source.clone(),
        observer.clone(),
        ListConfig::default().with_page_size(page_size),
    )?;
    Ok((ctl, source, observer))
}

/// Like [`controller`] but every fetch waits for [`TestSource::release`]
pub fn gated_controller(
    n: u32,
    page_size: usize,
) -> Result<(TestController, TestSource<u32>, MockObserver), ListError> {
    let source = TestSource::new(numbers(n)).gated();
    let observer = MockObserver::new();
    let ctl = ListController::new(
        source.clone(),
        observer.clone(),
        ListConfig::default().with_page_size(page_size),
    )?;
    Ok((ctl, source, observer))
}

/// Handle of the last rendered item
pub fn last_handle<T>(state: &ListState<T>) -> Option<u32> {
    state.items.len().checked_sub(1).map(|i| i as u32)
}
