//! Infinite Scroll - incremental list controller with visibility-triggered pagination

pub mod beer;
pub mod error;
pub mod pagination;
pub mod source;
pub mod visibility;

use std::future::Future;
use std::num::NonZeroUsize;

use ankurah_signals::{Mut, Peek, Read};
use serde::{Deserialize, Serialize};

use crate::visibility::EdgeDetector;

// Re-export key types
pub use ankurah_signals;
pub use beer::Beer;
pub use error::{ListError, SourceError};
pub use pagination::{paginate, Page, PageMeta};
pub use source::{PageSource, StaticSource};
pub use visibility::{IntersectionEntry, VisibilityConfig, VisibilityObserver};

// ============================================================================
// Core Types
// ============================================================================

/// Controller configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Items requested per page
    pub page_size: usize,
    pub visibility: VisibilityConfig,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            visibility: VisibilityConfig::default(),
        }
    }
}

impl ListConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityConfig) -> Self {
        self.visibility = visibility;
        self
    }

    fn validate(&self) -> Result<NonZeroUsize, ListError> {
        let threshold = self.visibility.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ListError::InvalidConfig(format!(
                "visibility threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        NonZeroUsize::new(self.page_size)
            .ok_or_else(|| ListError::InvalidConfig("page_size must be at least 1".to_string()))
    }
}

/// Where the controller is in its fetch cycle
///
/// ```text
/// Uninitialized --initialize--> Fetching --resolved--> Idle | Exhausted
/// Idle --sentinel visible--> Fetching --resolved--> Idle | Exhausted
/// any --teardown--> Closed
/// ```
///
/// A failed fetch returns to the phase it started from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// A page request is in flight
    Fetching,
    /// Loaded, and a next page exists
    Idle,
    /// The last page has been loaded
    Exhausted,
    /// Torn down; state is frozen
    Closed,
}

/// The list state exposed to the renderer
#[derive(Clone, Debug)]
pub struct ListState<T> {
    /// Accumulated items in dataset order
    pub items: Vec<T>,
    /// Metadata of the most recently loaded page, `None` until initialized
    pub page: Option<PageMeta>,
    pub phase: Phase,
    /// Most recent fetch failure, cleared by the next successful fetch
    pub error: Option<ListError>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: None,
            phase: Phase::Uninitialized,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Fetching
    }

    /// True if a next page is known to exist
    pub fn has_more(&self) -> bool {
        self.page.as_ref().is_some_and(|p| p.next_page.is_some())
    }
}

/// Why a load request did nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// `load_more` before the first page arrived
    Uninitialized,
    /// `initialize` after the first page arrived
    AlreadyInitialized,
    InFlight,
    Exhausted,
    Closed,
}

/// Result of a load request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Page `page` arrived with `received` items
    Loaded { page: usize, received: usize },
    Skipped(SkipReason),
    /// The fetch resolved after teardown and was dropped
    Discarded,
}

/// How a fetched page combines with the items already held
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Merge {
    Replace,
    Append,
}

/// An admitted fetch. Dropping it unsettled puts the phase back.
struct FetchTicket<T: Clone + Send + Sync + 'static> {
    state: Mut<ListState<T>>,
    page: usize,
    merge: Merge,
    resume: Phase,
    settled: bool,
}

impl<T: Clone + Send + Sync + 'static> Drop for FetchTicket<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut current = self.state.peek();
        if current.phase == Phase::Fetching {
            tracing::debug!("fetch for page {} abandoned, phase back to {:?}", self.page, self.resume);
            current.phase = self.resume;
            self.state.set(current);
        }
    }
}

// ============================================================================
// ListController
// ============================================================================

/// Incremental list controller
///
/// Loads page 1 on [`initialize`](Self::initialize), then appends the next
/// page each time the sentinel (the last rendered item) becomes visible.
/// At most one fetch is in flight: the phase moves to [`Phase::Fetching`]
/// when a load is requested, before the source is called.
pub struct ListController<T, S, O>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
    O: VisibilityObserver,
{
    source: S,
    observer: O,
    page_size: NonZeroUsize,
    visibility: VisibilityConfig,
    state: Mut<ListState<T>>,
    sentinel: Mut<EdgeDetector<O::Handle>>,
}

impl<T, S, O> ListController<T, S, O>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
    O: VisibilityObserver,
{
    /// Create a controller. Nothing is fetched until [`initialize`](Self::initialize).
    ///
    /// # Arguments
    /// * `source` - Where pages come from
    /// * `observer` - Platform visibility API used to watch the sentinel
    /// * `config` - Page size and visibility tuning
    pub fn new(source: S, observer: O, config: ListConfig) -> Result<Self, ListError> {
        let page_size = config.validate()?;
        Ok(Self {
            source,
            observer,
            page_size,
            visibility: config.visibility,
            state: Mut::new(ListState::default()),
            sentinel: Mut::new(EdgeDetector::default()),
        })
    }

    // Accessors
    pub fn state(&self) -> Read<ListState<T>> {
        self.state.read()
    }

    pub fn phase(&self) -> Phase {
        self.state.peek().phase
    }

    pub fn items(&self) -> Vec<T> {
        self.state.peek().items
    }

    pub fn page(&self) -> Option<PageMeta> {
        self.state.peek().page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn visibility(&self) -> &VisibilityConfig {
        &self.visibility
    }

    /// The element currently observed as sentinel, if any
    pub fn armed_sentinel(&self) -> Option<O::Handle> {
        self.sentinel.peek().armed().cloned()
    }

    /// Request page 1 and replace the (empty) item list with it.
    ///
    /// Only effective while uninitialized; a failure is stored in
    /// [`ListState::error`] and may be retried by calling this again.
    pub fn initialize(&self) -> impl Future<Output = Result<LoadOutcome, ListError>> + '_ {
        let ticket = self.admit(Merge::Replace);
        self.run(ticket)
    }

    /// Request the next page and append it.
    ///
    /// A no-op when uninitialized, in flight, exhausted or torn down. The
    /// in-flight gate is taken here, not when the returned future is first
    /// polled.
    pub fn load_more(&self) -> impl Future<Output = Result<LoadOutcome, ListError>> + '_ {
        let ticket = self.admit(Merge::Append);
        self.run(ticket)
    }

    /// Register `target` (the last rendered item) as the sentinel.
    ///
    /// Call again whenever the last item changes. Returns true if `target`
    /// is now freshly observed.
    pub fn arm_sentinel(&self, target: O::Handle) -> bool {
        let current = self.state.peek();
        match current.phase {
            Phase::Closed | Phase::Exhausted => {
                tracing::debug!("arm_sentinel: ignored in {:?}", current.phase);
                return false;
            }
            _ if current.items.is_empty() => {
                tracing::debug!("arm_sentinel: ignored, no items rendered");
                return false;
            }
            _ => {}
        }

        let mut sentinel = self.sentinel.peek();
        let had_target = sentinel.armed().is_some();
        if !sentinel.arm(target.clone()) {
            return false;
        }
        if had_target {
            self.observer.disconnect();
        }
        self.observer.observe(&target, &self.visibility);
        self.sentinel.set(sentinel);
        tracing::debug!("arm_sentinel: observing {:?}", target);
        true
    }

    /// Feed a visibility entry from the platform observer.
    ///
    /// Returns the load future when the armed sentinel crosses from not
    /// visible to visible and a load was admitted.
    pub fn on_visibility(
        &self,
        entry: &IntersectionEntry<O::Handle>,
    ) -> Option<impl Future<Output = Result<LoadOutcome, ListError>> + '_> {
        tracing::trace!(
            "on_visibility: target={:?}, intersecting={}, ratio={}",
            entry.target,
            entry.is_intersecting,
            entry.intersection_ratio
        );

        let mut sentinel = self.sentinel.peek();
        let rising = sentinel.observe(entry, &self.visibility);
        self.sentinel.set(sentinel);
        if !rising {
            return None;
        }

        match self.admit(Merge::Append) {
            Ok(ticket) => Some(self.run(Ok(ticket))),
            Err(reason) => {
                tracing::debug!("on_visibility: sentinel visible, load skipped ({:?})", reason);
                None
            }
        }
    }

    /// Release the observer and freeze state. Fetches still in flight are
    /// discarded when they resolve.
    pub fn teardown(&self) {
        let mut current = self.state.peek();
        if current.phase == Phase::Closed {
            return;
        }
        tracing::debug!("teardown from {:?}", current.phase);
        current.phase = Phase::Closed;
        self.state.set(current);
        self.release_sentinel();
    }

    fn release_sentinel(&self) {
        let mut sentinel = self.sentinel.peek();
        if sentinel.armed().is_none() {
            return;
        }
        sentinel.disarm();
        self.sentinel.set(sentinel);
        self.observer.disconnect();
    }

    /// Check the phase gate and move to Fetching if admitted
    fn admit(&self, merge: Merge) -> Result<FetchTicket<T>, SkipReason> {
        let mut current = self.state.peek();
        let page = match (current.phase, merge) {
            (Phase::Closed, _) => return Err(SkipReason::Closed),
            (Phase::Fetching, _) => return Err(SkipReason::InFlight),
            (Phase::Uninitialized, Merge::Replace) => 1,
            (_, Merge::Replace) => return Err(SkipReason::AlreadyInitialized),
            (Phase::Uninitialized, Merge::Append) => return Err(SkipReason::Uninitialized),
            (Phase::Exhausted, Merge::Append) => return Err(SkipReason::Exhausted),
            (Phase::Idle, Merge::Append) => match current.page.as_ref().and_then(|p| p.next_page) {
                Some(next) => next,
                None => return Err(SkipReason::Exhausted),
            },
        };

        let resume = current.phase;
        current.phase = Phase::Fetching;
        self.state.set(current);
        tracing::debug!("fetching page {} ({:?})", page, merge);

        Ok(FetchTicket {
            state: self.state.clone(),
            page,
            merge,
            resume,
            settled: false,
        })
    }

    /// The single fetch primitive behind `initialize` and `load_more`
    async fn run(&self, ticket: Result<FetchTicket<T>, SkipReason>) -> Result<LoadOutcome, ListError> {
        let mut ticket = match ticket {
            Ok(ticket) => ticket,
            Err(reason) => {
                tracing::debug!("load skipped: {:?}", reason);
                return Ok(LoadOutcome::Skipped(reason));
            }
        };

        let result = self.source.fetch_page(ticket.page, self.page_size).await;
        ticket.settled = true;

        let mut current = self.state.peek();
        if current.phase != Phase::Fetching {
            tracing::debug!("page {} resolved after teardown, discarding", ticket.page);
            return Ok(LoadOutcome::Discarded);
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                let err = ListError::fetch_failed(ticket.page, e);
                tracing::warn!("{}", err);
                current.phase = ticket.resume;
                current.error = Some(err.clone());
                self.state.set(current);
                // A still-visible sentinel reports no new edge; re-arming yields a fresh one
                if ticket.merge == Merge::Append {
                    self.release_sentinel();
                }
                return Err(err);
            }
        };

        let received = page.items.len();
        match ticket.merge {
            Merge::Replace => current.items = page.items,
            Merge::Append => current.items.extend(page.items),
        }
        let exhausted = page.meta.is_last();
        current.phase = if exhausted { Phase::Exhausted } else { Phase::Idle };
        current.page = Some(page.meta);
        current.error = None;
        tracing::debug!(
            "page {} loaded: received={}, total={}, phase={:?}",
            ticket.page,
            received,
            current.items.len(),
            current.phase
        );
        self.state.set(current);

        // The old sentinel is no longer the last item; the renderer re-arms on the new one
        if exhausted || (ticket.merge == Merge::Append && received > 0) {
            self.release_sentinel();
        }

        Ok(LoadOutcome::Loaded {
            page: ticket.page,
            received,
        })
    }
}

impl<T, S, O> Drop for ListController<T, S, O>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
    O: VisibilityObserver,
{
    fn drop(&mut self) {
        if self.state.peek().phase != Phase::Closed {
            self.release_sentinel();
        }
    }
}
