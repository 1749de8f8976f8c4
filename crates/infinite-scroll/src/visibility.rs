//! Visibility Module
//!
//! The sentinel side of infinite scroll: observer capability, intersection
//! entries, edge detection, and the vertical intersection math for hosts
//! without a native intersection API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Presentation tuning for when the sentinel counts as visible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Fraction of the sentinel (0.0..=1.0) that must be inside the root
    pub threshold: f64,
    /// Pixels the root is grown by on each edge, so loading starts before the sentinel scrolls in
    pub root_margin: i32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            root_margin: 50,
        }
    }
}

impl VisibilityConfig {
    /// Root margin in CSS form (e.g. `"50px"`) for DOM intersection observers
    pub fn root_margin_css(&self) -> String {
        format!("{}px", self.root_margin)
    }

    pub fn is_visible<H>(&self, entry: &IntersectionEntry<H>) -> bool {
        entry.is_intersecting && entry.intersection_ratio >= self.threshold
    }
}

// ============================================================================
// Observer Capability
// ============================================================================

/// Platform visibility API (an `IntersectionObserver` or equivalent).
///
/// The controller keeps at most one target observed at a time. Entries the
/// platform produces are fed back through
/// [`ListController::on_visibility`](crate::ListController::on_visibility).
pub trait VisibilityObserver: Send + Sync + 'static {
    /// Rendered element handle
    type Handle: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static;

    fn observe(&self, target: &Self::Handle, config: &VisibilityConfig);

    /// Stop observing every target
    fn disconnect(&self);
}

/// One observation reported by the platform
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<H> {
    pub target: H,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl<H> IntersectionEntry<H> {
    pub fn new(target: H, is_intersecting: bool, intersection_ratio: f64) -> Self {
        Self {
            target,
            is_intersecting,
            intersection_ratio,
        }
    }

    /// Build an entry from vertical geometry
    pub fn from_geometry(target: H, element: Span, viewport: Span, root_margin: i32) -> Self {
        let ratio = intersection_ratio(element, viewport, root_margin);
        Self {
            target,
            is_intersecting: ratio > 0.0,
            intersection_ratio: ratio,
        }
    }
}

// ============================================================================
// Edge Detection
// ============================================================================

/// Tracks the armed sentinel and reports only not-visible to visible transitions
#[derive(Clone, Debug)]
pub struct EdgeDetector<H> {
    armed: Option<H>,
    visible: bool,
}

impl<H> Default for EdgeDetector<H> {
    fn default() -> Self {
        Self {
            armed: None,
            visible: false,
        }
    }
}

impl<H: PartialEq> EdgeDetector<H> {
    /// Arm on `target`. Returns false if it was already the armed target.
    pub fn arm(&mut self, target: H) -> bool {
        if self.armed.as_ref() == Some(&target) {
            return false;
        }
        self.armed = Some(target);
        self.visible = false;
        true
    }

    pub fn disarm(&mut self) {
        self.armed = None;
        self.visible = false;
    }

    pub fn armed(&self) -> Option<&H> {
        self.armed.as_ref()
    }

    /// Feed an entry; true on the rising edge for the armed target.
    ///
    /// Entries for any other target are stale and ignored.
    pub fn observe(&mut self, entry: &IntersectionEntry<H>, config: &VisibilityConfig) -> bool {
        if self.armed.as_ref() != Some(&entry.target) {
            return false;
        }
        let visible = config.is_visible(entry);
        let rising = visible && !self.visible;
        self.visible = visible;
        rising
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A vertical extent in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Fraction of `element` inside `viewport` grown by `root_margin` on both edges
///
/// Zero-height elements report 1.0 when they sit inside the grown root.
pub fn intersection_ratio(element: Span, viewport: Span, root_margin: i32) -> f64 {
    let margin = root_margin as f64;
    let root_top = viewport.top - margin;
    let root_bottom = viewport.bottom() + margin;

    if element.height <= 0.0 {
        let inside = element.top >= root_top && element.top <= root_bottom;
        return if inside { 1.0 } else { 0.0 };
    }

    let overlap = (element.bottom().min(root_bottom) - element.top.max(root_top)).max(0.0);
    (overlap / element.height).clamp(0.0, 1.0)
}
