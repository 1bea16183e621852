//! Input pacing for the picker: search debounce and scroll throttle.
//!
//! Both helpers take the current [`Instant`] as an argument instead of
//! reading a clock or spawning timers, so the host event loop decides when
//! to poll and tests can drive time by hand.

use std::time::{Duration, Instant};

use crate::config::NEAR_BOTTOM_PX;

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Emits the latest input once it has been left alone for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a keystroke; restarts the quiet window.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// Return the pending value if the quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.window => {
                self.pending.take().map(|(text, _)| text)
            }
            _ => None,
        }
    }

    /// Drop any pending value (picker teardown).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// Admits at most one call per `window`; the first call is always admitted.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ---------------------------------------------------------------------------
// ScrollMetrics
// ---------------------------------------------------------------------------

/// Geometry of the scrollable product list, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.scroll_height - (self.scroll_top + self.client_height) < NEAR_BOTTOM_PX
    }
}
