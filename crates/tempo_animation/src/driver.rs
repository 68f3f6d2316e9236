//! Driver collaborator
//!
//! A driver owns the per-frame loop. Timelines register with it on
//! [`Timeline::start`](crate::Timeline::start) and it calls
//! [`Timeline::tick`](crate::Timeline::tick) on each of them once per frame,
//! with a non-decreasing `now`, until the timeline reports
//! [`TickOutcome::Finished`](crate::TickOutcome::Finished) or deregisters.
//!
//! Drivers must only hold a [`WeakTimeline`](crate::WeakTimeline) for each
//! registration; the caller owns the timeline.

use std::sync::Arc;
use std::time::Instant;

use crate::timeline::Timeline;

/// Per-frame scheduler that timelines register with
pub trait Driver: Send + Sync {
    /// Current frame time, used as a timeline's start instant
    fn now(&self) -> Instant;

    /// Add a timeline to the per-frame set, replacing any existing registration
    fn register_animation(&self, timeline: &Timeline);

    /// Remove a timeline from the per-frame set; no-op if absent
    fn deregister_animation(&self, timeline: &Timeline);
}

impl<D: Driver + ?Sized> Driver for Arc<D> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn register_animation(&self, timeline: &Timeline) {
        (**self).register_animation(timeline);
    }

    fn deregister_animation(&self, timeline: &Timeline) {
        (**self).deregister_animation(timeline);
    }
}
