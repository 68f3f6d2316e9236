//! Tempo Animation System
//!
//! Frame-driven animation timelines with a catalog of easing curves.
//!
//! # Features
//!
//! - **Easing Curves**: Linear, power, sine, circular, exponential, back,
//!   bounce and elastic families with In/Out/InOut variants, plus cubic bezier
//! - **Timelines**: Duration, curve, repeat count and auto-reverse, with a
//!   per-frame callback receiving the eased progress
//! - **Driver Agnostic**: Timelines talk to their frame loop through the
//!   [`Driver`] trait and only ever get weakly registered
//! - **Scheduler**: A reference driver that can run on its own thread
//! - **Typed Tweens**: Interpolate floats, positions and colors

pub mod clock;
pub mod driver;
pub mod easing;
pub mod error;
pub mod scheduler;
pub mod timeline;
pub mod values;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::Driver;
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use scheduler::{AnimationScheduler, SchedulerConfig, SchedulerHandle, WakeCallback};
pub use timeline::{
    Direction, Repeat, TickCallback, TickOutcome, Timeline, TimelineId, WeakTimeline,
};
pub use values::{Color, Interpolate, Position};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// No user callback ever runs while one of the engine's locks is held, so a
/// poisoned lock cannot hold half-updated state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
