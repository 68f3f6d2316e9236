//! Animation timelines
//!
//! A [`Timeline`] advances linear progress from 0 to 1 over its duration,
//! reshapes it with an [`Easing`] curve and hands the eased value to a
//! per-frame callback. It repeats, optionally alternating direction, and
//! registers itself with a [`Driver`] while running.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use tempo_animation::{AnimationScheduler, Easing, ManualClock, Repeat, SchedulerConfig, Timeline};
//!
//! let clock = ManualClock::new();
//! let scheduler = AnimationScheduler::with_clock(SchedulerConfig::default(), clock.clone());
//!
//! let position = Arc::new(Mutex::new(0.0));
//! let target = position.clone();
//! let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), move |v| {
//!     *target.lock().unwrap() = v * 350.0;
//! })
//! .with_curve(Easing::Linear)
//! .with_repeat(Repeat::Forever)
//! .with_auto_reverse(true);
//!
//! timeline.start();
//! clock.advance(Duration::from_millis(500));
//! scheduler.tick();
//! assert_eq!(*position.lock().unwrap(), 175.0);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use crate::driver::Driver;
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::lock;
use crate::values::Interpolate;

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a timeline, shared by all of its handles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(u64);

impl TimelineId {
    fn next() -> Self {
        Self(NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How many times a timeline plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play `n + 1` times
    Count(u32),
    /// Loop until stopped
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

/// Direction of the current cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// What a tick tells the driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking this timeline
    Continue,
    /// The timeline is idle and can be deregistered
    Finished,
}

/// Callback invoked with the eased progress every frame
pub type TickCallback = Arc<dyn Fn(f32) + Send + Sync>;

struct TimelineState {
    duration: Duration,
    curve: Easing,
    repeat: Repeat,
    auto_reverse: bool,
    on_tick: TickCallback,

    running: bool,
    /// Bumped on every start so late results of an older run can be ignored
    run: u64,
    start_time: Instant,
    repetition: u32,
    direction: Direction,
}

impl TimelineState {
    fn linear_progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Close the current cycle and either arm the next one or go idle.
    ///
    /// The next cycle carries the overshoot past the cycle end so repeats stay
    /// in phase; a stall of a whole cycle or more re-anchors at `now`.
    fn complete_cycle(&mut self, now: Instant, elapsed: Duration) -> TickOutcome {
        self.repetition = self.repetition.saturating_add(1);
        let again = match self.repeat {
            Repeat::Forever => true,
            Repeat::Count(n) => self.repetition <= n,
        };
        if !again {
            self.running = false;
            return TickOutcome::Finished;
        }

        let overshoot = elapsed.saturating_sub(self.duration);
        self.start_time = if overshoot < self.duration {
            now.checked_sub(overshoot).unwrap_or(now)
        } else {
            now
        };
        if self.auto_reverse {
            self.direction = self.direction.flip();
        }
        TickOutcome::Continue
    }
}

struct TimelineShared {
    id: TimelineId,
    driver: Box<dyn Driver>,
    /// Serializes start/stop together with their driver calls
    lifecycle: Mutex<()>,
    state: Mutex<TimelineState>,
}

/// A single animated transition driven frame by frame
///
/// `Timeline` is a cheap handle; clones control the same animation. The driver
/// only keeps a [`WeakTimeline`], so dropping every handle ends the animation
/// on the driver's next frame.
#[derive(Clone)]
pub struct Timeline {
    shared: Arc<TimelineShared>,
}

impl Timeline {
    /// Create an idle timeline that reports to `driver` once started
    pub fn new<D, F>(driver: D, duration: Duration, on_tick: F) -> Self
    where
        D: Driver + 'static,
        F: Fn(f32) + Send + Sync + 'static,
    {
        let start_time = driver.now();
        Self {
            shared: Arc::new(TimelineShared {
                id: TimelineId::next(),
                driver: Box::new(driver),
                lifecycle: Mutex::new(()),
                state: Mutex::new(TimelineState {
                    duration,
                    curve: Easing::default(),
                    repeat: Repeat::default(),
                    auto_reverse: false,
                    on_tick: Arc::new(on_tick),
                    running: false,
                    run: 0,
                    start_time,
                    repetition: 0,
                    direction: Direction::Forward,
                }),
            }),
        }
    }

    /// Animate between two values, passing the interpolated value each frame
    pub fn tween<D, T, F>(driver: D, from: T, to: T, duration: Duration, on_value: F) -> Self
    where
        D: Driver + 'static,
        T: Interpolate + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::new(driver, duration, move |t| on_value(from.lerp(&to, t)))
    }

    pub fn with_curve(self, curve: Easing) -> Self {
        self.set_curve(curve);
        self
    }

    pub fn with_repeat(self, repeat: Repeat) -> Self {
        self.set_repeat(repeat);
        self
    }

    pub fn with_auto_reverse(self, auto_reverse: bool) -> Self {
        self.set_auto_reverse(auto_reverse);
        self
    }

    pub fn set_curve(&self, curve: Easing) {
        lock(&self.shared.state).curve = curve;
    }

    pub fn set_repeat(&self, repeat: Repeat) {
        lock(&self.shared.state).repeat = repeat;
    }

    pub fn set_auto_reverse(&self, auto_reverse: bool) {
        lock(&self.shared.state).auto_reverse = auto_reverse;
    }

    pub fn set_duration(&self, duration: Duration) {
        lock(&self.shared.state).duration = duration;
    }

    /// Replace the per-frame callback
    ///
    /// A callback that needs to control its own timeline should capture a
    /// [`WeakTimeline`] from [`Timeline::downgrade`]; a strong handle would
    /// keep the timeline alive forever.
    pub fn set_on_tick<F>(&self, on_tick: F)
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        lock(&self.shared.state).on_tick = Arc::new(on_tick);
    }

    /// Start from the beginning and register with the driver.
    ///
    /// Starting a running timeline restarts it; the driver keeps a single
    /// registration.
    pub fn start(&self) {
        let _lifecycle = lock(&self.shared.lifecycle);
        let now = self.shared.driver.now();
        {
            let mut state = lock(&self.shared.state);
            state.start_time = now;
            state.repetition = 0;
            state.direction = Direction::Forward;
            state.running = true;
            state.run = state.run.wrapping_add(1);
        }
        self.shared.driver.register_animation(self);
        tracing::debug!(timeline = %self.id(), "timeline started");
    }

    /// Stop and deregister; configuration is kept for a later restart.
    ///
    /// Stopping an idle timeline does nothing. Safe to call from the
    /// timeline's own callback.
    pub fn stop(&self) {
        let _lifecycle = lock(&self.shared.lifecycle);
        let was_running = std::mem::replace(&mut lock(&self.shared.state).running, false);
        if was_running {
            self.shared.driver.deregister_animation(self);
            tracing::debug!(timeline = %self.id(), "timeline stopped");
        }
    }

    /// Advance to `now` and invoke the callback with the eased progress.
    ///
    /// Called by the driver once per frame. Returns
    /// [`TickOutcome::Finished`] once the last cycle has played, or if the
    /// timeline is not running. A panicking callback stops the timeline and
    /// is returned as [`AnimationError::CallbackPanicked`].
    pub fn tick(&self, now: Instant) -> Result<TickOutcome> {
        let (value, outcome, on_tick, run) = {
            let mut state = lock(&self.shared.state);
            if !state.running {
                return Ok(TickOutcome::Finished);
            }

            let elapsed = now.saturating_duration_since(state.start_time);
            let linear = state.linear_progress(elapsed);
            let progress = match state.direction {
                Direction::Forward => linear,
                Direction::Backward => 1.0 - linear,
            };
            let value = state.curve.apply(progress as f32);

            let outcome = if linear < 1.0 {
                TickOutcome::Continue
            } else {
                let outcome = state.complete_cycle(now, elapsed);
                tracing::trace!(
                    timeline = %self.id(),
                    repetition = state.repetition,
                    direction = ?state.direction,
                    "timeline cycle complete"
                );
                outcome
            };
            (value, outcome, Arc::clone(&state.on_tick), state.run)
        };

        // No lock is held here, so the callback may stop or restart us
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| on_tick(value))) {
            let message = panic_message(payload.as_ref());
            {
                let mut state = lock(&self.shared.state);
                if state.run == run {
                    state.running = false;
                }
            }
            tracing::error!(timeline = %self.id(), %message, "timeline callback panicked");
            return Err(AnimationError::CallbackPanicked {
                id: self.id(),
                message,
            });
        }

        if outcome == TickOutcome::Finished {
            tracing::debug!(timeline = %self.id(), "timeline finished");
        }
        Ok(outcome)
    }

    pub fn id(&self) -> TimelineId {
        self.shared.id
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.state).running
    }

    /// Number of completed cycles in the current run
    pub fn repetition(&self) -> u32 {
        lock(&self.shared.state).repetition
    }

    pub fn direction(&self) -> Direction {
        lock(&self.shared.state).direction
    }

    pub fn duration(&self) -> Duration {
        lock(&self.shared.state).duration
    }

    pub fn curve(&self) -> Easing {
        lock(&self.shared.state).curve
    }

    pub fn repeat(&self) -> Repeat {
        lock(&self.shared.state).repeat
    }

    pub fn auto_reverse(&self) -> bool {
        lock(&self.shared.state).auto_reverse
    }

    /// Non-owning handle, as held by drivers
    pub fn downgrade(&self) -> WeakTimeline {
        WeakTimeline {
            id: self.shared.id,
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.shared.state);
        f.debug_struct("Timeline")
            .field("id", &self.shared.id)
            .field("duration", &state.duration)
            .field("curve", &state.curve)
            .field("repeat", &state.repeat)
            .field("auto_reverse", &state.auto_reverse)
            .field("running", &state.running)
            .field("repetition", &state.repetition)
            .field("direction", &state.direction)
            .finish_non_exhaustive()
    }
}

/// Weak reference to a [`Timeline`] that does not keep it alive
#[derive(Clone, Debug)]
pub struct WeakTimeline {
    id: TimelineId,
    shared: Weak<TimelineShared>,
}

impl WeakTimeline {
    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Timeline> {
        self.shared.upgrade().map(|shared| Timeline { shared })
    }

    /// Check if any strong handle is still alive
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
