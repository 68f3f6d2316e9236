//! Animation scheduler
//!
//! Reference [`Driver`] that owns the per-frame registration set and ticks
//! every registered [`Timeline`] once per frame. Hosts either call
//! [`AnimationScheduler::tick`] from their own run-loop or let the scheduler
//! run a background frame thread with [`AnimationScheduler::start_background`].
//!
//! Registrations are weak: the scheduler never keeps a timeline alive, and a
//! timeline whose handles have all been dropped is pruned on the next frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::clock::{Clock, SystemClock};
use crate::driver::Driver;
use crate::error::AnimationError;
use crate::lock;
use crate::timeline::{TickOutcome, Timeline, TimelineId, WeakTimeline};

new_key_type! {
    /// Slot of a registered timeline
    struct RegistrationKey;
}

/// Callback type for waking up the main thread from the animation thread
///
/// This is called when there are active animations that need to be rendered.
/// The callback should wake up the event loop (e.g., via EventLoopProxy).
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Scheduler settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Frame rate of the background thread
    pub target_fps: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { target_fps: 120 }
    }
}

impl SchedulerConfig {
    fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.target_fps.max(1)))
    }
}

#[derive(Default)]
struct Registry {
    entries: SlotMap<RegistrationKey, WeakTimeline>,
    index: FxHashMap<TimelineId, RegistrationKey>,
}

impl Registry {
    /// Insert or replace; returns true for a new registration
    fn insert(&mut self, timeline: WeakTimeline) -> bool {
        if let Some(&key) = self.index.get(&timeline.id()) {
            if let Some(entry) = self.entries.get_mut(key) {
                *entry = timeline;
                return false;
            }
        }
        let id = timeline.id();
        let key = self.entries.insert(timeline);
        self.index.insert(id, key);
        true
    }

    fn remove(&mut self, id: TimelineId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.entries.remove(key).is_some(),
            None => false,
        }
    }

    /// Drop a slot after its timeline finished, unless it was restarted
    /// in the meantime. Returns the upgraded timeline so the caller can
    /// release it outside the registry lock.
    fn prune(&mut self, key: RegistrationKey) -> Option<Timeline> {
        let entry = self.entries.get(key)?;
        let id = entry.id();
        let timeline = entry.upgrade();
        let keep = timeline.as_ref().is_some_and(Timeline::is_running);
        if !keep {
            self.entries.remove(key);
            self.index.remove(&id);
        }
        timeline
    }
}

/// State shared between the scheduler, its handles and its frame thread
struct SchedulerShared {
    registry: Mutex<Registry>,
    clock: Box<dyn Clock>,
    failures: Mutex<Vec<AnimationError>>,
}

impl SchedulerShared {
    /// Tick every registration once; returns true while any remain
    fn tick(&self) -> bool {
        let now = self.clock.now();

        // Tick without holding the registry so callbacks can start and stop
        // timelines, including their own
        let batch: Vec<(RegistrationKey, WeakTimeline)> = lock(&self.registry)
            .entries
            .iter()
            .map(|(key, timeline)| (key, timeline.clone()))
            .collect();

        let mut done: SmallVec<[RegistrationKey; 8]> = SmallVec::new();
        for (key, weak) in batch {
            let Some(timeline) = weak.upgrade() else {
                done.push(key);
                continue;
            };
            match timeline.tick(now) {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::Finished) => done.push(key),
                Err(err) => {
                    lock(&self.failures).push(err);
                    done.push(key);
                }
            }
        }

        let mut released: SmallVec<[Timeline; 8]> = SmallVec::new();
        let remaining = {
            let mut registry = lock(&self.registry);
            for key in done {
                released.extend(registry.prune(key));
            }
            registry.entries.len()
        };
        drop(released);
        remaining > 0
    }

    fn has_active_animations(&self) -> bool {
        lock(&self.registry)
            .entries
            .values()
            .filter_map(WeakTimeline::upgrade)
            .any(|timeline| timeline.is_running())
    }
}

/// The animation scheduler that ticks all registered timelines
///
/// Timelines reach it through a [`SchedulerHandle`]:
///
/// ```ignore
/// let scheduler = AnimationScheduler::new();
/// let fade = Timeline::new(scheduler.handle(), Duration::from_millis(300), |v| set_opacity(v));
/// fade.start();
/// scheduler.start_background(); // Runs at 120fps in background thread
/// ```
pub struct AnimationScheduler {
    shared: Arc<SchedulerShared>,
    config: SchedulerConfig,
    /// Stop signal for background thread
    stop_flag: Arc<AtomicBool>,
    /// Set by the background thread while animations are active; the main
    /// thread checks and clears it to request window redraws
    needs_redraw: Arc<AtomicBool>,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
    /// Optional callback to wake up the main thread
    wake_callback: Option<WakeCallback>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create a scheduler that reads frame time from `clock`
    pub fn with_clock<C: Clock + 'static>(config: SchedulerConfig, clock: C) -> Self {
        Self {
            shared: Arc::new(SchedulerShared {
                registry: Mutex::new(Registry::default()),
                clock: Box::new(clock),
                failures: Mutex::new(Vec::new()),
            }),
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            needs_redraw: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            wake_callback: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Takes effect the next time the background thread starts
    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps;
    }

    /// Get a handle to this scheduler for passing to timelines
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Tick all registered timelines once
    ///
    /// Finished, failed and dropped timelines are deregistered. Returns true
    /// if any timelines are still registered (need another tick).
    pub fn tick(&self) -> bool {
        self.shared.tick()
    }

    /// Check if any registered timeline is running
    pub fn has_active_animations(&self) -> bool {
        self.shared.has_active_animations()
    }

    /// Get the number of registered timelines
    pub fn animation_count(&self) -> usize {
        lock(&self.shared.registry).entries.len()
    }

    /// Drain callback failures collected since the last call
    pub fn take_failures(&self) -> Vec<AnimationError> {
        std::mem::take(&mut *lock(&self.shared.failures))
    }

    /// Set a wake callback that will be called when animations need a redraw
    ///
    /// This callback is invoked from the background animation thread when there
    /// are active animations. Use this to wake up an event loop from another thread.
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Start the scheduler on a background thread
    ///
    /// The thread ticks at the configured target FPS and sets the
    /// `needs_redraw` flag whenever animations are active. The main thread
    /// should call `take_needs_redraw()` to check and clear this flag.
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let shared = Arc::clone(&self.shared);
        let stop_flag = Arc::clone(&self.stop_flag);
        let needs_redraw = Arc::clone(&self.needs_redraw);
        let wake_callback = self.wake_callback.clone();
        let frame_duration = self.config.frame_duration();
        let target_fps = u64::from(self.config.target_fps.max(1));

        tracing::debug!(fps = target_fps, "animation thread starting");
        self.thread_handle = Some(thread::spawn(move || {
            let mut frames: u64 = 0;
            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                if shared.tick() {
                    needs_redraw.store(true, Ordering::Release);

                    if let Some(ref callback) = wake_callback {
                        // Log once per second
                        if frames % target_fps == 0 {
                            tracing::debug!("animation thread: waking event loop");
                        }
                        callback();
                    }
                }
                frames = frames.wrapping_add(1);

                // Sleep for remaining frame time
                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("animation thread panicked");
            }
            tracing::debug!("animation thread stopped");
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }

    /// Manually request a redraw
    pub fn request_redraw(&self) {
        self.needs_redraw.store(true, Ordering::Release);
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        self.stop_background();
    }
}

/// Weak handle to an [`AnimationScheduler`], implementing [`Driver`]
///
/// Timelines hold one of these. Once the scheduler is dropped the handle is
/// inert: registrations are refused with an error log.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<SchedulerShared>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl Driver for SchedulerHandle {
    fn now(&self) -> Instant {
        match self.shared.upgrade() {
            Some(shared) => shared.clock.now(),
            None => Instant::now(),
        }
    }

    fn register_animation(&self, timeline: &Timeline) {
        let Some(shared) = self.shared.upgrade() else {
            tracing::error!(
                timeline = %timeline.id(),
                "animation scheduler dropped; timeline will never be ticked"
            );
            return;
        };
        if !lock(&shared.registry).insert(timeline.downgrade()) {
            tracing::trace!(timeline = %timeline.id(), "timeline registration replaced");
        }
    }

    fn deregister_animation(&self, timeline: &Timeline) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared.registry).remove(timeline.id());
        }
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::easing::Easing;
    use crate::timeline::Repeat;

    fn manual_scheduler() -> (AnimationScheduler, ManualClock) {
        let clock = ManualClock::new();
        let scheduler = AnimationScheduler::with_clock(SchedulerConfig::default(), clock.clone());
        (scheduler, clock)
    }

    fn recorder() -> (Arc<Mutex<Vec<f32>>>, impl Fn(f32) + Send + Sync + 'static) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink = values.clone();
        (values, move |v| sink.lock().unwrap().push(v))
    }

    #[test]
    fn test_scheduler_tick() {
        let (scheduler, clock) = manual_scheduler();
        let (values, on_tick) = recorder();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), on_tick)
            .with_curve(Easing::Linear);

        timeline.start();
        assert_eq!(scheduler.animation_count(), 1);
        assert!(scheduler.has_active_animations());

        clock.advance_secs(0.5);
        assert!(scheduler.tick());
        clock.advance_secs(0.5);
        assert!(!scheduler.tick());

        assert_eq!(*values.lock().unwrap(), vec![0.5, 1.0]);
        assert_eq!(scheduler.animation_count(), 0);
        assert!(!timeline.is_running());
    }

    #[test]
    fn test_register_twice_keeps_one_entry() {
        let (scheduler, clock) = manual_scheduler();
        let (values, on_tick) = recorder();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), on_tick);

        timeline.start();
        timeline.start();
        assert_eq!(scheduler.animation_count(), 1);

        clock.advance_secs(0.1);
        scheduler.tick();
        assert_eq!(values.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_deregisters() {
        let (scheduler, _clock) = manual_scheduler();
        let (values, on_tick) = recorder();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), on_tick);

        timeline.start();
        timeline.stop();

        assert_eq!(scheduler.animation_count(), 0);
        assert!(!scheduler.tick());
        assert!(values.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dropped_timeline_is_pruned() {
        let (scheduler, _clock) = manual_scheduler();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), |_| {})
            .with_repeat(Repeat::Forever);
        timeline.start();
        drop(timeline);

        assert_eq!(scheduler.animation_count(), 1);
        assert!(!scheduler.tick());
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_panicking_callback_does_not_stop_others() {
        let (scheduler, clock) = manual_scheduler();
        let (values, on_tick) = recorder();
        let healthy = Timeline::new(scheduler.handle(), Duration::from_secs(1), on_tick)
            .with_curve(Easing::Linear)
            .with_repeat(Repeat::Forever);
        let failing = Timeline::new(scheduler.handle(), Duration::from_secs(1), |_| {
            panic!("callback exploded");
        })
        .with_repeat(Repeat::Forever);

        failing.start();
        healthy.start();
        clock.advance_secs(0.25);
        assert!(scheduler.tick());
        clock.advance_secs(0.25);
        assert!(scheduler.tick());

        assert_eq!(scheduler.animation_count(), 1);
        assert!(healthy.is_running());
        assert!(!failing.is_running());
        assert_eq!(*values.lock().unwrap(), vec![0.25, 0.5]);

        let failures = scheduler.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            AnimationError::CallbackPanicked { id, message }
                if *id == failing.id() && message == "callback exploded"
        ));
        assert!(scheduler.take_failures().is_empty());
    }

    #[test]
    fn test_stop_from_callback() {
        let (scheduler, clock) = manual_scheduler();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), |_| {})
            .with_repeat(Repeat::Forever);
        let weak = timeline.downgrade();
        timeline.set_on_tick(move |_| {
            if let Some(timeline) = weak.upgrade() {
                timeline.stop();
            }
        });

        timeline.start();
        clock.advance_secs(0.1);
        scheduler.tick();

        assert!(!timeline.is_running());
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_restart_from_callback_survives_completion() {
        let (scheduler, clock) = manual_scheduler();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_secs(1), |_| {})
            .with_curve(Easing::Linear);
        let weak = timeline.downgrade();
        timeline.set_on_tick(move |v| {
            if v >= 1.0 {
                if let Some(timeline) = weak.upgrade() {
                    timeline.start();
                }
            }
        });

        timeline.start();
        clock.advance_secs(1.0);
        assert!(scheduler.tick());

        assert!(timeline.is_running());
        assert_eq!(scheduler.animation_count(), 1);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());

        // Operations should safely no-op
        let timeline = Timeline::new(handle, Duration::from_secs(1), |_| {});
        timeline.start();
        assert!(timeline.is_running());
        timeline.stop();
        assert!(!timeline.is_running());
    }

    #[test]
    fn test_background_thread_runs_timeline_to_completion() {
        let mut scheduler = AnimationScheduler::with_config(SchedulerConfig { target_fps: 240 });
        let wakes = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let wake_count = wakes.clone();
        scheduler.set_wake_callback(move || {
            wake_count.fetch_add(1, Ordering::Relaxed);
        });

        let (values, on_tick) = recorder();
        let timeline = Timeline::new(scheduler.handle(), Duration::from_millis(50), on_tick)
            .with_curve(Easing::Linear);
        timeline.start();

        scheduler.start_background();
        assert!(scheduler.is_background_running());

        let deadline = Instant::now() + Duration::from_secs(5);
        while timeline.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        scheduler.stop_background();

        assert!(!scheduler.is_background_running());
        assert!(!timeline.is_running());
        assert_eq!(values.lock().unwrap().last().copied(), Some(1.0));
        assert!(wakes.load(Ordering::Relaxed) > 0);
        assert!(scheduler.take_needs_redraw());
        assert!(!scheduler.take_needs_redraw());
    }
}
