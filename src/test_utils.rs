//! Test utilities for reducer tests.
//!
//! This module provides shared fixtures and helpers so unit, integration,
//! and property tests all observe the driver through the same seams: a
//! recording platform for command assertions and a simulated platform with a
//! virtual clock for deterministic end-to-end episodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::queue::SegQueue;
use parking_lot::Mutex;

use crate::config::ReducerConfig;
use crate::di::{DIContainer, DIScope};
use crate::platform::{GcTrigger, PlatformCommand, TimerScheduler};
use crate::reducer::{Event, MemoryReducer};

/// Platform that records every outbound command for later assertions.
///
/// # Examples
///
/// ```
/// use memreduce::test_utils::TestFixture;
/// use memreduce::{Event, PlatformCommand};
///
/// let fixture = TestFixture::new();
/// fixture
///     .reducer
///     .notify_mark_compact(Event::mark_compact(0.0, true));
///
/// let long_delay = fixture.reducer.config().long_delay_ms;
/// assert_eq!(
///     fixture.platform.drain(),
///     vec![PlatformCommand::ScheduleTimer(long_delay)]
/// );
/// ```
pub struct RecordingPlatform {
    commands: SegQueue<PlatformCommand>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            commands: SegQueue::new(),
        }
    }

    /// Take every recorded command, oldest first.
    pub fn drain(&self) -> Vec<PlatformCommand> {
        let mut drained = Vec::new();
        while let Some(command) = self.commands.pop() {
            drained.push(command);
        }
        drained
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerScheduler for RecordingPlatform {
    fn schedule_timer(&self, delay_ms: f64) {
        self.commands.push(PlatformCommand::ScheduleTimer(delay_ms));
    }
}

impl GcTrigger for RecordingPlatform {
    fn start_incremental_gc(&self) {
        self.commands.push(PlatformCommand::StartIncrementalGc);
    }
}

// Event constructors shared across the test suites.

pub fn timer_event_low_allocation_rate(time_ms: f64) -> Event {
    Event::timer(time_ms, true, true)
}

pub fn timer_event_high_allocation_rate(time_ms: f64) -> Event {
    Event::timer(time_ms, false, true)
}

/// A quiet tick observing a foreign incremental GC in progress.
pub fn timer_event_pending_gc(time_ms: f64) -> Event {
    Event::timer(time_ms, true, false)
}

pub fn mark_compact_event_garbage_left(time_ms: f64) -> Event {
    Event::mark_compact(time_ms, true)
}

pub fn mark_compact_event_no_garbage_left(time_ms: f64) -> Event {
    Event::mark_compact(time_ms, false)
}

pub fn context_disposed_event(time_ms: f64) -> Event {
    Event::context_disposed(time_ms)
}

pub fn background_idle_event(time_ms: f64, can_start_incremental_gc: bool) -> Event {
    Event::background_idle(time_ms, can_start_incremental_gc)
}

/// Fixture that provides an isolated container, reducer, and recording
/// platform for each test.
pub struct TestFixture {
    pub container: Arc<DIContainer>,
    pub reducer: Arc<MemoryReducer>,
    pub platform: Arc<RecordingPlatform>,
    _scope: DIScope,
}

impl TestFixture {
    /// Fixture with the default policy constants.
    pub fn new() -> Self {
        Self::new_with_config(ReducerConfig::default())
    }

    /// Fixture with custom policy constants.
    pub fn new_with_config(config: ReducerConfig) -> Self {
        let platform = Arc::new(RecordingPlatform::new());
        let container = Arc::new(DIContainer::with_platform(
            Arc::clone(&platform) as Arc<dyn TimerScheduler>,
            Arc::clone(&platform) as Arc<dyn GcTrigger>,
        ));
        let reducer = container
            .create_memory_reducer(config)
            .expect("fixture config must be valid");
        let scope = DIScope::new(Arc::clone(&container));

        Self {
            container,
            reducer,
            platform,
            _scope: scope,
        }
    }

    /// Fixture with the smallest legal GC cap and short delays, for tests
    /// that exercise the cap boundary.
    pub fn minimal() -> Self {
        Self::new_with_config(ReducerConfig {
            long_delay_ms: 100.0,
            short_delay_ms: 10.0,
            max_number_of_gcs: 2,
        })
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience macro for creating a test fixture.
#[macro_export]
macro_rules! test_fixture {
    () => {
        $crate::test_utils::TestFixture::new()
    };
    (minimal) => {
        $crate::test_utils::TestFixture::minimal()
    };
    ($config:expr) => {
        $crate::test_utils::TestFixture::new_with_config($config)
    };
}

/// Convenience function for tests that just need a reducer.
pub fn test_reducer() -> Arc<MemoryReducer> {
    Arc::clone(&TestFixture::new().reducer)
}

/// Simulated platform: a virtual clock plus a queue of pending timer due
/// times. Scheduling is relative to the clock at the moment of the request,
/// like a real delayed task queue.
struct SimPlatform {
    now_ms: Mutex<f64>,
    due_timers: Mutex<Vec<f64>>,
    gc_in_progress: AtomicBool,
}

impl TimerScheduler for SimPlatform {
    fn schedule_timer(&self, delay_ms: f64) {
        let now = *self.now_ms.lock();
        self.due_timers.lock().push(now + delay_ms);
    }
}

impl GcTrigger for SimPlatform {
    fn start_incremental_gc(&self) {
        self.gc_in_progress.store(true, Ordering::SeqCst);
    }
}

/// Deterministic end-to-end harness: drives a reducer through whole
/// episodes by advancing a virtual clock and replaying the commands the
/// driver issues back into it as events.
pub struct EpisodeSimulator {
    reducer: Arc<MemoryReducer>,
    platform: Arc<SimPlatform>,
}

impl EpisodeSimulator {
    pub fn new(config: ReducerConfig) -> Self {
        let platform = Arc::new(SimPlatform {
            now_ms: Mutex::new(0.0),
            due_timers: Mutex::new(Vec::new()),
            gc_in_progress: AtomicBool::new(false),
        });
        let reducer = Arc::new(
            MemoryReducer::new(
                config,
                Arc::clone(&platform) as Arc<dyn TimerScheduler>,
                Arc::clone(&platform) as Arc<dyn GcTrigger>,
            )
            .expect("simulator config must be valid"),
        );
        Self { reducer, platform }
    }

    pub fn reducer(&self) -> &Arc<MemoryReducer> {
        &self.reducer
    }

    pub fn now_ms(&self) -> f64 {
        *self.platform.now_ms.lock()
    }

    pub fn advance_clock(&self, delta_ms: f64) {
        *self.platform.now_ms.lock() += delta_ms;
    }

    pub fn pending_timer_count(&self) -> usize {
        self.platform.due_timers.lock().len()
    }

    /// Whether the last requested incremental GC is still running.
    pub fn gc_in_progress(&self) -> bool {
        self.platform.gc_in_progress.load(Ordering::SeqCst)
    }

    /// Complete a mutator-initiated full mark-compact at the current time.
    pub fn mutator_gc(&self, next_gc_likely_to_collect_more: bool) {
        self.reducer
            .notify_mark_compact(Event::mark_compact(self.now_ms(), next_gc_likely_to_collect_more));
    }

    pub fn dispose_context(&self) {
        self.reducer
            .notify_context_disposed(Event::context_disposed(self.now_ms()));
    }

    pub fn notify_idle(&self) {
        let can_start = !self.gc_in_progress();
        self.reducer
            .notify_background_idle_notification(Event::background_idle(self.now_ms(), can_start));
    }

    /// Pop the earliest pending timer, advance the clock to its due time,
    /// and deliver the tick. Returns `false` when no timer is pending.
    pub fn fire_next_timer(&self, low_allocation_rate: bool) -> bool {
        let due = {
            let mut timers = self.platform.due_timers.lock();
            if timers.is_empty() {
                return false;
            }
            let mut earliest = 0;
            for (i, due) in timers.iter().enumerate() {
                if *due < timers[earliest] {
                    earliest = i;
                }
            }
            timers.swap_remove(earliest)
        };

        {
            let mut now = self.platform.now_ms.lock();
            if due > *now {
                *now = due;
            }
        }

        let can_start = !self.gc_in_progress();
        self.reducer
            .notify_timer(Event::timer(self.now_ms(), low_allocation_rate, can_start));
        true
    }

    /// Finish the reducer-initiated incremental cycle after `duration_ms`
    /// of virtual time.
    pub fn finish_reducer_gc(&self, duration_ms: f64, next_gc_likely_to_collect_more: bool) {
        self.advance_clock(duration_ms);
        self.platform.gc_in_progress.store(false, Ordering::SeqCst);
        self.reducer
            .notify_mark_compact(Event::mark_compact(self.now_ms(), next_gc_likely_to_collect_more));
    }
}
