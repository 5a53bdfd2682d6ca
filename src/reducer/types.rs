//! Reducer state, event, and observability types.

/// Controller phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reducer inactive, no timer pending.
    Done,
    /// Episode in progress, waiting for the allocation rate to drop.
    Wait,
    /// A reducer-initiated incremental mark-compact is running.
    Run,
}

/// Controller state.
///
/// A plain value; only the driver writes it, and only as the result of a
/// [`step`](crate::reducer::step::step) call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub action: Action,
    /// GCs initiated by the reducer since it left `Done`.
    pub started_gcs: u32,
    /// Earliest time the next reducer-initiated GC may begin.
    pub next_gc_start_ms: f64,
}

impl State {
    /// The state a fresh driver starts in.
    pub const fn initial() -> Self {
        Self::done()
    }

    pub const fn done() -> Self {
        Self {
            action: Action::Done,
            started_gcs: 0,
            next_gc_start_ms: 0.0,
        }
    }

    pub const fn wait(started_gcs: u32, next_gc_start_ms: f64) -> Self {
        Self {
            action: Action::Wait,
            started_gcs,
            next_gc_start_ms,
        }
    }

    pub const fn run(started_gcs: u32) -> Self {
        Self {
            action: Action::Run,
            started_gcs,
            next_gc_start_ms: 0.0,
        }
    }
}

/// Kinds of inbound events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Timer,
    MarkCompact,
    ContextDisposed,
    BackgroundIdleNotification,
}

/// An inbound event.
///
/// The record is flat: every field is always present, and the transition
/// function reads only the fields relevant to the event's type. The
/// constructors below build well-formed events and default the rest.
///
/// # Examples
///
/// ```
/// use memreduce::{Event, EventType};
///
/// let event = Event::timer(1500.0, true, true);
/// assert_eq!(event.event_type, EventType::Timer);
/// assert!(event.low_allocation_rate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    /// Wall-clock time at which the event was observed.
    pub time_ms: f64,
    /// `Timer` only: the mutator's recent allocation rate is below the
    /// quiescence threshold.
    pub low_allocation_rate: bool,
    /// `MarkCompact` only: the finished collection indicates further
    /// reduction is likely worthwhile.
    pub next_gc_likely_to_collect_more: bool,
    /// `Timer` and `BackgroundIdleNotification`: false iff another
    /// incremental collection is already in progress.
    pub can_start_incremental_gc: bool,
}

impl Event {
    pub fn timer(time_ms: f64, low_allocation_rate: bool, can_start_incremental_gc: bool) -> Self {
        Self {
            event_type: EventType::Timer,
            time_ms,
            low_allocation_rate,
            next_gc_likely_to_collect_more: false,
            can_start_incremental_gc,
        }
    }

    pub fn mark_compact(time_ms: f64, next_gc_likely_to_collect_more: bool) -> Self {
        Self {
            event_type: EventType::MarkCompact,
            time_ms,
            low_allocation_rate: false,
            next_gc_likely_to_collect_more,
            can_start_incremental_gc: false,
        }
    }

    pub fn context_disposed(time_ms: f64) -> Self {
        Self {
            event_type: EventType::ContextDisposed,
            time_ms,
            low_allocation_rate: false,
            next_gc_likely_to_collect_more: false,
            can_start_incremental_gc: false,
        }
    }

    pub fn background_idle(time_ms: f64, can_start_incremental_gc: bool) -> Self {
        Self {
            event_type: EventType::BackgroundIdleNotification,
            time_ms,
            low_allocation_rate: false,
            next_gc_likely_to_collect_more: false,
            can_start_incremental_gc,
        }
    }
}

/// One observed state change, published on the driver's transition channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: State,
    pub to: State,
    pub event_type: EventType,
}

/// Counters accumulated by the driver across episodes.
#[derive(Debug, Default, Clone)]
pub struct ReducerStats {
    pub events_observed: usize,
    pub episodes_started: usize,
    pub episodes_completed: usize,
    pub gcs_initiated: usize,
    pub timers_scheduled: usize,
}
