//! The pure transition function.

use crate::config::ReducerConfig;

use super::types::{Action, Event, EventType, State};

/// Compute the next controller state from the current state and an event.
///
/// Total over every `(state, event)` pair and free of side effects, so the
/// whole policy can be tested table-style without a live heap. Equal inputs
/// always produce equal outputs.
///
/// # Examples
///
/// ```
/// use memreduce::{step, Action, Event, ReducerConfig, State};
///
/// let config = ReducerConfig::default();
/// let after = step(&config, State::done(), Event::mark_compact(0.0, true));
/// assert_eq!(after, State::wait(0, config.long_delay_ms));
/// ```
pub fn step(config: &ReducerConfig, state: State, event: Event) -> State {
    match state.action {
        Action::Done => match event.event_type {
            EventType::Timer | EventType::BackgroundIdleNotification => state,
            // Fresh garbage is likely; open an episode.
            EventType::MarkCompact | EventType::ContextDisposed => {
                State::wait(0, event.time_ms + config.long_delay_ms)
            }
        },
        Action::Wait => match event.event_type {
            EventType::ContextDisposed => state,
            EventType::MarkCompact => {
                State::wait(state.started_gcs, event.time_ms + config.long_delay_ms)
            }
            EventType::Timer => {
                // The cap exit is checked against the pre-increment count,
                // before any of the rate predicates.
                if state.started_gcs >= config.max_number_of_gcs {
                    State::done()
                } else if event.can_start_incremental_gc && event.low_allocation_rate {
                    if event.time_ms >= state.next_gc_start_ms {
                        State::run(state.started_gcs + 1)
                    } else {
                        // Woke up early; the driver re-arms the timer.
                        state
                    }
                } else {
                    State::wait(state.started_gcs, event.time_ms + config.long_delay_ms)
                }
            }
            EventType::BackgroundIdleNotification => {
                if event.can_start_incremental_gc && state.started_gcs < config.max_number_of_gcs {
                    // Marking starts now, but the pending timer stays the
                    // authoritative clock, so the deadline is kept.
                    State::wait(state.started_gcs + 1, state.next_gc_start_ms)
                } else {
                    state
                }
            }
        },
        Action::Run => match event.event_type {
            EventType::MarkCompact => {
                // The first cycle after a burst is often premature, so the
                // "no more garbage" exit requires at least two cycles.
                if state.started_gcs < config.max_number_of_gcs
                    && (event.next_gc_likely_to_collect_more || state.started_gcs == 1)
                {
                    State::wait(state.started_gcs, event.time_ms + config.short_delay_ms)
                } else {
                    State::done()
                }
            }
            _ => state,
        },
    }
}
