//! Memory reducer controller.
//!
//! The reducer detects the mutator's transition from a high allocation phase
//! to a low allocation phase and collects the garbage the burst left behind.
//! It is an automaton over three states:
//!
//! - `Done`: inactive, no timer pending, nothing will be initiated.
//! - `Wait <started_gcs> <next_gc_start_ms>`: an episode is in progress and
//!   the reducer is waiting for the allocation rate to drop. The rate check
//!   happens in the timer callback.
//! - `Run <started_gcs>`: the reducer asked for an incremental mark-compact
//!   and is waiting for it to finish.
//!
//! `started_gcs` counts the cycles the reducer initiated since it left
//! `Done`, capped at `max_number_of_gcs` per episode. `next_gc_start_ms` is
//! the earliest time the next reducer-initiated cycle may begin.
//!
//! Transitions:
//!
//! - `Done -> Wait 0 (now + long_delay)` on context disposal and at the end
//!   of a mutator-initiated mark-compact. Both signal fresh garbage.
//! - `Wait n x -> Wait n (now + long_delay)` on a mutator mark-compact, and
//!   in the timer callback while the allocation rate is high or another
//!   incremental GC is in progress.
//! - `Wait n x -> Wait (n+1) x` on a background idle notification, which
//!   lets the reducer start incremental marking even under high allocation.
//!   The pending timer stays armed.
//! - `Wait n x -> Done` in the timer callback once `n` reaches the cap.
//! - `Wait n x -> Run (n+1)` in the timer callback when the allocation rate
//!   is low, `now >= x`, and no other incremental GC is in progress.
//! - `Run n -> Done` at the end of a reducer-initiated cycle when the cap is
//!   reached, or when the collection found no more garbage after at least
//!   two cycles.
//! - `Run n -> Wait n (now + short_delay)` at the end of a reducer-initiated
//!   cycle otherwise.
//!
//! The transition function is total and pure; every other event-state pair
//! leaves the state unchanged, which makes stale timer callbacks and other
//! spurious events harmless.

pub mod api;
pub mod core;
pub mod step;
pub mod types;


pub use self::core::MemoryReducer;
pub use self::step::step;
pub use self::types::{Action, Event, EventType, ReducerStats, State, Transition};
