//! Heap-side memory reducer.
//!
//! The reducer watches mutator behaviour through a stream of inbound events
//! (timer ticks, mark-compact completions, context disposals, background idle
//! notifications) and decides when to launch additional incremental
//! mark-compact cycles to reclaim garbage left behind by an allocation burst.
//! All policy lives in a pure transition function; the surrounding driver
//! owns the controller state and talks to the collector and the platform task
//! queue through injectable capability traits.

pub mod config;
pub mod di;
pub mod error;
pub mod platform;
pub mod reducer;
pub mod test_utils;

pub use config::ReducerConfig;
pub use error::{ReducerError, ReducerResult};
pub use platform::{ChannelPlatform, GcTrigger, NoopPlatform, PlatformCommand, TimerScheduler};
pub use reducer::{
    step, Action, Event, EventType, MemoryReducer, ReducerStats, State, Transition,
};
