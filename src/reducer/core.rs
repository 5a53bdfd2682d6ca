//! Driver struct and constructor.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use arc_swap::ArcSwap;
use flume::{Receiver, Sender};

use crate::config::ReducerConfig;
use crate::error::ReducerResult;
use crate::platform::{GcTrigger, TimerScheduler};

use super::types::{ReducerStats, State, Transition};

/// Driver for the reducer automaton.
///
/// Owns the authoritative [`State`] and is the only writer to it. Inbound
/// events arrive through the four `notify_*` entry points, which the host
/// must call from a single control thread; observers may read state and
/// stats from any thread through the lock-free cells.
///
/// # Examples
///
/// ```
/// use memreduce::test_utils::TestFixture;
/// use memreduce::{Action, Event};
///
/// let fixture = TestFixture::new();
/// let reducer = &fixture.reducer;
/// assert_eq!(reducer.current_action(), Action::Done);
///
/// // A mutator-initiated full GC opens an episode.
/// reducer.notify_mark_compact(Event::mark_compact(0.0, true));
/// assert_eq!(reducer.current_action(), Action::Wait);
/// ```
pub struct MemoryReducer {
    pub(super) config: ReducerConfig,

    /// Hot-path state reads are lock-free; writes happen only inside the
    /// notification entry points.
    pub(super) state: ArcSwap<State>,
    pub(super) stats: ArcSwap<ReducerStats>,

    // Outbound capabilities.
    pub(super) timer_scheduler: Arc<dyn TimerScheduler>,
    pub(super) gc_trigger: Arc<dyn GcTrigger>,

    // Observation channels.
    pub(super) transition_sender: Sender<Transition>,
    pub(super) transition_receiver: Receiver<Transition>,
    pub(super) episode_finished_sender: Sender<()>,
    pub(super) episode_finished_receiver: Receiver<()>,

    // Command metrics.
    pub(super) timers_scheduled: AtomicUsize,
    pub(super) gc_starts_requested: AtomicUsize,
}

impl MemoryReducer {
    /// Build a driver around a validated configuration and the host's
    /// outbound capabilities.
    pub fn new(
        config: ReducerConfig,
        timer_scheduler: Arc<dyn TimerScheduler>,
        gc_trigger: Arc<dyn GcTrigger>,
    ) -> ReducerResult<Self> {
        config.validate()?;

        let (transition_sender, transition_receiver) = flume::bounded(100);
        let (episode_finished_sender, episode_finished_receiver) = flume::bounded(1);

        Ok(Self {
            config,
            state: ArcSwap::from_pointee(State::initial()),
            stats: ArcSwap::from_pointee(ReducerStats::default()),
            timer_scheduler,
            gc_trigger,
            transition_sender,
            transition_receiver,
            episode_finished_sender,
            episode_finished_receiver,
            timers_scheduled: AtomicUsize::new(0),
            gc_starts_requested: AtomicUsize::new(0),
        })
    }
}
