//! Notification entry points and observers for the driver.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ReducerConfig;

use super::core::MemoryReducer;
use super::step::step;
use super::types::{Action, Event, EventType, ReducerStats, State, Transition};

impl MemoryReducer {
    /// Handle a timer callback previously requested through the scheduler.
    ///
    /// A qualifying tick (low allocation rate, no foreign incremental GC,
    /// deadline reached) starts an incremental mark-compact. Any tick that
    /// leaves the controller in `Wait` re-arms the timer, since the callback
    /// that delivered this event is spent. Stale ticks arriving in `Done` or
    /// `Run` fall on `unchanged` rows and emit nothing.
    pub fn notify_timer(&self, event: Event) {
        debug_assert_eq!(event.event_type, EventType::Timer);
        let transition = self.apply(event);
        match transition.to.action {
            Action::Run if transition.from.action == Action::Wait => {
                self.request_incremental_gc();
            }
            Action::Wait => {
                self.schedule_timer(transition.to.next_gc_start_ms - event.time_ms);
            }
            _ => {}
        }
    }

    /// Handle the end of a full mark-compact, whether initiated by the
    /// reducer or by the mutator.
    pub fn notify_mark_compact(&self, event: Event) {
        debug_assert_eq!(event.event_type, EventType::MarkCompact);
        self.apply_and_arm_timer(event);
    }

    /// Handle the host discarding a top-level execution context.
    pub fn notify_context_disposed(&self, event: Event) {
        debug_assert_eq!(event.event_type, EventType::ContextDisposed);
        self.apply_and_arm_timer(event);
    }

    /// Handle a background idle notification.
    ///
    /// While waiting, an idle tick may start incremental marking without
    /// leaving `Wait`; the pending timer remains the authoritative clock.
    pub fn notify_background_idle_notification(&self, event: Event) {
        debug_assert_eq!(event.event_type, EventType::BackgroundIdleNotification);
        let transition = self.apply(event);
        if transition.from.action == Action::Wait
            && transition.to.started_gcs > transition.from.started_gcs
        {
            self.request_incremental_gc();
        }
    }

    /// Lock-free snapshot of the current state.
    pub fn current_state(&self) -> State {
        **self.state.load()
    }

    pub fn current_action(&self) -> Action {
        self.current_state().action
    }

    /// Snapshot of the accumulated counters.
    pub fn stats(&self) -> ReducerStats {
        (**self.stats.load()).clone()
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Receiver of observed state changes. Bounded; when no one drains it,
    /// further transitions are dropped rather than blocking the driver.
    pub fn transitions(&self) -> &flume::Receiver<Transition> {
        &self.transition_receiver
    }

    /// Block until the current episode ends or the timeout expires.
    /// Returns `true` when the controller is in `Done`.
    pub fn wait_until_done(&self, timeout: Duration) -> bool {
        if self.current_action() == Action::Done {
            return true;
        }
        match self.episode_finished_receiver.recv_timeout(timeout) {
            Ok(()) => true,
            Err(_) => self.current_action() == Action::Done,
        }
    }

    /// `(timers_scheduled, gc_starts_requested)` since construction.
    pub fn last_command_metrics(&self) -> (usize, usize) {
        (
            self.timers_scheduled.load(Ordering::Relaxed),
            self.gc_starts_requested.load(Ordering::Relaxed),
        )
    }

    /// Run one event through the step function, publish the result, and
    /// update stats. All state writes funnel through here.
    fn apply(&self, event: Event) -> Transition {
        let from = self.current_state();
        let to = step(&self.config, from, event);
        self.state.store(Arc::new(to));

        let episode_started = from.action == Action::Done && to.action != Action::Done;
        let episode_finished = from.action != Action::Done && to.action == Action::Done;

        self.stats.rcu(|stats| {
            let mut next = (**stats).clone();
            next.events_observed += 1;
            if episode_started {
                next.episodes_started += 1;
            }
            if episode_finished {
                next.episodes_completed += 1;
            }
            if to.started_gcs > from.started_gcs {
                next.gcs_initiated += 1;
            }
            Arc::new(next)
        });

        if episode_started {
            // A token from a previous episode must not satisfy a waiter of
            // the new one.
            while self.episode_finished_receiver.try_recv().is_ok() {}
        }
        if episode_finished {
            let _ = self.episode_finished_sender.try_send(());
        }

        let transition = Transition {
            from,
            to,
            event_type: event.event_type,
        };
        let _ = self.transition_sender.try_send(transition);
        transition
    }

    /// Shared tail for the two episode-opening notifications: a timer is
    /// armed only when the controller entered `Wait` from another action.
    /// On `Wait -> Wait` the previously armed callback is still pending.
    fn apply_and_arm_timer(&self, event: Event) {
        let transition = self.apply(event);
        if transition.from.action != Action::Wait && transition.to.action == Action::Wait {
            self.schedule_timer(transition.to.next_gc_start_ms - event.time_ms);
        }
    }

    fn schedule_timer(&self, delay_ms: f64) {
        // Non-monotonic event times can produce a negative remainder.
        let delay_ms = delay_ms.max(0.0);
        self.timers_scheduled.fetch_add(1, Ordering::Relaxed);
        self.stats.rcu(|stats| {
            let mut next = (**stats).clone();
            next.timers_scheduled += 1;
            Arc::new(next)
        });
        self.timer_scheduler.schedule_timer(delay_ms);
    }

    fn request_incremental_gc(&self) {
        self.gc_starts_requested.fetch_add(1, Ordering::Relaxed);
        self.gc_trigger.start_incremental_gc();
    }
}
