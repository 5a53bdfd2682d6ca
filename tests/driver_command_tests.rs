//! Behavioural tests for the driver's outbound command discipline: exactly
//! one timer per entry into the wait phase, re-arming on consumed ticks, and
//! incremental GC starts on the transitions that demand them.

use std::time::Duration;

use memreduce::test_utils::{
    background_idle_event, context_disposed_event, mark_compact_event_garbage_left,
    mark_compact_event_no_garbage_left, timer_event_high_allocation_rate,
    timer_event_low_allocation_rate, TestFixture,
};
use memreduce::{Action, PlatformCommand, State};

#[test]
fn mark_compact_in_done_schedules_long_delay_timer() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));

    assert_eq!(fixture.reducer.current_state(), State::wait(0, long_delay));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(long_delay)]
    );
}

#[test]
fn context_disposal_in_done_schedules_long_delay_timer() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_context_disposed(context_disposed_event(1000.0));

    assert_eq!(
        fixture.reducer.current_state(),
        State::wait(0, 1000.0 + long_delay)
    );
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(long_delay)]
    );
}

#[test]
fn wait_to_wait_without_a_tick_does_not_duplicate_the_timer() {
    let fixture = TestFixture::new();

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();

    // The armed callback is still pending; none of these may add another.
    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_garbage_left(1000.0));
    fixture
        .reducer
        .notify_context_disposed(context_disposed_event(1500.0));

    assert_eq!(fixture.reducer.current_action(), Action::Wait);
    assert!(fixture.platform.is_empty());
}

#[test]
fn busy_tick_rearms_the_timer() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();

    // The tick consumed the pending callback, so the driver must re-arm.
    fixture
        .reducer
        .notify_timer(timer_event_high_allocation_rate(long_delay));

    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(long_delay)]
    );
}

#[test]
fn early_quiet_tick_rearms_with_remaining_delay() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();

    // Quiet, but 1000 ms before the deadline: state is unchanged and the
    // timer is re-armed for exactly the remainder.
    let state_before = fixture.reducer.current_state();
    fixture
        .reducer
        .notify_timer(timer_event_low_allocation_rate(long_delay - 1000.0));

    assert_eq!(fixture.reducer.current_state(), state_before);
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(1000.0)]
    );
}

#[test]
fn qualifying_tick_starts_incremental_gc() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();

    fixture
        .reducer
        .notify_timer(timer_event_low_allocation_rate(long_delay));

    assert_eq!(fixture.reducer.current_state(), State::run(1));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::StartIncrementalGc]
    );
}

#[test]
fn idle_notification_starts_gc_but_keeps_waiting() {
    let fixture = TestFixture::new();
    let long_delay = fixture.reducer.config().long_delay_ms;

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();

    fixture
        .reducer
        .notify_background_idle_notification(background_idle_event(2000.0, true));

    // Marking starts, the deadline is untouched, and no extra timer shows
    // up: the pending one remains the authoritative clock.
    assert_eq!(fixture.reducer.current_state(), State::wait(1, long_delay));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::StartIncrementalGc]
    );
}

#[test]
fn idle_notification_during_foreign_gc_is_inert() {
    let fixture = TestFixture::new();

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture.platform.drain();
    let state_before = fixture.reducer.current_state();

    fixture
        .reducer
        .notify_background_idle_notification(background_idle_event(2000.0, false));

    assert_eq!(fixture.reducer.current_state(), state_before);
    assert!(fixture.platform.is_empty());
}

#[test]
fn stale_tick_in_done_emits_nothing() {
    let fixture = TestFixture::new();

    fixture
        .reducer
        .notify_timer(timer_event_low_allocation_rate(0.0));

    assert_eq!(fixture.reducer.current_state(), State::done());
    assert!(fixture.platform.is_empty());
}

#[test]
fn full_episode_command_sequence() {
    let fixture = TestFixture::minimal();
    let config = *fixture.reducer.config();
    let reducer = &fixture.reducer;

    // Burst ends with a mutator mark-compact.
    reducer.notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(config.long_delay_ms)]
    );

    // Quiesced at the deadline: first reducer cycle.
    reducer.notify_timer(timer_event_low_allocation_rate(config.long_delay_ms));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::StartIncrementalGc]
    );

    // Cycle finished, more garbage likely: short follow-up wait.
    reducer.notify_mark_compact(mark_compact_event_garbage_left(200.0 + config.long_delay_ms));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::ScheduleTimer(config.short_delay_ms)]
    );

    // Second cycle hits the minimal cap and the episode closes.
    reducer.notify_timer(timer_event_low_allocation_rate(
        200.0 + config.long_delay_ms + config.short_delay_ms,
    ));
    assert_eq!(
        fixture.platform.drain(),
        vec![PlatformCommand::StartIncrementalGc]
    );
    reducer.notify_mark_compact(mark_compact_event_no_garbage_left(
        400.0 + config.long_delay_ms + config.short_delay_ms,
    ));
    assert_eq!(reducer.current_state(), State::done());
    assert!(fixture.platform.is_empty());

    let stats = reducer.stats();
    assert_eq!(stats.episodes_started, 1);
    assert_eq!(stats.episodes_completed, 1);
    assert_eq!(stats.gcs_initiated, 2);
    assert_eq!(stats.timers_scheduled, 2);
    assert_eq!(stats.events_observed, 5);
    assert_eq!(reducer.last_command_metrics(), (2, 2));

    // The episode-finished signal is already available.
    assert!(reducer.wait_until_done(Duration::from_millis(0)));
}

#[test]
fn wait_until_done_times_out_during_an_episode() {
    let fixture = TestFixture::new();

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));

    assert!(!fixture.reducer.wait_until_done(Duration::from_millis(10)));
}

#[test]
fn transitions_are_published_in_order() {
    let fixture = TestFixture::minimal();
    let config = *fixture.reducer.config();

    fixture
        .reducer
        .notify_mark_compact(mark_compact_event_no_garbage_left(0.0));
    fixture
        .reducer
        .notify_timer(timer_event_low_allocation_rate(config.long_delay_ms));

    let observed: Vec<_> = fixture.reducer.transitions().drain().collect();
    assert_eq!(observed.len(), 2);
    assert_eq!(observed[0].from, State::done());
    assert_eq!(observed[0].to, State::wait(0, config.long_delay_ms));
    assert_eq!(observed[1].to, State::run(1));
}
