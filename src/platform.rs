//! Outbound capability seam between the reducer and its host.
//!
//! The driver never schedules wall-clock timers or runs collections itself.
//! It requests both through the traits below, so embedders wire in the real
//! platform task queue and collector while tests observe commands through
//! channel or queue backed implementations.

use std::sync::Arc;

use once_cell::sync::Lazy;

/// Capability to request a delayed timer callback from the platform.
///
/// The platform is expected to deliver a `Timer` event back to the driver's
/// `notify_timer` entry point once the delay has elapsed.
pub trait TimerScheduler: Send + Sync {
    fn schedule_timer(&self, delay_ms: f64);
}

/// Capability to ask the collector for an incremental mark-compact cycle.
///
/// Starting is fire-and-forget. The collector reports completion through a
/// later `MarkCompact` event; if it refuses to start, the next timer tick
/// re-evaluates and retries naturally.
pub trait GcTrigger: Send + Sync {
    fn start_incremental_gc(&self);
}

/// A single outbound command, as observed by channel-backed platforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformCommand {
    ScheduleTimer(f64),
    StartIncrementalGc,
}

/// Platform that forwards every command over a flume channel.
///
/// # Examples
///
/// ```
/// use memreduce::{ChannelPlatform, PlatformCommand, TimerScheduler};
///
/// let (platform, commands) = ChannelPlatform::new();
/// platform.schedule_timer(250.0);
/// assert_eq!(
///     commands.try_recv().unwrap(),
///     PlatformCommand::ScheduleTimer(250.0)
/// );
/// ```
pub struct ChannelPlatform {
    sender: flume::Sender<PlatformCommand>,
}

impl ChannelPlatform {
    pub fn new() -> (Self, flume::Receiver<PlatformCommand>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }
}

impl TimerScheduler for ChannelPlatform {
    fn schedule_timer(&self, delay_ms: f64) {
        let _ = self.sender.send(PlatformCommand::ScheduleTimer(delay_ms));
    }
}

impl GcTrigger for ChannelPlatform {
    fn start_incremental_gc(&self) {
        let _ = self.sender.send(PlatformCommand::StartIncrementalGc);
    }
}

/// Inert platform that discards every command.
pub struct NoopPlatform;

impl TimerScheduler for NoopPlatform {
    fn schedule_timer(&self, _delay_ms: f64) {}
}

impl GcTrigger for NoopPlatform {
    fn start_incremental_gc(&self) {}
}

static NOOP_PLATFORM: Lazy<Arc<NoopPlatform>> = Lazy::new(|| Arc::new(NoopPlatform));

/// Shared no-op platform instance used for default wiring.
pub fn noop_platform() -> Arc<NoopPlatform> {
    Arc::clone(&NOOP_PLATFORM)
}
