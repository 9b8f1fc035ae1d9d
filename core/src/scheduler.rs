use alloc::vec::Vec;
use core::time::Duration;

/// Time the pair stays visible before the engine decides on it.
pub const RESOLVE_DELAY: Duration = Duration::from_millis(500);

/// Timer collaborator for the deferred pair resolution.
///
/// The engine calls [`Scheduler::schedule`] when a resolution becomes pending,
/// whoever drives the scheduler is then expected to call
/// [`MatchEngine::resolve_pending`](crate::MatchEngine::resolve_pending) once
/// the delay has passed.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration);
}

/// Frame-driven timer queue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickScheduler {
    pending: Vec<Duration>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time left until the next resolution is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().min().copied()
    }

    /// Moves the clock forward, returning how many resolutions became due.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let before = self.pending.len();
        self.pending.retain_mut(|remaining| {
            *remaining = remaining.saturating_sub(elapsed);
            !remaining.is_zero()
        });
        before - self.pending.len()
    }
}

impl Scheduler for TickScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.pending.push(delay);
    }
}

/// Records requests only; the caller fires resolutions explicitly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManualScheduler {
    requests: Vec<Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[Duration] {
        &self.requests
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.requests.push(delay);
    }
}

impl<T: Scheduler + ?Sized> Scheduler for &mut T {
    fn schedule(&mut self, delay: Duration) {
        (**self).schedule(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scheduler_fires_after_delay() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(RESOLVE_DELAY);

        assert_eq!(scheduler.advance(Duration::from_millis(200)), 0);
        assert_eq!(scheduler.next_due(), Some(Duration::from_millis(300)));
        assert_eq!(scheduler.advance(Duration::from_millis(300)), 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn tick_scheduler_fires_every_due_entry() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(Duration::from_millis(100));
        scheduler.schedule(Duration::from_millis(400));
        scheduler.schedule(Duration::from_millis(900));

        assert_eq!(scheduler.advance(Duration::from_millis(500)), 2);
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 1);
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
    }
}
