//! Trailing-edge debouncing driven by an external millisecond clock.
//!
//! The caller supplies `now_ms` on every call, which keeps the timer
//! deterministic under test.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Queue `value`, replacing anything pending and restarting the timer.
    pub fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    /// Take the pending value once the delay has elapsed since the last queue.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_held_until_delay_elapses() {
        let mut debouncer = Debouncer::new(100);
        debouncer.queue((120_u16, 40_u16), 1_000);
        assert_eq!(debouncer.take_ready(1_050), None);
        assert_eq!(debouncer.take_ready(1_100), Some((120, 40)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_requeue_restarts_timer_and_keeps_latest() {
        let mut debouncer = Debouncer::new(100);
        debouncer.queue("c", 0);
        debouncer.queue("ca", 80);
        assert_eq!(debouncer.take_ready(120), None);
        assert_eq!(debouncer.take_ready(180), Some("ca"));
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let mut debouncer = Debouncer::new(10);
        debouncer.queue(1, 0);
        debouncer.cancel();
        assert_eq!(debouncer.take_ready(1_000), None);
    }

    #[test]
    fn test_zero_delay_is_ready_immediately() {
        let mut debouncer = Debouncer::new(0);
        debouncer.queue((), 5);
        assert_eq!(debouncer.take_ready(5), Some(()));
    }
}
