//! Single-owner debounce timer
//!
//! The timer holds a deadline rather than a running task. The owner arms it,
//! cancels it, and asks it to fire with the current instant; the session loop
//! sleeps until [`DebounceTimer::deadline`]. Re-arming always replaces the old
//! deadline, so a stale expiry can never fire after a newer arm.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct DebounceTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Arm (or re-arm) to expire one period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire once if the deadline has passed
    ///
    /// Returns true at most once per arm.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(3000);

    #[test]
    fn test_fires_at_deadline_not_before() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(PERIOD);
        timer.arm(t0);

        assert!(!timer.fire(t0 + Duration::from_millis(2999)));
        assert!(timer.fire(t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_fires_once() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(PERIOD);
        timer.arm(t0);

        assert!(timer.fire(t0 + PERIOD));
        assert!(!timer.fire(t0 + PERIOD * 2));
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(PERIOD);
        timer.arm(t0);
        timer.arm(t0 + Duration::from_millis(2000));

        assert!(!timer.fire(t0 + Duration::from_millis(3000)));
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(5000)));
        assert!(timer.fire(t0 + Duration::from_millis(5000)));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(PERIOD);
        timer.arm(t0);
        timer.cancel();

        assert!(timer.deadline().is_none());
        assert!(!timer.fire(t0 + PERIOD));
    }
}
