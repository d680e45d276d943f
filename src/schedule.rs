// SumpWatch — Periodic jobs on a wrapping millisecond clock

/// A job that falls due every `period_ms`. Overdue jobs fire once and then
/// re-anchor on the current time rather than bursting to catch up.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    period_ms: u32,
    last_ms: u32,
}

impl Periodic {
    /// First due one full period after `now_ms`.
    pub fn new(period_ms: u32, now_ms: u32) -> Self {
        Self { period_ms, last_ms: now_ms }
    }

    /// Due immediately, then every period.
    pub fn immediate(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: now_ms.wrapping_sub(period_ms),
        }
    }

    pub fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Milliseconds until the job is due (0 when overdue).
    pub fn remaining(&self, now_ms: u32) -> u32 {
        self.period_ms.saturating_sub(now_ms.wrapping_sub(self.last_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_each_period() {
        let mut job = Periodic::new(1000, 0);
        assert!(!job.poll(999));
        assert_eq!(job.remaining(999), 1);
        assert!(job.poll(1000));
        assert!(!job.poll(1500));
        assert!(job.poll(2000));
    }

    #[test]
    fn test_overdue_fires_once() {
        let mut job = Periodic::new(1000, 0);
        assert_eq!(job.remaining(5000), 0);
        assert!(job.poll(5000));
        assert!(!job.poll(5001));
        assert_eq!(job.remaining(5001), 999);
    }

    #[test]
    fn test_immediate() {
        let mut job = Periodic::immediate(300_007, 10);
        assert_eq!(job.remaining(10), 0);
        assert!(job.poll(10));
        assert!(!job.poll(20));
    }

    #[test]
    fn test_clock_wrap() {
        let mut job = Periodic::new(1000, u32::MAX - 400);
        assert!(!job.poll(u32::MAX));
        assert!(job.poll(599));
    }
}
