// SumpWatch — Sump duty cycle
//
// A ring of the last SMAX sump start times. Counting the starts that fall
// inside the duty window tells us whether the pump is cycling hard enough to
// worry about (failing float switch, high water table, check valve stuck).

use crate::config::*;

#[derive(Debug, Clone)]
pub struct DutyCycle {
    runs: [Option<u32>; SMAX],
    ptr: usize,
}

impl DutyCycle {
    pub fn new() -> Self {
        Self {
            runs: [None; SMAX],
            ptr: 0,
        }
    }

    /// Record a run that started at `now_ms`, overwriting the oldest slot.
    pub fn record_run(&mut self, now_ms: u32) {
        self.runs[self.ptr] = Some(now_ms);
        self.ptr = (self.ptr + 1) % SMAX;
    }

    /// Number of recorded starts no older than `window_ms`.
    pub fn runs_within(&self, now_ms: u32, window_ms: u32) -> usize {
        self.runs
            .iter()
            .flatten()
            .filter(|&&start| now_ms.wrapping_sub(start) <= window_ms)
            .count()
    }

    /// Run count over [`DUTY_WINDOW_MS`], or `None` when it is below [`DANGER`].
    pub fn danger(&self, now_ms: u32) -> Option<usize> {
        let runs = self.runs_within(now_ms, DUTY_WINDOW_MS);
        (runs >= DANGER).then_some(runs)
    }
}

impl Default for DutyCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u32 = 60_000;

    #[test]
    fn test_counts_only_recent_runs() {
        let mut duty = DutyCycle::new();
        duty.record_run(0);
        duty.record_run(10 * MIN);
        duty.record_run(35 * MIN);

        // At 40 min the run at t=0 is outside the 30 min window.
        assert_eq!(duty.runs_within(40 * MIN, DUTY_WINDOW_MS), 2);
        assert_eq!(duty.runs_within(40 * MIN, 10 * MIN), 1);
    }

    #[test]
    fn test_empty_slots_never_count() {
        let duty = DutyCycle::new();
        assert_eq!(duty.runs_within(0, DUTY_WINDOW_MS), 0);
        assert_eq!(duty.danger(0), None);
    }

    #[test]
    fn test_ring_wraps_after_smax_runs() {
        let mut duty = DutyCycle::new();
        for i in 0..(SMAX as u32 + 4) {
            duty.record_run(i * 1000);
        }
        // Only SMAX slots exist; the four oldest starts were overwritten.
        assert_eq!(duty.runs_within(SMAX as u32 * 1000 + 4000, u32::MAX), SMAX);
        assert_eq!(duty.runs_within(SMAX as u32 * 1000 + 4000, 3500), 3);
    }

    #[test]
    fn test_timer_wrap() {
        let mut duty = DutyCycle::new();
        duty.record_run(u32::MAX - 5 * MIN);
        duty.record_run(2 * MIN);
        assert_eq!(duty.runs_within(5 * MIN, DUTY_WINDOW_MS), 2);
    }

    #[test]
    fn test_danger_threshold() {
        let mut duty = DutyCycle::new();
        for i in 0..(DANGER as u32 - 1) {
            duty.record_run(i * 4 * MIN);
        }
        assert_eq!(duty.danger(20 * MIN), None);

        duty.record_run(21 * MIN);
        assert_eq!(duty.danger(22 * MIN), Some(DANGER));
    }
}
