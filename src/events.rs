// SumpWatch — Readings & Event Types

// ---------------------------------------------------------------------------
// Sensor readings, sent from the polling tasks to the monitor task
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Sump pump current, peak-to-peak ADC counts.
    SumpCurrent(i32),
    /// HVAC fan current, peak-to-peak ADC counts.
    HvacCurrent(i32),
    /// Water heater chimney temperature (°F).
    WaterTemp(f64),
    /// Ambient basement temperature (°F).
    AmbientTemp(f64),
}

// ---------------------------------------------------------------------------
// One-shot event latch
// ---------------------------------------------------------------------------

/// Set when an appliance run finishes, consumed by the first report that
/// sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventLatch {
    #[default]
    Idle,
    Completed { duration_secs: u32 },
}

impl EventLatch {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Return the pending duration (if any) and reset to `Idle`.
    pub fn take(&mut self) -> Option<u32> {
        match core::mem::take(self) {
            Self::Completed { duration_secs } => Some(duration_secs),
            Self::Idle => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Run transitions
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Stopped { duration_secs: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appliance {
    Sump,
    Hvac,
    WaterHeater,
}

impl Appliance {
    /// Human-readable name (used in log lines).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sump        => "sump pump",
            Self::Hvac        => "hvac",
            Self::WaterHeater => "water heater",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_take_is_one_shot() {
        let mut latch = EventLatch::Completed { duration_secs: 42 };
        assert!(latch.is_set());
        assert_eq!(latch.take(), Some(42));
        assert_eq!(latch, EventLatch::Idle);
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn latch_defaults_to_idle() {
        assert!(!EventLatch::default().is_set());
    }
}
