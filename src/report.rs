// SumpWatch — Cloud reporting
//
// The webhook relay rate-limits us, so the round-robin reporter sends one
// value per call and cycles through five categories. Delivery is
// fire-and-forget: publishers log their own failures and nothing is retried.

use serde::Serialize;

use crate::monitor::MonitorState;

pub const KEY_SUMP_CURRENT: &str = "sumpCurrent";
pub const KEY_HVAC_CURRENT: &str = "hvacCurrent";
pub const KEY_WATER_TEMP: &str = "waterTemp";
pub const KEY_HVAC_EVENT: &str = "hvacEvent";
pub const KEY_SUMP_EVENT: &str = "sumpEvent";
pub const KEY_SUMP_DANGER: &str = "sumpDanger";

// ---------------------------------------------------------------------------
// Publish sink
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Named-key / string-value push interface. No response is consumed.
pub trait Publisher {
    fn publish(&mut self, key: &str, value: &str, visibility: Visibility);
}

/// Writes publishes to the log only. Used when no webhook URL is configured.
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&mut self, key: &str, value: &str, visibility: Visibility) {
        log::info!("publish {}={} ({:?})", key, value, visibility);
    }
}

// ---------------------------------------------------------------------------
// Round-robin reporter
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCategory {
    SumpCurrent,
    HvacCurrent,
    WaterTemp,
    HvacEvent,
    SumpEvent,
}

impl ReportCategory {
    pub const COUNT: u32 = 5;

    pub fn from_count(count: u32) -> Self {
        match count % Self::COUNT {
            0 => Self::SumpCurrent,
            1 => Self::HvacCurrent,
            2 => Self::WaterTemp,
            3 => Self::HvacEvent,
            _ => Self::SumpEvent,
        }
    }
}

/// Publish the next round-robin value and advance the counter.
pub fn round_robin_report<P: Publisher + ?Sized>(state: &mut MonitorState, sink: &mut P) -> ReportCategory {
    let category = ReportCategory::from_count(state.report_count);
    state.report_count = state.report_count.wrapping_add(1);

    match category {
        ReportCategory::SumpCurrent => {
            // Report the max we've seen in case we missed a short run.
            for slot in state.sump_history.iter_mut() {
                state.sump_cur = state.sump_cur.max(*slot);
                *slot = 0;
            }
            sink.publish(KEY_SUMP_CURRENT, &state.sump_cur.to_string(), Visibility::Private);
        }
        ReportCategory::HvacCurrent => {
            sink.publish(KEY_HVAC_CURRENT, &state.hvac_cur.to_string(), Visibility::Private);
        }
        ReportCategory::WaterTemp => {
            sink.publish(KEY_WATER_TEMP, &state.water_temp.to_string(), Visibility::Private);
        }
        ReportCategory::HvacEvent => {
            if state.hvac.latch.is_set() {
                let duration = state.hvac.latch.take();
                // A run that restarted before we reported is dropped.
                if let (Some(secs), false) = (duration, state.hvac.on) {
                    sink.publish(KEY_HVAC_EVENT, &secs.to_string(), Visibility::Private);
                }
            } else {
                sink.publish(KEY_HVAC_EVENT, "0", Visibility::Private);
            }
        }
        ReportCategory::SumpEvent => {
            let secs = state.sump.latch.take().unwrap_or(0);
            sink.publish(KEY_SUMP_EVENT, &secs.to_string(), Visibility::Private);
        }
    }

    category
}

/// Publish a duty-cycle alert when the sump has run [`crate::config::DANGER`]
/// or more times in the duty window. Returns the run count when it fired.
pub fn danger_alert<P: Publisher + ?Sized>(state: &MonitorState, now_ms: u32, sink: &mut P) -> Option<usize> {
    let runs = state.duty.danger(now_ms)?;
    log::warn!("Sump ran {} times in the last duty window", runs);
    sink.publish(KEY_SUMP_DANGER, &runs.to_string(), Visibility::Private);
    Some(runs)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Body POSTed to the webhook relay.
#[derive(Debug, Serialize)]
pub struct WebhookEvent<'a> {
    pub event: &'a str,
    pub data: &'a str,
    pub private: bool,
}

impl<'a> WebhookEvent<'a> {
    pub fn new(key: &'a str, value: &'a str, visibility: Visibility) -> Self {
        Self {
            event: key,
            data: value,
            private: visibility == Visibility::Private,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Full state dump for Home Assistant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub sump_on: bool,
    pub hvac_on: bool,
    pub heater_on: bool,
    pub sump_current: i32,
    pub hvac_current: i32,
    pub water_temp: f64,
    pub ambient_temp: f64,
    pub sump_runs: usize,
}

impl StatusSnapshot {
    pub fn capture(state: &MonitorState, now_ms: u32) -> Self {
        Self {
            sump_on: state.sump.on,
            hvac_on: state.hvac.on,
            heater_on: state.heater_on,
            sump_current: state.sump_cur,
            hvac_current: state.hvac_cur,
            water_temp: state.water_temp,
            ambient_temp: state.ambient_temp,
            sump_runs: state.duty.runs_within(now_ms, crate::config::DUTY_WINDOW_MS),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::events::EventLatch;

    /// Records every publish for inspection.
    #[derive(Default)]
    struct RecordingSink {
        published: Vec<(String, String, Visibility)>,
    }

    impl Publisher for RecordingSink {
        fn publish(&mut self, key: &str, value: &str, visibility: Visibility) {
            self.published.push((key.to_string(), value.to_string(), visibility));
        }
    }

    impl RecordingSink {
        fn last(&self) -> (&str, &str) {
            let (k, v, _) = self.published.last().expect("nothing published");
            (k.as_str(), v.as_str())
        }
    }

    #[test]
    fn test_category_cycle_order() {
        let mut state = MonitorState::new();
        let mut sink = RecordingSink::default();
        let keys: Vec<ReportCategory> = (0..7)
            .map(|_| round_robin_report(&mut state, &mut sink))
            .collect();

        assert_eq!(
            keys,
            vec![
                ReportCategory::SumpCurrent,
                ReportCategory::HvacCurrent,
                ReportCategory::WaterTemp,
                ReportCategory::HvacEvent,
                ReportCategory::SumpEvent,
                ReportCategory::SumpCurrent,
                ReportCategory::HvacCurrent,
            ]
        );
        assert_eq!(state.report_count, 7);
        assert_eq!(sink.published.len(), 7);
        assert!(sink.published.iter().all(|(_, _, vis)| *vis == Visibility::Private));
    }

    #[test]
    fn test_category_is_count_mod_five() {
        assert_eq!(ReportCategory::from_count(5), ReportCategory::SumpCurrent);
        assert_eq!(ReportCategory::from_count(13), ReportCategory::HvacEvent);
        assert_eq!(ReportCategory::from_count(1_000_001), ReportCategory::HvacCurrent);
        assert_eq!(ReportCategory::from_count(u32::MAX - 1), ReportCategory::SumpEvent);
    }

    #[test]
    fn test_sump_current_takes_history_max() {
        let mut state = MonitorState::new();
        state.sump_history[..3].copy_from_slice(&[3, 7, 2]);
        state.sump_cur = 5;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);

        assert_eq!(sink.last(), (KEY_SUMP_CURRENT, "7"));
        assert_eq!(state.sump_history, [0; HIST]);
        assert_eq!(state.sump_cur, 7);
    }

    #[test]
    fn test_sump_current_keeps_larger_accumulator() {
        let mut state = MonitorState::new();
        state.sump_history[4] = 90;
        state.sump_cur = 120;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);

        assert_eq!(sink.last(), (KEY_SUMP_CURRENT, "120"));
        assert_eq!(state.sump_history, [0; HIST]);
    }

    #[test]
    fn test_live_values_verbatim() {
        let mut state = MonitorState::new();
        state.hvac_cur = 2710;
        state.water_temp = 203.5;
        state.report_count = 1;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);
        assert_eq!(sink.last(), (KEY_HVAC_CURRENT, "2710"));
        round_robin_report(&mut state, &mut sink);
        assert_eq!(sink.last(), (KEY_WATER_TEMP, "203.5"));
    }

    #[test]
    fn test_sump_event_is_one_shot() {
        let mut state = MonitorState::new();
        state.sump.latch = EventLatch::Completed { duration_secs: 22 };
        state.report_count = 4;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);
        assert_eq!(sink.last(), (KEY_SUMP_EVENT, "22"));
        assert!(!state.sump.latch.is_set());

        for _ in 0..5 {
            round_robin_report(&mut state, &mut sink);
        }
        assert_eq!(sink.last(), (KEY_SUMP_EVENT, "0"));
    }

    #[test]
    fn test_hvac_event_is_one_shot() {
        let mut state = MonitorState::new();
        state.hvac.latch = EventLatch::Completed { duration_secs: 600 };
        state.report_count = 3;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);
        assert_eq!(sink.last(), (KEY_HVAC_EVENT, "600"));

        state.report_count = 8;
        round_robin_report(&mut state, &mut sink);
        assert_eq!(sink.last(), (KEY_HVAC_EVENT, "0"));
    }

    #[test]
    fn test_hvac_event_skipped_while_running() {
        let mut state = MonitorState::new();
        state.record_hvac(3000, 0);
        state.record_hvac(100, 120_000);
        state.record_hvac(3000, 130_000);
        assert!(state.hvac.on);
        assert!(state.hvac.latch.is_set());
        state.report_count = 3;

        let mut sink = RecordingSink::default();
        round_robin_report(&mut state, &mut sink);

        assert!(sink.published.is_empty());
        assert!(!state.hvac.latch.is_set());
        assert_eq!(state.report_count, 4);
    }

    #[test]
    fn test_danger_alert() {
        let mut state = MonitorState::new();
        let mut sink = RecordingSink::default();
        for i in 0..DANGER as u32 {
            state.duty.record_run(i * 60_000);
        }
        assert_eq!(danger_alert(&state, 10 * 60_000, &mut sink), Some(DANGER));
        assert_eq!(sink.last(), (KEY_SUMP_DANGER, "6"));

        // Once the window slides past the runs there is nothing to say.
        let mut quiet = RecordingSink::default();
        assert_eq!(danger_alert(&state, 3_600_000, &mut quiet), None);
        assert!(quiet.published.is_empty());
    }

    #[test]
    fn test_webhook_body() {
        let body = WebhookEvent::new(KEY_SUMP_EVENT, "22", Visibility::Private)
            .to_json()
            .unwrap();
        assert_eq!(body, r#"{"event":"sumpEvent","data":"22","private":true}"#);
    }

    #[test]
    fn test_status_snapshot() {
        let mut state = MonitorState::new();
        state.record_sump(350, 1_000);
        let snapshot = StatusSnapshot::capture(&state, 2_000);

        assert!(snapshot.sump_on);
        assert_eq!(snapshot.sump_current, 350);
        assert_eq!(snapshot.sump_runs, 1);

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["water_temp"], 70.0);
        assert_eq!(json["hvac_on"], false);
    }
}
