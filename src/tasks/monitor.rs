// SumpWatch — Monitor Task
//
// Sole owner of `MonitorState`. Applies readings as they arrive and, between
// them, runs the periodic jobs: the round-robin webhook report, the sump
// duty-cycle check and the Home Assistant status snapshot.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use sumpwatch::config::*;
use sumpwatch::events::Reading;
use sumpwatch::monitor::MonitorState;
use sumpwatch::report::{danger_alert, round_robin_report, Publisher, StatusSnapshot};
use sumpwatch::schedule::Periodic;

use crate::drivers::mqtt::MqttStatus;

pub fn monitor_task(
    readings: Receiver<Reading>,
    mut sink: Box<dyn Publisher + Send>,
    mut mqtt: Option<MqttStatus>,
) {
    log::info!("Monitor task started");

    let mut state = MonitorState::new();
    let now = crate::now_ms();
    let mut report = Periodic::new(REPORT_INTERVAL_MS, now);
    let mut danger = Periodic::new(DANGER_CHECK_MS, now);
    let mut status = Periodic::immediate(MQTT_INTERVAL_MS, now);

    loop {
        let now = crate::now_ms();
        let mut wait = report.remaining(now).min(danger.remaining(now));
        if mqtt.is_some() {
            wait = wait.min(status.remaining(now));
        }

        match readings.recv_timeout(Duration::from_millis(wait as u64)) {
            Ok(reading) => state.apply(reading, crate::now_ms()),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("All sensor tasks gone, exiting monitor task");
                return;
            }
        }

        let now = crate::now_ms();
        if report.poll(now) {
            let category = round_robin_report(&mut state, sink.as_mut());
            log::debug!("Round-robin report: {:?}", category);
        }
        if danger.poll(now) {
            danger_alert(&state, now, sink.as_mut());
        }
        if let Some(client) = mqtt.as_mut() {
            if status.poll(now) {
                client.publish_status(&StatusSnapshot::capture(&state, now), now);
            }
        }
    }
}
