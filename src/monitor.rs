// SumpWatch — Monitor state
//
// Everything the sketch kept in globals lives in one struct, owned by the
// monitor task and handed to the reporter by `&mut`. Readings come in from
// the polling tasks; on/off edges are turned into run starts, completed-run
// latches and duty-cycle entries.

use crate::config::*;
use crate::duty::DutyCycle;
use crate::events::{Appliance, EventLatch, Reading, Transition};

// ---------------------------------------------------------------------------
// Per-appliance run tracking
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    pub on: bool,
    start_ms: u32,
    pub latch: EventLatch,
}

impl RunTracker {
    /// Feed the current on/off state; returns the edge, if this was one.
    pub fn update(&mut self, on: bool, now_ms: u32) -> Option<Transition> {
        match (self.on, on) {
            (false, true) => {
                self.on = true;
                self.start_ms = now_ms;
                Some(Transition::Started)
            }
            (true, false) => {
                self.on = false;
                let duration_secs = now_ms.wrapping_sub(self.start_ms) / 1000;
                self.latch = EventLatch::Completed { duration_secs };
                Some(Transition::Stopped { duration_secs })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Monitor state
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct MonitorState {
    /// Round-robin report counter.
    pub report_count: u32,

    pub sump_cur: i32,
    pub hvac_cur: i32,
    pub water_temp: f64,
    pub ambient_temp: f64,
    pub heater_on: bool,

    /// Recent sump readings, so a short run between reports is not missed.
    pub sump_history: [i32; HIST],
    hist_ptr: usize,

    pub sump: RunTracker,
    pub hvac: RunTracker,
    pub duty: DutyCycle,
}

impl MonitorState {
    pub fn new() -> Self {
        Self {
            report_count: 0,
            sump_cur: 0,
            hvac_cur: 0,
            water_temp: INITIAL_WATER_TEMP_F,
            ambient_temp: INITIAL_AMBIENT_TEMP_F,
            heater_on: false,
            sump_history: [0; HIST],
            hist_ptr: 0,
            sump: RunTracker::default(),
            hvac: RunTracker::default(),
            duty: DutyCycle::new(),
        }
    }

    /// Apply one reading taken at `now_ms`.
    pub fn apply(&mut self, reading: Reading, now_ms: u32) {
        match reading {
            Reading::SumpCurrent(cur) => self.record_sump(cur, now_ms),
            Reading::HvacCurrent(cur) => self.record_hvac(cur, now_ms),
            Reading::WaterTemp(temp) => self.record_water_temp(temp),
            Reading::AmbientTemp(temp) => self.ambient_temp = temp,
        }
    }

    pub fn record_sump(&mut self, cur: i32, now_ms: u32) {
        self.sump_cur = cur;
        self.sump_history[self.hist_ptr] = cur;
        self.hist_ptr = (self.hist_ptr + 1) % HIST;

        let transition = self.sump.update(cur > PUMP_ON, now_ms);
        if transition == Some(Transition::Started) {
            self.duty.record_run(now_ms);
        }
        log_transition(Appliance::Sump, transition);
    }

    pub fn record_hvac(&mut self, cur: i32, now_ms: u32) {
        self.hvac_cur = cur;
        let transition = self.hvac.update(cur > MOTOR_ON, now_ms);
        log_transition(Appliance::Hvac, transition);
    }

    pub fn record_water_temp(&mut self, temp: f64) {
        self.water_temp = temp;
        let on = temp > FLAME_ON;
        if on != self.heater_on {
            self.heater_on = on;
            log::info!(
                "{} {} ({:.1}°F)",
                Appliance::WaterHeater.display_name(),
                if on { "fired" } else { "off" },
                temp
            );
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

fn log_transition(appliance: Appliance, transition: Option<Transition>) {
    match transition {
        Some(Transition::Started) => log::info!("{} started", appliance.display_name()),
        Some(Transition::Stopped { duration_secs }) => {
            log::info!("{} stopped after {} s", appliance.display_name(), duration_secs)
        }
        None => {}
    }
}
