// SumpWatch — Sensor Tasks
//
// Two polling loops at different rates. The sump runs for ~20 s at a time
// so it is checked every couple of seconds; the HVAC and water heater have
// long duty cycles and share a slower loop with the ambient thermometer.
// Neither task touches monitor state: readings go over the channel.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use sumpwatch::config::*;
use sumpwatch::events::Reading;

use crate::drivers::current::{self, CtChannel, SharedAdc};
use crate::drivers::thermometer::Thermometer;

pub fn sump_task(adc: SharedAdc, readings: Sender<Reading>) {
    log::info!("Sump task started");
    let interval = Duration::from_millis(SUMP_CHECK_MS);

    loop {
        let tick_start = Instant::now();

        match current::measure(adc, CtChannel::Sump) {
            Ok(cur) => {
                if readings.send(Reading::SumpCurrent(cur)).is_err() {
                    log::warn!("Reading channel closed, exiting sump task");
                    return;
                }
            }
            Err(e) => log::warn!("Sump current read error: {:#}", e),
        }

        sleep_remainder(tick_start, interval);
    }
}

pub fn appliance_task(
    adc: SharedAdc,
    mut water: Thermometer,
    mut ambient: Thermometer,
    readings: Sender<Reading>,
) {
    log::info!("Appliance task started");
    let interval = Duration::from_millis(ALL_CHECK_MS);

    loop {
        let tick_start = Instant::now();

        let mut batch = Vec::with_capacity(3);
        match current::measure(adc, CtChannel::Hvac) {
            Ok(cur) => batch.push(Reading::HvacCurrent(cur)),
            Err(e) => log::warn!("HVAC current read error: {:#}", e),
        }
        batch.push(Reading::WaterTemp(water.read_f()));
        batch.push(Reading::AmbientTemp(ambient.read_f()));

        for reading in batch {
            if readings.send(reading).is_err() {
                log::warn!("Reading channel closed, exiting appliance task");
                return;
            }
        }

        sleep_remainder(tick_start, interval);
    }
}

fn sleep_remainder(tick_start: Instant, interval: Duration) {
    let elapsed = tick_start.elapsed();
    if elapsed < interval {
        thread::sleep(interval - elapsed);
    }
}
