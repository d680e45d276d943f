// SumpWatch — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up logging, the ADC and both 1-Wire thermometers.
//   2. Join Wi-Fi (the monitor keeps running offline if this fails).
//   3. Create the webhook publisher and, if configured, the MQTT client.
//   4. Spawn the sump, appliance and monitor tasks.
//
// The hardware-independent logic (state, reporter, duty cycle) lives in the
// `sumpwatch` library so it can be tested on the host.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod tasks;

#[cfg(target_os = "espidf")]
use std::sync::{mpsc, Mutex};
#[cfg(target_os = "espidf")]
use std::thread;
#[cfg(target_os = "espidf")]
use std::time::Duration;

#[cfg(target_os = "espidf")]
use anyhow::anyhow;
#[cfg(target_os = "espidf")]
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::IOPin;
#[cfg(target_os = "espidf")]
use esp_idf_hal::prelude::*;
#[cfg(target_os = "espidf")]
use esp_idf_svc::eventloop::EspSystemEventLoop;
#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::EspDefaultNvsPartition;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

#[cfg(target_os = "espidf")]
use sumpwatch::config::*;
#[cfg(target_os = "espidf")]
use sumpwatch::report::{LogPublisher, Publisher};

#[cfg(target_os = "espidf")]
use crate::drivers::current::AdcUnit;
#[cfg(target_os = "espidf")]
use crate::drivers::mqtt::MqttStatus;
#[cfg(target_os = "espidf")]
use crate::drivers::thermometer::Thermometer;
#[cfg(target_os = "espidf")]
use crate::drivers::webhook::WebhookPublisher;

// ---------------------------------------------------------------------------
// Utility: milliseconds since boot (wraps at ~49 days; all users wrap too)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub fn now_ms() -> u32 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("sumpwatch firmware only runs on ESP-IDF targets; use `cargo test --lib` on the host");
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("SumpWatch firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // The ADC unit is shared by the sump and appliance tasks for the life of
    // the firmware, so it is leaked to get a 'static handle.
    let adc: &'static Mutex<AdcUnit> = Box::leak(Box::new(Mutex::new(AdcUnit::new()?)));

    let water = Thermometer::new(
        peripherals.pins.gpio5.downgrade(),
        "water heater",
        INITIAL_WATER_TEMP_F,
    )?;
    let ambient = Thermometer::new(
        peripherals.pins.gpio6.downgrade(),
        "ambient",
        INITIAL_AMBIENT_TEMP_F,
    )?;

    // ---- Network ----------------------------------------------------------
    // Held for the life of the firmware; dropping it tears the link down.
    let mut esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?;
    let online = match connect_wifi(&mut esp_wifi, sys_loop) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Wi-Fi unavailable ({:#}); reporting to log only", e);
            false
        }
    };

    let sink: Box<dyn Publisher + Send> = if online && !WEBHOOK_URL.is_empty() {
        Box::new(WebhookPublisher::new(WEBHOOK_URL)?)
    } else {
        log::warn!("No webhook configured; round-robin values go to the log");
        Box::new(LogPublisher)
    };

    let mqtt = if online && !MQTT_URL.is_empty() {
        match MqttStatus::new(MQTT_URL) {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("MQTT client failed to start: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    // ---- Channels ---------------------------------------------------------
    let (reading_tx, reading_rx) = mpsc::channel();

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------
    let sump_tx = reading_tx.clone();
    thread::Builder::new()
        .name("sump".into())
        .stack_size(STACK_SUMP)
        .spawn(move || {
            tasks::sensor::sump_task(adc, sump_tx);
        })?;

    thread::Builder::new()
        .name("appliance".into())
        .stack_size(STACK_APPLIANCE)
        .spawn(move || {
            tasks::sensor::appliance_task(adc, water, ambient, reading_tx);
        })?;

    thread::Builder::new()
        .name("monitor".into())
        .stack_size(STACK_MONITOR)
        .spawn(move || {
            tasks::monitor::monitor_task(reading_rx, sink, mqtt);
        })?;

    log::info!("Boot complete, entering normal operation");

    // Main thread has nothing left to do. Park it forever; `esp_wifi` must
    // stay in scope or the link goes down.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

// ---------------------------------------------------------------------------
// Boot helpers
// ---------------------------------------------------------------------------

/// Join the configured access point, retrying [`WIFI_CONNECT_ATTEMPTS`] times.
#[cfg(target_os = "espidf")]
fn connect_wifi(esp_wifi: &mut EspWifi<'static>, sys_loop: EspSystemEventLoop) -> anyhow::Result<()> {
    if WIFI_SSID.is_empty() {
        return Err(anyhow!("no SSID configured (set SUMPWATCH_WIFI_SSID at build time)"));
    }

    let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: WIFI_PASS
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;
    log::info!("Wi-Fi started, connecting to `{}`", WIFI_SSID);

    let mut last_err = None;
    for attempt in 1..=WIFI_CONNECT_ATTEMPTS {
        match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
            Ok(()) => {
                log::info!("Wi-Fi up on attempt {}", attempt);
                return Ok(());
            }
            Err(e) => {
                log::warn!("Wi-Fi attempt {}/{} failed: {}", attempt, WIFI_CONNECT_ATTEMPTS, e);
                last_err = Some(e);
            }
        }
        let _ = wifi.disconnect();
        thread::sleep(Duration::from_millis(WIFI_RETRY_DELAY_MS));
    }

    Err(anyhow!(
        "gave up after {} attempts: {:?}",
        WIFI_CONNECT_ATTEMPTS,
        last_err
    ))
}
