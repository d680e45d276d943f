// SumpWatch — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_HVAC_CT: i32 = 2;     // D0/A0 — HVAC fan current transformer (ADC1_CH2)
pub const PIN_SUMP_CT: i32 = 4;     // D2/A2 — Sump pump current transformer (ADC1_CH4)
pub const PIN_WATER_TEMP: i32 = 5;  // D3    — DS18B20 on the water heater chimney
pub const PIN_AMBIENT_TEMP: i32 = 6; // D4   — DS18B20 for ambient basement temperature

// ---------------------------------------------------------------------------
// Detection Thresholds
// ---------------------------------------------------------------------------
pub const PUMP_ON: i32 = 100;       // raw p-p counts; resting state ~40-50 for my sump pump
pub const MOTOR_ON: i32 = 2500;     // raw p-p counts; is hvac running?
pub const FLAME_ON: f64 = 190.0;    // °F at the chimney; yours may vary

// ---------------------------------------------------------------------------
// Sensor Acquisition
// ---------------------------------------------------------------------------
pub const MAXRETRY: usize = 4;             // max DS18B20 attempts before keeping the last value
pub const CURRENT_SAMPLES: usize = 150;    // ADC reads per current measurement
pub const CURRENT_SAMPLE_GAP_US: u32 = 333; // ~50 ms window, three 60 Hz cycles
pub const TEMP_MIN_F: f64 = -67.0;         // DS18B20 datasheet range
pub const TEMP_MAX_F: f64 = 257.0;
pub const TEMP_POWER_ON_F: f64 = 185.0;    // 85 °C scratchpad reset value
pub const INITIAL_WATER_TEMP_F: f64 = 70.0;
pub const INITIAL_AMBIENT_TEMP_F: f64 = 60.0;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------
pub const HIST: usize = 160;       // sump readings kept between reports (~5 min at SUMP_CHECK_MS)
pub const SMAX: usize = 16;        // most sump runs we might ever see in a window
pub const DANGER: usize = 6;       // sump runs per duty window before I worry
pub const DUTY_WINDOW_MS: u32 = 1_800_000; // 30 minutes

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SUMP: usize = 4096;
pub const STACK_APPLIANCE: usize = 6144;
pub const STACK_MONITOR: usize = 12288;   // HTTP + TLS + MQTT live here

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SUMP_CHECK_MS: u64 = 2_003;       // sump typically runs only for 20 s or so
pub const ALL_CHECK_MS: u64 = 17_351;       // hvac and water heater have longer duty cycles
pub const REPORT_INTERVAL_MS: u32 = 60_013; // one round-robin value per call
pub const DANGER_CHECK_MS: u32 = 900_000;   // check for sump danger every 15 minutes
pub const MQTT_INTERVAL_MS: u32 = 300_007;  // Home Assistant status every ~5 minutes
pub const WIFI_RETRY_DELAY_MS: u64 = 3_000;
pub const WIFI_CONNECT_ATTEMPTS: u32 = 5;
pub const HTTP_TIMEOUT_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Network (set at build time)
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = match option_env!("SUMPWATCH_WIFI_SSID") {
    Some(v) => v,
    None => "",
};
pub const WIFI_PASS: &str = match option_env!("SUMPWATCH_WIFI_PASS") {
    Some(v) => v,
    None => "",
};
pub const WEBHOOK_URL: &str = match option_env!("SUMPWATCH_WEBHOOK_URL") {
    Some(v) => v,
    None => "",
};
pub const MQTT_URL: &str = match option_env!("SUMPWATCH_MQTT_URL") {
    Some(v) => v,
    None => "",
};
pub const MQTT_CLIENT_ID: &str = "sumpwatch";
pub const MQTT_STATE_TOPIC: &str = "homeassistant/sensor/sumpwatch/state";
