fn main() {
    // Host builds (library + unit tests) have no ESP-IDF environment to export.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    for var in [
        "SUMPWATCH_WIFI_SSID",
        "SUMPWATCH_WIFI_PASS",
        "SUMPWATCH_WEBHOOK_URL",
        "SUMPWATCH_MQTT_URL",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}
