// SumpWatch — Home Assistant MQTT status
//
// One JSON snapshot every few minutes, QoS 0 and not retained. We don't wait
// for the broker; enqueue failures are logged and the next snapshot tries
// again.

use embedded_svc::mqtt::client::QoS;
use esp_idf_svc::mqtt::client::{EspMqttClient, MqttClientConfiguration};

use sumpwatch::config::{MQTT_CLIENT_ID, MQTT_STATE_TOPIC};
use sumpwatch::report::StatusSnapshot;

pub struct MqttStatus {
    client: EspMqttClient<'static>,
    last_publish_ms: Option<u32>,
}

impl MqttStatus {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let conf = MqttClientConfiguration {
            client_id: Some(MQTT_CLIENT_ID),
            ..Default::default()
        };
        let client = EspMqttClient::new_cb(url, &conf, |event| {
            log::debug!("MQTT event: {:?}", event.payload());
        })?;
        log::info!("MQTT client started ({})", url);
        Ok(Self {
            client,
            last_publish_ms: None,
        })
    }

    pub fn publish_status(&mut self, snapshot: &StatusSnapshot, now_ms: u32) {
        let payload = match snapshot.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("MQTT status encode failed: {}", e);
                return;
            }
        };

        match self
            .client
            .enqueue(MQTT_STATE_TOPIC, QoS::AtMostOnce, false, payload.as_bytes())
        {
            Ok(_) => {
                if let Some(last) = self.last_publish_ms {
                    log::info!("MQTT status sent ({} s since last)", now_ms.wrapping_sub(last) / 1000);
                }
                self.last_publish_ms = Some(now_ms);
            }
            Err(e) => log::warn!("MQTT status enqueue failed: {}", e),
        }
    }
}
