// SumpWatch — Webhook publisher
//
// POSTs each published value to the cloud relay, which forwards it on to
// ThingSpeak. Fire-and-forget: a failed POST is logged and dropped.

use std::time::Duration;

use anyhow::anyhow;
use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::http::Status;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

use sumpwatch::config::HTTP_TIMEOUT_MS;
use sumpwatch::report::{Publisher, Visibility, WebhookEvent};

pub struct WebhookPublisher {
    url: &'static str,
    client: HttpClient<EspHttpConnection>,
}

impl WebhookPublisher {
    pub fn new(url: &'static str) -> anyhow::Result<Self> {
        let conf = HttpConfiguration {
            timeout: Some(Duration::from_millis(HTTP_TIMEOUT_MS)),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let client = HttpClient::wrap(EspHttpConnection::new(&conf)?);
        log::info!("Webhook publisher ready ({})", url);
        Ok(Self { url, client })
    }

    fn post(&mut self, body: &str) -> anyhow::Result<u16> {
        let len = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", len.as_str()),
        ];

        let mut request = self
            .client
            .post(self.url, &headers)
            .map_err(|e| anyhow!("request: {e:?}"))?;
        request
            .write_all(body.as_bytes())
            .map_err(|e| anyhow!("write: {e:?}"))?;
        request.flush().map_err(|e| anyhow!("flush: {e:?}"))?;
        let response = request.submit().map_err(|e| anyhow!("submit: {e:?}"))?;
        Ok(response.status())
    }
}

impl Publisher for WebhookPublisher {
    fn publish(&mut self, key: &str, value: &str, visibility: Visibility) {
        let body = match WebhookEvent::new(key, value, visibility).to_json() {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Webhook {}: encode failed: {}", key, e);
                return;
            }
        };

        match self.post(&body) {
            Ok(status) if (200..300).contains(&status) => {
                log::info!("Published {}={}", key, value)
            }
            Ok(status) => log::warn!("Webhook {} rejected (HTTP {})", key, status),
            Err(e) => log::warn!("Webhook {} failed: {:#}", key, e),
        }
    }
}
