// SumpWatch — Current transformer driver
//
// Both CTs sit on ADC1 of the ESP32-C3. The one-shot unit is created once
// and shared between the polling tasks behind a mutex; a measurement is a
// burst of reads over a few mains cycles reduced to its peak-to-peak swing.

use std::sync::Mutex;

use anyhow::Context;
use esp_idf_hal::delay::Ets;
use esp_idf_sys::esp;

use sumpwatch::config::*;
use sumpwatch::sensing::peak_to_peak;

/// Thread-safe handle to the shared ADC unit.
pub type SharedAdc = &'static Mutex<AdcUnit>;

#[derive(Debug, Clone, Copy)]
pub enum CtChannel {
    Hvac,
    Sump,
}

impl CtChannel {
    fn raw(self) -> esp_idf_sys::adc_channel_t {
        match self {
            Self::Hvac => esp_idf_sys::adc_channel_t_ADC_CHANNEL_2, // GPIO2
            Self::Sump => esp_idf_sys::adc_channel_t_ADC_CHANNEL_4, // GPIO4
        }
    }
}

pub struct AdcUnit {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
}

// SAFETY: the one-shot driver calls are thread-safe in ESP-IDF, and the
// handle is only ever touched through the surrounding Mutex.
unsafe impl Send for AdcUnit {}

impl AdcUnit {
    /// Create ADC1 and configure both CT channels (12 bit, 11 dB → 0–3.3 V).
    pub fn new() -> anyhow::Result<Self> {
        let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
        unsafe {
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))
                .context("ADC unit init failed")?;

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            for ch in [CtChannel::Hvac, CtChannel::Sump] {
                esp!(esp_idf_sys::adc_oneshot_config_channel(handle, ch.raw(), &chan_cfg))
                    .with_context(|| format!("ADC channel config failed ({:?})", ch))?;
            }
        }

        log::info!("ADC1 initialised (hvac GPIO{}, sump GPIO{})", PIN_HVAC_CT, PIN_SUMP_CT);
        Ok(Self { handle })
    }

    fn read_raw(&self, ch: CtChannel) -> anyhow::Result<i32> {
        let mut raw: i32 = 0;
        esp!(unsafe { esp_idf_sys::adc_oneshot_read(self.handle, ch.raw(), &mut raw) })?;
        Ok(raw)
    }

    /// Peak-to-peak amplitude over [`CURRENT_SAMPLES`] reads, in raw counts.
    pub fn measure(&self, ch: CtChannel) -> anyhow::Result<i32> {
        let mut samples = Vec::with_capacity(CURRENT_SAMPLES);
        for _ in 0..CURRENT_SAMPLES {
            samples.push(self.read_raw(ch)?);
            Ets::delay_us(CURRENT_SAMPLE_GAP_US);
        }
        Ok(peak_to_peak(&samples)?)
    }
}

/// Lock the shared unit and take one measurement.
pub fn measure(adc: SharedAdc, ch: CtChannel) -> anyhow::Result<i32> {
    let unit = adc
        .lock()
        .map_err(|_| anyhow::anyhow!("ADC mutex poisoned"))?;
    unit.measure(ch)
}
