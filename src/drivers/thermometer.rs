// SumpWatch — DS18B20 thermometer
//
// One sensor per 1-Wire pin (water heater chimney, basement ambient), so the
// first DS18B20 found on the bus is the one we want.

use anyhow::anyhow;
use ds18b20::{Ds18b20, Resolution};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
use one_wire_bus::{Address, OneWire};

use sumpwatch::config::MAXRETRY;
use sumpwatch::sensing::{celsius_to_fahrenheit, check_temperature, read_with_retry};

pub struct Thermometer {
    label: &'static str,
    one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
    address: Option<Address>,
    delay: Ets,
    last_f: f64,
}

impl Thermometer {
    pub fn new(pin: AnyIOPin, label: &'static str, initial_f: f64) -> anyhow::Result<Self> {
        let mut driver = PinDriver::input_output_od(pin)?;
        driver.set_pull(Pull::Up)?;
        driver.set_high()?;

        let one_wire = OneWire::new(driver)
            .map_err(|e| anyhow!("failed to initialise one-wire bus for {}: {:?}", label, e))?;

        let mut therm = Self {
            label,
            one_wire,
            address: None,
            delay: Ets,
            last_f: initial_f,
        };
        therm.discover();
        Ok(therm)
    }

    fn discover(&mut self) {
        self.address = None;
        for found in self.one_wire.devices(false, &mut self.delay) {
            match found {
                Ok(address) if address.family_code() == ds18b20::FAMILY_CODE => {
                    self.address = Some(address);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("{}: one-wire scan failed: {:?}", self.label, e);
                    break;
                }
            }
        }

        match self.address {
            Some(address) => log::info!("{}: DS18B20 at {:?}", self.label, address),
            None => log::warn!("{}: no DS18B20 found", self.label),
        }
    }

    fn read_once(&mut self) -> anyhow::Result<f64> {
        if self.address.is_none() {
            self.discover();
        }
        let address = self
            .address
            .ok_or_else(|| anyhow!("{}: sensor missing", self.label))?;

        let sensor = Ds18b20::new::<esp_idf_sys::EspError>(address)
            .map_err(|e| anyhow!("{}: bad address: {:?}", self.label, e))?;

        if let Err(e) = sensor.start_temp_measurement(&mut self.one_wire, &mut self.delay) {
            self.address = None;
            return Err(anyhow!("{}: conversion start failed: {:?}", self.label, e));
        }
        Resolution::Bits12.delay_for_measurement_time(&mut self.delay);

        let data = match sensor.read_data(&mut self.one_wire, &mut self.delay) {
            Ok(data) => data,
            Err(e) => {
                self.address = None;
                return Err(anyhow!("{}: scratchpad read failed: {:?}", self.label, e));
            }
        };

        Ok(check_temperature(celsius_to_fahrenheit(data.temperature))?)
    }

    /// Read °F with up to [`MAXRETRY`] attempts; keeps the previous value if
    /// every attempt fails.
    pub fn read_f(&mut self) -> f64 {
        match read_with_retry(MAXRETRY, || self.read_once()) {
            Ok(temp) => self.last_f = temp,
            Err(e) => log::warn!("{}: {}; keeping {:.1}°F", self.label, e, self.last_f),
        }
        self.last_f
    }
}
