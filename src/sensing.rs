// SumpWatch — Signal helpers shared by the sensor drivers
//
// Everything here is hardware-independent: the drivers hand raw samples or
// read closures in, and get a cleaned-up value back.

use thiserror::Error;

use crate::config::*;

#[derive(Debug, Error, PartialEq)]
pub enum SensorError {
    #[error("no samples collected")]
    NoSamples,
    #[error("implausible temperature {0:.1}°F")]
    Implausible(f64),
    #[error("gave up after {0} attempts")]
    RetriesExhausted(usize),
}

/// Peak-to-peak amplitude of a batch of ADC samples.
///
/// A current transformer swings around its bias point, so the spread of the
/// batch tracks load current regardless of where the bias sits.
pub fn peak_to_peak(samples: &[i32]) -> Result<i32, SensorError> {
    let (lo, hi) = samples
        .iter()
        .fold(None, |acc: Option<(i32, i32)>, &s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
        .ok_or(SensorError::NoSamples)?;
    Ok(hi - lo)
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f64 {
    celsius as f64 * 9.0 / 5.0 + 32.0
}

/// Reject values a DS18B20 cannot produce, and the 85 °C power-on value it
/// reports when a conversion never happened.
pub fn check_temperature(temp_f: f64) -> Result<f64, SensorError> {
    if !(TEMP_MIN_F..=TEMP_MAX_F).contains(&temp_f) || temp_f == TEMP_POWER_ON_F {
        return Err(SensorError::Implausible(temp_f));
    }
    Ok(temp_f)
}

/// Call `read` up to `attempts` times, returning the first success.
pub fn read_with_retry<T, E, F>(attempts: usize, mut read: F) -> Result<T, SensorError>
where
    E: core::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    for attempt in 1..=attempts {
        match read() {
            Ok(v) => return Ok(v),
            Err(e) => log::debug!("sensor read attempt {}/{} failed: {}", attempt, attempts, e),
        }
    }
    Err(SensorError::RetriesExhausted(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_to_peak() {
        assert_eq!(peak_to_peak(&[1800, 1650, 1950, 1700]), Ok(300));
        assert_eq!(peak_to_peak(&[42]), Ok(0));
        assert_eq!(peak_to_peak(&[]), Err(SensorError::NoSamples));
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_check_temperature() {
        assert_eq!(check_temperature(72.5), Ok(72.5));
        assert_eq!(check_temperature(190.0), Ok(190.0));
        assert!(check_temperature(185.0).is_err());
        assert!(check_temperature(300.0).is_err());
        assert!(check_temperature(-100.0).is_err());
    }

    #[test]
    fn test_retry_stops_at_first_success() {
        let mut calls = 0;
        let result = read_with_retry(MAXRETRY, || {
            calls += 1;
            if calls < 3 { Err("crc mismatch") } else { Ok(68.0) }
        });
        assert_eq!(result, Ok(68.0));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let result: Result<f64, _> = read_with_retry(MAXRETRY, || {
            calls += 1;
            Err("bus short")
        });
        assert_eq!(result, Err(SensorError::RetriesExhausted(MAXRETRY)));
        assert_eq!(calls, MAXRETRY);
    }
}
