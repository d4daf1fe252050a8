//! Battery voltage via a scaled one-shot ADC read
//!
//! The pack sits behind a resistor divider so it lands inside the ADC
//! range. One raw sample per cycle, taken as-is: unlike the distance
//! channel there is no retry and no validity check, a deliberate
//! asymmetry inherited from the deployment.

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::Gpio2;
use esp_idf_hal::sys::EspError;
use log::warn;

pub struct BatteryMonitor {
    channel: AdcChannelDriver<'static, Gpio2, AdcDriver<'static, ADC1>>,
    divider_scale: f32,
}

impl BatteryMonitor {
    pub fn new(adc: ADC1, pin: Gpio2, divider_scale: f32) -> Result<Self, EspError> {
        let driver = AdcDriver::new(adc)?;
        let config = AdcChannelConfig {
            attenuation: DB_11,
            calibration: true,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        Ok(Self {
            channel,
            divider_scale,
        })
    }

    /// Pack voltage in volts. A failed conversion reads as 0.0 and
    /// rides out in the report like any other sample.
    pub fn read_volts(&mut self) -> f32 {
        match self.channel.read() {
            Ok(millivolts) => millivolts as f32 * self.divider_scale / 1000.0,
            Err(e) => {
                warn!("battery ADC read failed: {e}");
                0.0
            }
        }
    }
}
