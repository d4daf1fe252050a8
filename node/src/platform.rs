//! esp-idf implementation of the node platform
//!
//! Owns every peripheral the cycle touches and backs the
//! `telemetry::NodePlatform` trait with them. Nothing here decides
//! anything; policy lives in the telemetry crate.

use std::time::Duration;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use telemetry::report::Radio;
use telemetry::{DistanceReader, NodePlatform};

use crate::battery::BatteryMonitor;
use crate::radio::LoraRadio;
use crate::sonar::SonarLine;
use crate::status_led::StatusLeds;
use crate::temperature::TemperatureSensor;

pub struct EspPlatform {
    /// Relay switching power to every attached sensor
    rail: PinDriver<'static, AnyOutputPin, Output>,
    leds: StatusLeds,
    battery: BatteryMonitor,
    temperature: TemperatureSensor,
    sonar: SonarLine,
    distance: DistanceReader,
    radio: LoraRadio,
}

impl EspPlatform {
    pub fn new(
        rail: PinDriver<'static, AnyOutputPin, Output>,
        leds: StatusLeds,
        battery: BatteryMonitor,
        temperature: TemperatureSensor,
        sonar: SonarLine,
        distance: DistanceReader,
        radio: LoraRadio,
    ) -> Self {
        Self {
            rail,
            leds,
            battery,
            temperature,
            sonar,
            distance,
            radio,
        }
    }

    /// Final power-down before deep sleep: rail off, indicators dark
    pub fn shutdown(&mut self) {
        let _ = self.rail.set_low();
        self.leds.off();
    }
}

impl Radio for EspPlatform {
    fn send(&mut self, payload: &[u8]) -> bool {
        self.radio.send(payload)
    }
}

impl NodePlatform for EspPlatform {
    fn set_sensor_rail(&mut self, on: bool) {
        let _ = self.rail.set_level(on.into());
    }

    fn set_indicators(&mut self, left: bool, right: bool) {
        self.leds.set(left, right);
    }

    fn read_battery_volts(&mut self) -> f32 {
        self.battery.read_volts()
    }

    fn read_temperature_c(&mut self) -> Option<f32> {
        self.temperature.read_celsius()
    }

    fn read_distance_mm(&mut self) -> Option<u16> {
        self.distance.read(&mut self.sonar)
    }

    fn delay(&mut self, duration: Duration) {
        FreeRtos::delay_ms(duration.as_millis() as u32);
    }
}
