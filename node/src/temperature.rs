//! DS18B20 one-wire temperature sensor
//!
//! The bus and device are initialized lazily on the first read of a
//! cycle: the sensor hangs off the switched rail, so probing it before
//! the rail settles would only find a dead line. Any fault surfaces as
//! `None`, which the acquisition pipeline treats as fatal for the
//! cycle.

use ds18b20::{Ds18b20, Resolution};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver};
use esp_idf_hal::sys::EspError;
use log::{info, warn};
use one_wire_bus::OneWire;

type Bus = OneWire<PinDriver<'static, AnyIOPin, InputOutput>>;

pub struct TemperatureSensor {
    pin: Option<AnyIOPin>,
    bus: Option<Bus>,
    device: Option<Ds18b20>,
}

impl TemperatureSensor {
    pub fn new(pin: AnyIOPin) -> Self {
        Self {
            pin: Some(pin),
            bus: None,
            device: None,
        }
    }

    fn ensure_init(&mut self) -> Option<()> {
        if self.bus.is_none() {
            let pin = self.pin.take()?;
            let driver = match PinDriver::input_output_od(pin) {
                Ok(d) => d,
                Err(e) => {
                    warn!("one-wire pin setup failed: {e}");
                    return None;
                }
            };
            match OneWire::new(driver) {
                Ok(bus) => self.bus = Some(bus),
                Err(e) => {
                    warn!("one-wire bus setup failed: {:?}", e);
                    return None;
                }
            }
        }

        if self.device.is_none() {
            let bus = self.bus.as_mut()?;
            let mut found = None;
            for device in bus.devices(false, &mut Ets) {
                match device {
                    Ok(address) if address.family_code() == ds18b20::FAMILY_CODE => {
                        found = Some(address);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("one-wire scan failed: {:?}", e);
                        return None;
                    }
                }
            }
            let address = found?;
            info!("found DS18B20 at {:?}", address);
            self.device = Some(Ds18b20::new::<EspError>(address).ok()?);
        }

        Some(())
    }

    /// One temperature conversion in Celsius, `None` on any bus or
    /// sensor fault
    pub fn read_celsius(&mut self) -> Option<f32> {
        if self.ensure_init().is_none() {
            warn!("no DS18B20 answering on the one-wire bus");
            return None;
        }

        let bus = self.bus.as_mut()?;
        let device = self.device.as_ref()?;

        if let Err(e) = ds18b20::start_simultaneous_temp_measurement(bus, &mut Ets) {
            warn!("temperature conversion start failed: {:?}", e);
            return None;
        }
        Resolution::Bits12.delay_for_measurement_time(&mut Ets);

        match device.read_data(bus, &mut Ets) {
            Ok(data) => Some(data.temperature),
            Err(e) => {
                warn!("temperature read failed: {:?}", e);
                None
            }
        }
    }
}
