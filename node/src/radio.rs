//! RFM95 LoRa radio wrapper
//!
//! Thin blocking shell over the `sx127x_lora` driver. Frequency, TX
//! power and addressing are applied once here and never varied per
//! message; transmission is fire-and-forget with no acknowledgment.
//!
//! Payloads carry a RadioHead-compatible 4-byte header (destination,
//! source, packet id, flags) so the base station's stock receiver
//! library accepts them.

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver};
use log::{info, warn};
use sx127x_lora::LoRa;

use crate::config::RadioConfig;

const HEADER_LEN: usize = 4;
const MAX_FRAME: usize = 255;

type OutPin = PinDriver<'static, AnyOutputPin, Output>;
type Spi = SpiDeviceDriver<'static, SpiDriver<'static>>;

pub struct LoraRadio {
    lora: LoRa<Spi, OutPin, OutPin, Ets>,
    node: u8,
    destination: u8,
    packet_id: u8,
}

impl LoraRadio {
    /// Bring up the radio and fix its transmit parameters. An
    /// unreachable or wrong-version module is a broken physical link
    /// with no local recovery; the caller is expected to treat this
    /// as fatal.
    pub fn new(spi: Spi, cs: OutPin, reset: OutPin, config: &RadioConfig) -> Option<Self> {
        let mut lora = match LoRa::new(spi, cs, reset, config.frequency_mhz, Ets) {
            Ok(lora) => lora,
            Err(e) => {
                warn!("RFM95 init failed: {:?}", e);
                return None;
            }
        };

        if let Err(e) = lora.set_tx_power(config.tx_power_dbm, 1) {
            warn!("RFM95 TX power setup failed: {:?}", e);
            return None;
        }

        info!(
            "RFM95 up at {} MHz, {} dBm, node {} -> {}",
            config.frequency_mhz, config.tx_power_dbm, config.node_address, config.destination
        );

        Some(Self {
            lora,
            node: config.node_address,
            destination: config.destination,
            packet_id: 0,
        })
    }
}

impl telemetry::report::Radio for LoraRadio {
    fn send(&mut self, payload: &[u8]) -> bool {
        if payload.len() + HEADER_LEN > MAX_FRAME {
            warn!("payload {} bytes does not fit a radio frame", payload.len());
            return false;
        }

        let mut buffer = [0u8; MAX_FRAME];
        buffer[0] = self.destination;
        buffer[1] = self.node;
        buffer[2] = self.packet_id;
        buffer[3] = 0; // flags
        buffer[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
        self.packet_id = self.packet_id.wrapping_add(1);

        match self
            .lora
            .transmit_payload_busy(buffer, HEADER_LEN + payload.len())
        {
            Ok(_) => true,
            Err(e) => {
                warn!("radio transmit failed: {:?}", e);
                false
            }
        }
    }
}
