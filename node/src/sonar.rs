//! UART byte source for the ME007YS ultrasonic sensor
//!
//! The sensor free-runs at 9600 baud on a one-way line; only RX is
//! wired. Frame parsing and sample filtering live in the `telemetry`
//! and `me007ys` crates; this is just the byte tap.

use std::time::Duration;

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use telemetry::ByteSource;

/// Per-poll receive timeout. Frames arrive every ~100ms, so a short
/// block keeps the decode loop from spinning without stalling it.
const POLL_TIMEOUT: Duration = Duration::from_millis(20);

pub struct SonarLine {
    uart: UartDriver<'static>,
}

impl SonarLine {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl ByteSource for SonarLine {
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, TickType::from(POLL_TIMEOUT).ticks()) {
            Ok(1) => Some(buf[0]),
            Ok(_) => None,
            Err(_) => None,
        }
    }
}
