//! Telemetry report formatting and radio hand-off
//!
//! The wire payload is plain text parsed by the base station by
//! splitting on commas then colons. That textual schema is a hard
//! compatibility contract: field order, separators and the one-decimal
//! float formatting must not change without touching the receiver.

use log::{info, warn};

/// Sentinel distance meaning "no valid measurement this cycle".
///
/// The target sitting beyond the sensor's ~4m ceiling is an expected
/// condition, not an error, so it rides along in an otherwise normal
/// report.
pub const DISTANCE_UNAVAILABLE: i32 = -1;

/// Payloads at or above this length are refused locally. The radio
/// offers no delivery receipt, so this size check is the only failure
/// the transmitter can actually detect.
///
/// This is the protocol ceiling, not the physical one: the radio
/// wrapper prepends a 4-byte addressing header, so its own 255-byte
/// frame limit trips a few bytes earlier and a 251..=255 byte payload
/// passes here but is refused at the driver. Real reports sit far
/// below both limits.
pub const MAX_PAYLOAD_LEN: usize = 256;

/// One cycle's measurements, immutable once constructed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReport {
    pub sequence: u8,
    pub battery_volts: f32,
    pub temperature_f: f32,
    pub distance_mm: i32,
}

impl TelemetryReport {
    /// Render the wire payload
    ///
    /// Receiver contract: `id:<seq>, batt:<v> v, temp:<f> F, dist:<mm> mm`
    /// with floats at exactly one decimal place.
    pub fn payload(&self) -> String {
        format!(
            "id:{}, batt:{:.1} v, temp:{:.1} F, dist:{} mm",
            self.sequence, self.battery_volts, self.temperature_f, self.distance_mm
        )
    }

    /// Copy of this report with the sequence shifted by a per-packet
    /// batch offset (mod 256)
    pub fn with_sequence_offset(&self, offset: u8) -> Self {
        Self {
            sequence: self.sequence.wrapping_add(offset),
            ..*self
        }
    }
}

/// Fire-and-forget packet transmit. Addressing and TX power are fixed
/// at startup; `send` reports whether the driver accepted the payload,
/// never whether anyone received it.
pub trait Radio {
    fn send(&mut self, payload: &[u8]) -> bool;
}

/// Format and transmit one report. Returns `false` on an oversized
/// payload or a driver-side send failure.
pub fn send_report<R: Radio>(radio: &mut R, report: &TelemetryReport) -> bool {
    send_payload(radio, &report.payload())
}

/// Transmit an already-formatted payload, enforcing the frame-size
/// ceiling. Split out from [`send_report`] so the boundary is
/// checkable without fabricating impossible field values.
pub fn send_payload<R: Radio>(radio: &mut R, payload: &str) -> bool {
    info!("len:{} msg:{}", payload.len(), payload);

    if payload.len() >= MAX_PAYLOAD_LEN {
        warn!(
            "report payload {} bytes, at or above the {} byte frame ceiling",
            payload.len(),
            MAX_PAYLOAD_LEN
        );
        return false;
    }

    radio.send(payload.as_bytes())
}
