//! ME007YS Waterproof Ultrasonic Distance Sensor UART Driver
//!
//! This crate provides a pure Rust parser for the ME007YS serial output
//! protocol. The sensor continuously emits 4-byte frames at 9600 baud:
//!
//! ```text
//! ┌──────┬───────────┬──────────┬──────────┐
//! │ 0xFF │ dist high │ dist low │ checksum │
//! └──────┴───────────┴──────────┴──────────┘
//! ```
//!
//! where `checksum == (0xFF + high + low) mod 256` and the distance is
//! `(high << 8) + low` millimeters.
//!
//! # Features
//!
//! - Byte-at-a-time parsing, no allocation
//! - Automatic checksum verification with resynchronization
//! - `no_std` compatible
//! - No external dependencies
//!
//! # Example
//!
//! ```ignore
//! use me007ys::Me007ysParser;
//!
//! let mut parser = Me007ysParser::new();
//!
//! // Feed bytes from UART
//! for byte in uart_bytes {
//!     if let Some(distance_mm) = parser.feed_byte(byte) {
//!         println!("Distance: {} mm", distance_mm);
//!     }
//! }
//! ```
//!
//! The protocol has no length field and no delimiter beyond the 0xFF
//! marker, so a payload byte equal to 0xFF can masquerade as a
//! frame start; only the checksum catches that, and a mismatch simply
//! restarts the hunt for the marker.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "logging")]
use log::warn;

/// Frame start marker
const MARKER: u8 = 0xFF;

/// Bytes accumulated before the checksum candidate arrives
const HEADER_LEN: usize = 3;

/// Maximum range of the sensor in millimeters (readings near this
/// value usually mean the target is out of range)
pub const MAX_RANGE_MM: u16 = 4500;

/// ME007YS frame parser with resynchronizing state machine
pub struct Me007ysParser {
    buffer: [u8; HEADER_LEN],
    index: usize,
}

impl Me007ysParser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self {
            buffer: [0; HEADER_LEN],
            index: 0,
        }
    }

    /// Feed a single byte from UART to the parser
    ///
    /// Returns `Some(distance_mm)` when the byte completes a frame with
    /// a valid checksum. A checksum mismatch discards the offending
    /// byte and resynchronizes on the next 0xFF marker; no error is
    /// ever surfaced for malformed input.
    pub fn feed_byte(&mut self, byte: u8) -> Option<u16> {
        if self.index == 0 {
            // Hunt for the frame marker
            if byte == MARKER {
                self.buffer[0] = byte;
                self.index = 1;
            }
            return None;
        }

        if self.index < HEADER_LEN {
            self.buffer[self.index] = byte;
            self.index += 1;
            return None;
        }

        // Fourth byte: checksum candidate. Whatever happens next, the
        // accumulator restarts.
        self.index = 0;

        let mut checksum: u8 = 0;
        for b in self.buffer {
            checksum = checksum.wrapping_add(b);
        }

        if checksum != byte {
            #[cfg(feature = "logging")]
            warn!(
                "ME007YS checksum failed: expected 0x{:02X}, got 0x{:02X}",
                checksum, byte
            );
            // The mismatched byte is discarded, not re-examined as a
            // marker; the sensor re-emits frames every ~100ms so a
            // lost frame costs nothing.
            return None;
        }

        Some(((self.buffer[1] as u16) << 8) + self.buffer[2] as u16)
    }

    /// Drop any partially accumulated frame
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl Default for Me007ysParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a well-formed frame for a given distance (test/tooling helper)
pub fn encode_frame(distance_mm: u16) -> [u8; 4] {
    let high = (distance_mm >> 8) as u8;
    let low = (distance_mm & 0xFF) as u8;
    let checksum = MARKER.wrapping_add(high).wrapping_add(low);
    [MARKER, high, low, checksum]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut Me007ysParser, bytes: &[u8]) -> Option<u16> {
        let mut result = None;
        for &b in bytes {
            if let Some(d) = parser.feed_byte(b) {
                result = Some(d);
            }
        }
        result
    }

    #[test]
    fn test_valid_frame() {
        let mut parser = Me007ysParser::new();
        // 183 mm = 0x00B7, checksum = 0xFF + 0x00 + 0xB7 = 0xB6 (mod 256)
        assert_eq!(feed_all(&mut parser, &[0xFF, 0x00, 0xB7, 0xB6]), Some(183));
    }

    #[test]
    fn test_all_valid_checksums_decode() {
        // Exhaustive over the high byte, sampled low bytes
        for high in 0u16..=0xFF {
            for low in [0u16, 1, 0x7F, 0xFE, 0xFF] {
                let distance = (high << 8) + low;
                let mut parser = Me007ysParser::new();
                assert_eq!(
                    feed_all(&mut parser, &encode_frame(distance)),
                    Some(distance),
                    "frame for {} mm should decode",
                    distance
                );
            }
        }
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let mut parser = Me007ysParser::new();
        let mut frame = encode_frame(1234);
        frame[3] = frame[3].wrapping_add(1);
        assert_eq!(feed_all(&mut parser, &frame), None);
    }

    #[test]
    fn test_recovery_after_corrupt_frame() {
        let mut parser = Me007ysParser::new();
        let mut bad = encode_frame(1234);
        bad[2] ^= 0x10; // corrupt payload, checksum now wrong
        assert_eq!(feed_all(&mut parser, &bad), None);

        // A valid frame immediately afterward still decodes
        assert_eq!(feed_all(&mut parser, &encode_frame(404)), Some(404));
    }

    #[test]
    fn test_garbage_before_marker_ignored() {
        let mut parser = Me007ysParser::new();
        let mut bytes = vec![0x12, 0x00, 0xAB, 0x55];
        bytes.extend_from_slice(&encode_frame(2200));
        assert_eq!(feed_all(&mut parser, &bytes), Some(2200));
    }

    #[test]
    fn test_marker_inside_payload() {
        // High byte 0xFF is a legal payload value; the parser must not
        // treat it as a new frame start mid-accumulation.
        let distance = 0xFF0A; // far out of physical range but protocol-legal
        let mut parser = Me007ysParser::new();
        assert_eq!(
            feed_all(&mut parser, &encode_frame(distance)),
            Some(distance)
        );
    }

    #[test]
    fn test_mismatched_checksum_byte_not_reused_as_marker() {
        let mut parser = Me007ysParser::new();
        // Craft a frame whose (wrong) checksum byte is 0xFF. If the
        // parser re-examined it as a marker, the following valid frame
        // would be misaligned by one byte and fail.
        let frame = [0xFF, 0x01, 0x02, 0xFF]; // valid checksum would be 0x02
        assert_eq!(feed_all(&mut parser, &frame), None);
        assert_eq!(feed_all(&mut parser, &encode_frame(300)), Some(300));
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut parser = Me007ysParser::new();
        let mut bytes = Vec::new();
        for d in [100u16, 2000, 4499] {
            bytes.extend_from_slice(&encode_frame(d));
        }
        let mut seen = Vec::new();
        for b in bytes {
            if let Some(d) = parser.feed_byte(b) {
                seen.push(d);
            }
        }
        assert_eq!(seen, vec![100, 2000, 4499]);
    }

    #[test]
    fn test_reset_discards_partial_frame() {
        let mut parser = Me007ysParser::new();
        parser.feed_byte(0xFF);
        parser.feed_byte(0x01);
        parser.reset();
        // Fresh frame parses from scratch
        assert_eq!(feed_all(&mut parser, &encode_frame(555)), Some(555));
    }
}
