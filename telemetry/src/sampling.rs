//! Distance acquisition: frame decode loop and outlier-trimmed averaging
//!
//! The ME007YS free-runs on its UART, so "reading" it means decoding
//! frames out of whatever the line yields within a time budget, then
//! condensing a batch of readings into one number. Early samples land
//! while the sensor is still settling after power-up and single frames
//! can be wild (multipath, surface ripple), so the reduction sorts the
//! batch and trims before averaging.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use me007ys::Me007ysParser;

/// One byte per poll from the sensor's serial line
///
/// `read_byte` may block briefly (a UART driver's own receive timeout)
/// but must return `None` rather than wait indefinitely when the line
/// is idle.
pub trait ByteSource {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Decode a single valid frame from the source
///
/// Polls bytes through the parser until a frame's checksum verifies or
/// `timeout` elapses, measured from the call's start rather than from
/// the last byte seen. Corrupt frames are consumed silently; the
/// parser resynchronizes and keeps hunting.
pub fn decode_frame<S: ByteSource>(
    source: &mut S,
    parser: &mut Me007ysParser,
    timeout: Duration,
) -> Option<u16> {
    let start = Instant::now();

    loop {
        if start.elapsed() > timeout {
            return None;
        }

        let byte = match source.read_byte() {
            Some(b) => b,
            None => continue,
        };

        if let Some(distance) = parser.feed_byte(byte) {
            return Some(distance);
        }
    }
}

/// Sampling policy for one distance reading
///
/// Two deployments exist in the field and differ only in these
/// constants, so the whole policy is data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePolicy {
    /// Total frames to collect before reducing
    pub samples: usize,
    /// Lowest-sorted samples to drop (covers the warm-up readings)
    pub discard_low: usize,
    /// Highest-sorted samples to drop (outliers)
    pub discard_high: usize,
    /// Budget for each individual frame decode
    pub attempt_timeout: Duration,
    /// Pause before retrying after a decode timeout
    pub retry_delay: Duration,
    /// Budget for the whole reading
    pub overall_timeout: Duration,
}

impl SamplePolicy {
    /// Standard deployment: 7 warm-up + 15 measured samples, drop the
    /// warm-ups and the single largest, 10s budget.
    pub fn standard() -> Self {
        Self {
            samples: 22,
            discard_low: 7,
            discard_high: 1,
            attempt_timeout: Duration::from_secs(1),
            retry_delay: Duration::from_millis(50),
            overall_timeout: Duration::from_secs(10),
        }
    }

    /// Fast deployment: 7 samples, drop min and max, 3s budget.
    pub fn fast() -> Self {
        Self {
            samples: 7,
            discard_low: 1,
            discard_high: 1,
            attempt_timeout: Duration::from_secs(1),
            retry_delay: Duration::from_millis(50),
            overall_timeout: Duration::from_secs(3),
        }
    }

    /// Samples surviving the trim
    pub fn kept(&self) -> usize {
        self.samples.saturating_sub(self.discard_low + self.discard_high)
    }

    /// Sort, trim, and average a full batch. Floor division, matching
    /// the integer millimeter resolution of the sensor.
    pub fn reduce(&self, mut values: Vec<u16>) -> Option<u16> {
        if values.len() < self.samples || self.kept() == 0 {
            return None;
        }

        values.sort_unstable();
        let kept = &values[self.discard_low..values.len() - self.discard_high];
        let sum: u32 = kept.iter().map(|&v| v as u32).sum();
        Some((sum / kept.len() as u32) as u16)
    }
}

/// Collects and reduces one distance reading per wake cycle
pub struct DistanceReader {
    parser: Me007ysParser,
    policy: SamplePolicy,
}

impl DistanceReader {
    pub fn new(policy: SamplePolicy) -> Self {
        Self {
            parser: Me007ysParser::new(),
            policy,
        }
    }

    /// Read one filtered distance in millimeters
    ///
    /// Returns `None` if the sample target is not reached before the
    /// overall budget expires. That is a legitimate sensor state (the
    /// target may simply be out of range), not an error.
    pub fn read<S: ByteSource>(&mut self, source: &mut S) -> Option<u16> {
        let start = Instant::now();
        let mut values = Vec::with_capacity(self.policy.samples);

        while values.len() < self.policy.samples {
            if start.elapsed() > self.policy.overall_timeout {
                debug!(
                    "distance sampling timed out with {}/{} samples",
                    values.len(),
                    self.policy.samples
                );
                return None;
            }

            match decode_frame(source, &mut self.parser, self.policy.attempt_timeout) {
                Some(value) => values.push(value),
                None => thread::sleep(self.policy.retry_delay),
            }
        }

        self.policy.reduce(values)
    }
}
