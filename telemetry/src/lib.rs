//! Tanklevel Sensor Node Control Loop
//!
//! Domain logic for a battery-powered remote sensor node that wakes on
//! a timer, measures battery voltage, ambient temperature and a
//! point-to-target distance, reports over LoRa, and drops back into
//! deep sleep. Everything hardware-touching is behind the
//! [`cycle::NodePlatform`] trait so the whole cycle runs against fakes
//! on the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Lifecycle Controller (cycle)           │
//! ├─────────────────────────────────────────┤
//! │  Acquisition: sampling + sensors        │
//! ├─────────────────────────────────────────┤
//! │  Report formatting + batched send       │
//! ├─────────────────────────────────────────┤
//! │  Sequence arithmetic (survives sleep)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The firmware binary in `node/` implements [`cycle::NodePlatform`]
//! over esp-idf peripherals and executes the [`cycle::SleepPlan`] this
//! crate hands back (persist the counter, arm the alarm, deep sleep).
//!
//! ## Modules
//!
//! - [`report`] - Telemetry report type, wire payload, batched send
//! - [`sampling`] - Frame decode loop and outlier-trimmed averaging
//! - [`sequence`] - Wraparound sequence counter arithmetic
//! - [`cycle`] - The wake-to-sleep state machine

pub mod cycle;
pub mod report;
pub mod sampling;
pub mod sequence;

pub use cycle::{run_cycle, CycleConfig, CycleOutcome, NodePlatform, SleepPlan};
pub use report::{TelemetryReport, DISTANCE_UNAVAILABLE};
pub use sampling::{ByteSource, DistanceReader, SamplePolicy};
