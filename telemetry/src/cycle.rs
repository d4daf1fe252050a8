//! The wake-to-sleep lifecycle
//!
//! One process invocation is one cycle; there is no outer loop. The
//! node wakes, powers its sensor rail, takes its readings, transmits,
//! and hands back a [`SleepPlan`] telling the firmware how far to bump
//! the persisted sequence counter before arming the next alarm and
//! dropping into deep sleep. Memory does not survive that transition,
//! so everything that matters afterward is in the plan.
//!
//! States run strictly forward, never branching back:
//!
//! ```text
//! BOOT → SENSORS_POWERED → ENV_READ → RANGED? → TRANSMITTING → DONE → SLEEP
//! ```
//!
//! Two indicator LEDs are set at each state entry so a technician with
//! no serial console can read the last-reached state off the board
//! after the fact:
//!
//! | state                         | left | right |
//! |-------------------------------|------|-------|
//! | sensors powered               | off  | off   |
//! | battery + temperature read    | on   | off   |
//! | distance read                 | off  | on    |
//! | report sent                   | on   | on    |
//!
//! Transmission reuses the pattern of the last acquisition state, so a
//! node found asleep after an out-of-range night still shows how far
//! it got. SLEEP clears both LEDs.

use std::time::Duration;

use log::{info, warn};

use crate::report::{self, Radio, TelemetryReport, DISTANCE_UNAVAILABLE};

/// Hardware surface of one node, implemented over esp-idf peripherals
/// in the firmware and over fakes in tests.
///
/// The platform is also the radio ([`Radio`] supertrait): addressing
/// and TX power were fixed at startup, so the cycle only ever hands it
/// finished payloads.
pub trait NodePlatform: Radio {
    /// Switch the relay powering the sensor rail
    fn set_sensor_rail(&mut self, on: bool);
    /// Drive the two status indicator outputs
    fn set_indicators(&mut self, left: bool, right: bool);
    /// Single scaled analog read, accepted as-is with no validity check
    fn read_battery_volts(&mut self) -> f32;
    /// One-wire temperature in Celsius, `None` on a bus/sensor fault
    fn read_temperature_c(&mut self) -> Option<f32>;
    /// Filtered distance in millimeters, `None` when the sample target
    /// was not reached (typically: target beyond the sensor's range)
    fn read_distance_mm(&mut self) -> Option<u16>;
    /// Block the sole thread of control
    fn delay(&mut self, duration: Duration);
}

/// Observable lifecycle checkpoints, one indicator pattern each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    SensorsPowered,
    EnvSampled,
    Ranged,
    ReportSent,
}

impl CycleState {
    /// (left, right) indicator pattern shown at state entry
    pub fn indicators(&self) -> (bool, bool) {
        match self {
            CycleState::SensorsPowered => (false, false),
            CycleState::EnvSampled => (true, false),
            CycleState::Ranged => (false, true),
            CycleState::ReportSent => (true, true),
        }
    }
}

/// Timing and batching constants for one deployment
#[derive(Debug, Clone, Copy)]
pub struct CycleConfig {
    /// Quiesce time after boot before touching peripherals
    pub boot_settle: Duration,
    /// Settling time for sensors after the rail comes up
    pub rail_settle: Duration,
    /// Dwell on each acquisition indicator pattern
    pub state_hold: Duration,
    /// Dwell on the final all-on pattern before sleep
    pub done_hold: Duration,
    /// Packets per report batch, each offset by its index
    pub packets_per_cycle: u8,
    /// Pause between packets, respecting radio duty-cycle limits
    pub inter_packet_delay: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            boot_settle: Duration::from_secs(3),
            rail_settle: Duration::from_secs(5),
            state_hold: Duration::from_secs(1),
            done_hold: Duration::from_secs(3),
            packets_per_cycle: 3,
            inter_packet_delay: Duration::from_millis(500),
        }
    }
}

/// What a finished cycle looked like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle transmitted; `failed_packets` of the batch were
    /// refused locally or by the radio driver
    Completed { failed_packets: u8 },
    /// Temperature read failed; acquisition aborted, nothing sent
    TemperatureUnavailable,
}

/// Instructions for the terminal SLEEP transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepPlan {
    /// How far to advance the persisted sequence counter
    pub bump_by: u8,
    pub outcome: CycleOutcome,
}

impl SleepPlan {
    /// Whether anything went wrong this cycle (for logging; the node
    /// sleeps either way)
    pub fn cycle_failed(&self) -> bool {
        !matches!(self.outcome, CycleOutcome::Completed { failed_packets: 0 })
    }
}

fn enter(platform: &mut impl NodePlatform, state: CycleState) {
    let (left, right) = state.indicators();
    platform.set_indicators(left, right);
}

/// Run one full measurement-and-transmission cycle
///
/// Never returns an error: every fault in the spec's taxonomy is
/// absorbed into the returned plan, and the caller's only move is the
/// SLEEP transition.
pub fn run_cycle<P: NodePlatform>(
    platform: &mut P,
    sequence: u8,
    config: &CycleConfig,
) -> SleepPlan {
    // Let the microcontroller quiesce, then bring up the rail that
    // powers every attached sensor. Nothing answers before this.
    platform.delay(config.boot_settle);
    platform.set_sensor_rail(true);
    platform.delay(config.rail_settle);

    enter(platform, CycleState::SensorsPowered);

    let battery_volts = platform.read_battery_volts();

    let temperature_f = match platform.read_temperature_c() {
        Some(celsius) => celsius * 9.0 / 5.0 + 32.0,
        None => {
            // A dead temperature read means a likely bus fault worth
            // surfacing every cycle: skip straight to sleep without
            // transmitting or bumping the counter.
            warn!("failed to read temperature, skipping this cycle");
            platform.set_sensor_rail(false);
            return SleepPlan {
                bump_by: 0,
                outcome: CycleOutcome::TemperatureUnavailable,
            };
        }
    };

    enter(platform, CycleState::EnvSampled);
    platform.delay(config.state_hold);

    let distance_mm = match platform.read_distance_mm() {
        Some(mm) => {
            enter(platform, CycleState::Ranged);
            platform.delay(config.state_hold);
            mm as i32
        }
        None => {
            // Expected whenever the target sits past the sensor's ~4m
            // ceiling; the report still carries battery and temperature.
            info!("failed to read distance, target farther than 4 meters?");
            DISTANCE_UNAVAILABLE
        }
    };

    // The radio does not hang off the sensor rail; drop it now to
    // save power through the transmit phase.
    platform.set_sensor_rail(false);

    let report = TelemetryReport {
        sequence,
        battery_volts,
        temperature_f,
        distance_mm,
    };

    let mut failed_packets: u8 = 0;
    for offset in 0..config.packets_per_cycle {
        if offset > 0 {
            platform.delay(config.inter_packet_delay);
        }
        if !report::send_report(platform, &report.with_sequence_offset(offset)) {
            failed_packets += 1;
        }
    }

    if failed_packets > 0 {
        // Delivery is never confirmed, so "attempted" counts as "sent"
        // for sequence purposes; the receiver sees a gap either way.
        warn!(
            "{} of {} packets failed to send; sequence still advances by the full batch",
            failed_packets, config.packets_per_cycle
        );
    } else {
        enter(platform, CycleState::ReportSent);
        platform.delay(config.done_hold);
    }

    SleepPlan {
        bump_by: config.packets_per_cycle,
        outcome: CycleOutcome::Completed { failed_packets },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Rail(bool),
        Indicators(bool, bool),
        Battery,
        Temperature,
        Distance,
        Sent(String),
    }

    struct FakePlatform {
        events: Vec<Event>,
        battery_volts: f32,
        temperature_c: Option<f32>,
        distance_mm: Option<u16>,
        radio_accepts: bool,
    }

    impl FakePlatform {
        fn new() -> Self {
            Self {
                events: Vec::new(),
                battery_volts: 3.6,
                temperature_c: Some(15.5), // 59.9 F
                distance_mm: Some(183),
                radio_accepts: true,
            }
        }

        fn sent_payloads(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Sent(p) => Some(p.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Radio for FakePlatform {
        fn send(&mut self, payload: &[u8]) -> bool {
            self.events
                .push(Event::Sent(String::from_utf8(payload.to_vec()).unwrap()));
            self.radio_accepts
        }
    }

    impl NodePlatform for FakePlatform {
        fn set_sensor_rail(&mut self, on: bool) {
            self.events.push(Event::Rail(on));
        }
        fn set_indicators(&mut self, left: bool, right: bool) {
            self.events.push(Event::Indicators(left, right));
        }
        fn read_battery_volts(&mut self) -> f32 {
            self.events.push(Event::Battery);
            self.battery_volts
        }
        fn read_temperature_c(&mut self) -> Option<f32> {
            self.events.push(Event::Temperature);
            self.temperature_c
        }
        fn read_distance_mm(&mut self) -> Option<u16> {
            self.events.push(Event::Distance);
            self.distance_mm
        }
        fn delay(&mut self, _duration: Duration) {}
    }

    fn quick_config() -> CycleConfig {
        CycleConfig {
            boot_settle: Duration::ZERO,
            rail_settle: Duration::ZERO,
            state_hold: Duration::ZERO,
            done_hold: Duration::ZERO,
            inter_packet_delay: Duration::ZERO,
            ..CycleConfig::default()
        }
    }

    #[test]
    fn test_full_cycle_payload_and_batch_offsets() {
        let mut platform = FakePlatform::new();
        let plan = run_cycle(&mut platform, 227, &quick_config());

        assert_eq!(plan.bump_by, 3);
        assert!(!plan.cycle_failed());
        assert_eq!(
            platform.sent_payloads(),
            vec![
                "id:227, batt:3.6 v, temp:59.9 F, dist:183 mm",
                "id:228, batt:3.6 v, temp:59.9 F, dist:183 mm",
                "id:229, batt:3.6 v, temp:59.9 F, dist:183 mm",
            ]
        );
    }

    #[test]
    fn test_temperature_failure_skips_distance_and_radio() {
        let mut platform = FakePlatform::new();
        platform.temperature_c = None;
        let plan = run_cycle(&mut platform, 10, &quick_config());

        assert_eq!(plan.outcome, CycleOutcome::TemperatureUnavailable);
        assert_eq!(plan.bump_by, 0, "nothing sent, counter must not move");
        assert!(!platform.events.contains(&Event::Distance));
        assert!(platform.sent_payloads().is_empty(), "no radio send may occur");
        // The rail still gets dropped on the way out
        assert_eq!(platform.events.last(), Some(&Event::Rail(false)));
    }

    #[test]
    fn test_distance_failure_substitutes_sentinel_and_still_transmits() {
        let mut platform = FakePlatform::new();
        platform.distance_mm = None;
        let plan = run_cycle(&mut platform, 0, &quick_config());

        assert!(!plan.cycle_failed());
        assert_eq!(
            platform.sent_payloads()[0],
            "id:0, batt:3.6 v, temp:59.9 F, dist:-1 mm"
        );
        // The distance indicator state is never entered
        assert!(!platform.events.contains(&Event::Indicators(false, true)));
    }

    #[test]
    fn test_send_failure_still_bumps_full_batch() {
        let mut platform = FakePlatform::new();
        platform.radio_accepts = false;
        let plan = run_cycle(&mut platform, 100, &quick_config());

        assert_eq!(
            plan.outcome,
            CycleOutcome::Completed { failed_packets: 3 }
        );
        assert!(plan.cycle_failed());
        assert_eq!(plan.bump_by, 3, "attempted counts as sent");
        // Final all-on pattern is reserved for a clean send
        assert!(!platform.events.contains(&Event::Indicators(true, true)));
    }

    #[test]
    fn test_rail_dropped_before_transmitting() {
        let mut platform = FakePlatform::new();
        run_cycle(&mut platform, 0, &quick_config());

        let rail_off = platform
            .events
            .iter()
            .position(|e| *e == Event::Rail(false))
            .expect("rail must be powered down");
        let first_send = platform
            .events
            .iter()
            .position(|e| matches!(e, Event::Sent(_)))
            .expect("cycle must transmit");
        assert!(rail_off < first_send, "radio runs with the sensor rail off");
    }

    #[test]
    fn test_indicator_progression_on_clean_cycle() {
        let mut platform = FakePlatform::new();
        run_cycle(&mut platform, 0, &quick_config());

        let patterns: Vec<(bool, bool)> = platform
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Indicators(l, r) => Some((*l, *r)),
                _ => None,
            })
            .collect();
        assert_eq!(
            patterns,
            vec![(false, false), (true, false), (false, true), (true, true)]
        );
    }

    #[test]
    fn test_battery_read_passes_through_unfiltered() {
        // The analog channel deliberately has no outlier rejection,
        // unlike distance: a single bad read goes out as-is.
        let mut platform = FakePlatform::new();
        platform.battery_volts = 0.0;
        run_cycle(&mut platform, 1, &quick_config());
        assert!(platform.sent_payloads()[0].contains("batt:0.0 v"));
    }
}
