//! Node configuration
//!
//! One struct per concern with sane deployment defaults, overridable
//! at build time via environment variables (`option_env!`). Pin
//! assignments stay in `main.rs` next to the peripheral bring-up.

use std::time::Duration;

use telemetry::{CycleConfig, SamplePolicy};

/// Radio parameters, applied once at startup and never varied per
/// message
#[derive(Debug, Clone, Copy)]
pub struct RadioConfig {
    /// Carrier frequency in MHz; must match the module and region
    pub frequency_mhz: i64,
    /// Transmit power in dBm (RFM95 PA_BOOST path, up to 23)
    pub tx_power_dbm: i32,
    /// This node's address, carried in the packet header
    pub node_address: u8,
    /// Base station address
    pub destination: u8,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_mhz: 915,
            tx_power_dbm: 23,
            node_address: 1,
            destination: 8,
        }
    }
}

/// Battery measurement scaling
#[derive(Debug, Clone, Copy)]
pub struct BatteryConfig {
    /// Multiplier from ADC millivolts to pack volts: a 2:1 resistor
    /// divider halves the pack voltage before the pin
    pub divider_scale: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self { divider_scale: 2.0 }
    }
}

/// Everything the firmware needs for one cycle
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub radio: RadioConfig,
    pub battery: BatteryConfig,
    pub cycle: CycleConfig,
    pub sampling: SamplePolicy,
    /// Deep sleep interval between wake cycles
    pub sleep_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            radio: RadioConfig::default(),
            battery: BatteryConfig::default(),
            cycle: CycleConfig::default(),
            sampling: SamplePolicy::standard(),
            sleep_interval: Duration::from_secs(600),
        }
    }
}

impl NodeConfig {
    /// Defaults with build-time overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse(option_env!("TANKLEVEL_SLEEP_SECS")) {
            config.sleep_interval = Duration::from_secs(secs);
        }
        if let Some(mhz) = parse(option_env!("TANKLEVEL_FREQ_MHZ")) {
            config.radio.frequency_mhz = mhz;
        }
        if let Some(node) = parse(option_env!("TANKLEVEL_NODE_ADDR")) {
            config.radio.node_address = node;
        }
        if option_env!("TANKLEVEL_FAST_SAMPLING").is_some() {
            config.sampling = SamplePolicy::fast();
        }

        config
    }
}

fn parse<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}
