//! Non-volatile storage for the report sequence counter.

use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use log::{info, warn};

const NAMESPACE: &str = "tanklevel";
const KEY_SEQUENCE: &str = "seq";

/// NVS-backed single-byte slot for the sequence counter
///
/// Every access fails softly: the counter is advisory (the base
/// station uses it to spot gaps), so a platform without a usable NVS
/// partition degrades to random-seed sequencing instead of aborting
/// the cycle.
pub struct SequenceStore {
    nvs: Option<EspNvs<NvsDefault>>,
}

impl SequenceStore {
    pub fn new(partition: Option<EspNvsPartition<NvsDefault>>) -> Self {
        let nvs = partition.and_then(|p| match EspNvs::new(p, NAMESPACE, true) {
            Ok(nvs) => Some(nvs),
            Err(e) => {
                warn!("NVS namespace unavailable ({e}), sequence will not persist");
                None
            }
        });
        Self { nvs }
    }

    /// Read the stored counter, `None` if the slot is missing or
    /// unreadable
    pub fn load(&self) -> Option<u8> {
        self.nvs.as_ref()?.get_u8(KEY_SEQUENCE).ok().flatten()
    }

    /// Write the counter for the next wake cycle; failure is logged
    /// and swallowed
    pub fn store(&mut self, value: u8) {
        let Some(nvs) = self.nvs.as_mut() else {
            return;
        };
        match nvs.set_u8(KEY_SEQUENCE, value) {
            Ok(()) => info!("stored sequence {}", value),
            Err(e) => warn!("failed to store sequence ({e}), continuity lost"),
        }
    }
}
