//! Deep sleep and wake-cause primitives
//!
//! Entering deep sleep ends this process; RAM is gone on the next
//! wake. Only the NVS sequence slot and the RTC timer alarm cross the
//! gap.

use std::time::Duration;

use esp_idf_svc::sys;

/// Whether this wake came from our own scheduled timer alarm (as
/// opposed to first power-up or an external reset)
pub fn woke_by_alarm() -> bool {
    unsafe { sys::esp_sleep_get_wakeup_cause() == sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER }
}

/// Hardware RNG byte, used to seed the sequence counter when no
/// stored value can be trusted
pub fn random_byte() -> u8 {
    (unsafe { sys::esp_random() } & 0xFF) as u8
}

/// Arm the timer alarm and power down. Does not return.
pub fn deep_sleep(interval: Duration) -> ! {
    unsafe { sys::esp_deep_sleep(interval.as_micros() as u64) }
}
