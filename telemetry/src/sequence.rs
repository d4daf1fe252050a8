//! Wraparound sequence counter arithmetic
//!
//! The node embeds a `u8` sequence number in every report so the base
//! station can spot gaps and duplicates. The counter lives in
//! non-volatile storage across deep-sleep cycles; these helpers keep
//! the mod-256 math in one place.

/// Advance the counter by the number of packets sent this cycle
pub fn advance(sequence: u8, packets: u8) -> u8 {
    sequence.wrapping_add(packets)
}

/// Derive a first-boot seed from a raw random byte
///
/// Clamped to `0..=255-batch` so the very first batch cannot straddle
/// the wraparound point.
pub fn seed(random: u8, batch: u8) -> u8 {
    (random as u16 % (256 - batch as u16)) as u8
}

/// Pick the starting sequence for this cycle
///
/// A stored value is only trusted when the node was woken by its own
/// alarm; on a cold boot (first power-up, external reset) the slot
/// holds garbage from some earlier life and a fresh seed is used
/// instead. `stored` is `None` when the platform has no usable
/// non-volatile slot, which degrades to the same seed path.
pub fn initial(stored: Option<u8>, woke_by_alarm: bool, random: u8, batch: u8) -> u8 {
    match (woke_by_alarm, stored) {
        (true, Some(value)) => value,
        _ => seed(random, batch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_by_batch() {
        assert_eq!(advance(250, 3), 253);
        assert_eq!(advance(0, 1), 1);
    }

    #[test]
    fn test_advance_wraps_at_256() {
        assert_eq!(advance(254, 3), 1);
        assert_eq!(advance(255, 1), 0);
    }

    #[test]
    fn test_seed_stays_clear_of_wraparound() {
        for random in 0..=255u8 {
            let s = seed(random, 3);
            assert!(s <= 252, "seed {} would wrap within the first batch", s);
        }
    }

    #[test]
    fn test_initial_uses_stored_value_after_alarm_wake() {
        assert_eq!(initial(Some(42), true, 200, 3), 42);
    }

    #[test]
    fn test_initial_ignores_stored_value_on_cold_boot() {
        assert_eq!(initial(Some(42), false, 200, 3), seed(200, 3));
    }

    #[test]
    fn test_initial_falls_back_when_slot_unavailable() {
        assert_eq!(initial(None, true, 17, 1), seed(17, 1));
    }

    #[test]
    fn test_initial_idempotent_without_intervening_store() {
        // Two loads in a row (same stored slot, same wake source) must
        // agree; only a store may move the counter.
        assert_eq!(initial(Some(9), true, 1, 3), initial(Some(9), true, 1, 3));
    }
}
