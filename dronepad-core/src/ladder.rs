//! Threshold arithmetic for resistor-ladder button channels.
//!
//! The channel is pulled up to the supply through `r_pull_up`; each button
//! pulls it down through its own rung resistor. Pressing a button therefore
//! produces the divider voltage of that rung, and the band threshold between
//! two neighbouring rungs is the midpoint of their voltages.

use crate::adc::adc_level;
use crate::NUM_BANDS;

/// Output of a two-resistor divider, in millivolts.
pub const fn divider_mv(supply_mv: u32, r_top: u32, r_bottom: u32) -> u32 {
    let total = r_top.saturating_add(r_bottom);
    if total == 0 {
        return 0;
    }
    ((supply_mv as u64 * r_bottom as u64) / total as u64) as u32
}

/// Voltage halfway between `low` and `high`.
pub const fn midpoint_mv(high: u32, low: u32) -> u32 {
    low + high.saturating_sub(low) / 2
}

/// Band thresholds for a ladder whose rung resistors are `rungs`, lowest
/// first.
///
/// The last threshold sits halfway between the highest rung and the idle
/// (unpressed) level, which is the full supply voltage.
pub const fn thresholds(supply_mv: u32, r_pull_up: u32, rungs: [u32; NUM_BANDS]) -> [u16; NUM_BANDS] {
    let mut levels = [0u32; NUM_BANDS + 1];
    let mut i = 0;
    while i < NUM_BANDS {
        levels[i] = divider_mv(supply_mv, r_pull_up, rungs[i]);
        i += 1;
    }
    levels[NUM_BANDS] = supply_mv;

    let mut out = [0u16; NUM_BANDS];
    let mut i = 0;
    while i < NUM_BANDS {
        let (low, high) = if levels[i] <= levels[i + 1] {
            (levels[i], levels[i + 1])
        } else {
            (levels[i + 1], levels[i])
        };
        out[i] = adc_level(midpoint_mv(high, low));
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider() {
        assert_eq!(divider_mv(3300, 10_000, 0), 0);
        assert_eq!(divider_mv(3300, 10_000, 10_000), 1650);
        assert_eq!(divider_mv(3300, 10_000, 2_200), 595);
        assert_eq!(divider_mv(3300, 0, 0), 0);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint_mv(300, 0), 150);
        assert_eq!(midpoint_mv(3300, 1650), 2475);
    }

    #[test]
    fn test_default_ladder() {
        let t = thresholds(3300, 10_000, [0, 1_000, 2_200, 4_700, 10_000]);
        assert_eq!(t, [31, 92, 169, 277, 507]);
    }
}
