//! Default channel configuration shared by the firmware and the CLI.
//!
//! Both ladder channels use the same resistor values: a 10k pull-up to the
//! 3.3V rail and buttons pulling down through 0, 1k, 2.2k, 4.7k and 10k.
//! Channel A reports buttons 1-5, channel B buttons 6-10.

use crate::adc::{ADC_MAX, SUPPLY_MV};
use crate::band::BandTable;
use crate::ladder;
use crate::NUM_BANDS;

/// Number of ladder channels on the board.
pub const NUM_CHANNELS: usize = 2;

/// Ladder pull-up resistor in ohms.
pub const PULL_UP_OHMS: u32 = 10_000;

/// Ladder rung resistors in ohms, lowest voltage first.
pub const LADDER_RUNGS: [u32; NUM_BANDS] = [0, 1_000, 2_200, 4_700, 10_000];

/// Band thresholds derived from the ladder resistors.
pub const LADDER_THRESHOLDS: [u16; NUM_BANDS] =
    ladder::thresholds(SUPPLY_MV, PULL_UP_OHMS, LADDER_RUNGS);

pub const CHANNEL_A: BandTable = ladder_table([0, 1, 2, 3, 4]);
pub const CHANNEL_B: BandTable = ladder_table([5, 6, 7, 8, 9]);

/// Band tables in channel order.
pub static CHANNELS: [BandTable; NUM_CHANNELS] = [CHANNEL_A, CHANNEL_B];

/// Axis clamp ceiling. Matches the descriptor's logical maximum.
pub const MAX_AXIS: u16 = ADC_MAX;

const fn ladder_table(mappings: [u8; NUM_BANDS]) -> BandTable {
    match BandTable::from_parts(LADDER_THRESHOLDS, mappings) {
        Ok(table) => table,
        Err(_) => panic!("invalid default ladder table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_band;

    #[test]
    fn test_channels_cover_all_buttons() {
        let mut seen: u16 = 0;
        for table in &CHANNELS {
            for entry in table.entries() {
                seen |= 1u16 << entry.mapping;
            }
        }
        assert_eq!(seen, 0x03FF);
    }

    #[test]
    fn test_idle_rail_is_released() {
        let idle = crate::adc::adc_level(SUPPLY_MV);
        assert_eq!(decode_band(idle, &CHANNEL_A), 0);
        assert_eq!(decode_band(idle, &CHANNEL_B), 0);
    }

    #[test]
    fn test_rung_levels_hit_their_button() {
        for (i, &rung) in LADDER_RUNGS.iter().enumerate() {
            let mv = ladder::divider_mv(SUPPLY_MV, PULL_UP_OHMS, rung);
            let sample = crate::adc::adc_level(mv);
            assert_eq!(decode_band(sample, &CHANNEL_A), 1u16 << i);
            assert_eq!(decode_band(sample, &CHANNEL_B), 1u16 << (i + 5));
        }
    }
}
