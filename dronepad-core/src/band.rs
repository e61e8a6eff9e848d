//! Band decoding for resistor-ladder button channels.
//!
//! Every button on a ladder channel pulls the line down through a different
//! resistor, so each press lands the sample in its own voltage band. The
//! unpressed line sits at the supply rail, above every threshold.

use thiserror::Error;

use crate::{ButtonMask, NUM_BANDS, NUM_BUTTONS};

/// One band boundary and the button it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandEntry {
    /// Upper bound (inclusive) of the band, as an ADC code.
    pub threshold: u16,
    /// Output button bit, `0..NUM_BUTTONS`.
    pub mapping: u8,
}

/// Configuration errors caught when a band table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("threshold {index} is not above the threshold before it")]
    UnsortedThresholds { index: usize },

    #[error("band {index} maps to out-of-range button {mapping}")]
    MappingOutOfRange { index: usize, mapping: u8 },

    #[error("button {mapping} is mapped by more than one band")]
    DuplicateMapping { mapping: u8 },
}

/// Thresholds and button mappings for one ladder channel.
///
/// Thresholds are strictly ascending and mappings are unique and below
/// [`NUM_BUTTONS`] for any table built with [`BandTable::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandTable {
    entries: [BandEntry; NUM_BANDS],
}

impl BandTable {
    /// Build a validated table.
    pub const fn new(entries: [BandEntry; NUM_BANDS]) -> Result<Self, ConfigError> {
        let mut i = 0;
        while i < NUM_BANDS {
            let mapping = entries[i].mapping;
            if mapping as usize >= NUM_BUTTONS {
                return Err(ConfigError::MappingOutOfRange { index: i, mapping });
            }
            if i > 0 && entries[i].threshold <= entries[i - 1].threshold {
                return Err(ConfigError::UnsortedThresholds { index: i });
            }
            let mut j = 0;
            while j < i {
                if entries[j].mapping == mapping {
                    return Err(ConfigError::DuplicateMapping { mapping });
                }
                j += 1;
            }
            i += 1;
        }
        Ok(Self { entries })
    }

    /// Build a table from parallel threshold and mapping arrays.
    pub const fn from_parts(
        thresholds: [u16; NUM_BANDS],
        mappings: [u8; NUM_BANDS],
    ) -> Result<Self, ConfigError> {
        Self::new(Self::zip(thresholds, mappings))
    }

    /// Build a table without validation.
    ///
    /// Decoding stays total on such a table, but overlapping mappings or
    /// unsorted thresholds produce button states no ladder can generate.
    pub const fn new_unchecked(entries: [BandEntry; NUM_BANDS]) -> Self {
        Self { entries }
    }

    pub const fn entries(&self) -> &[BandEntry; NUM_BANDS] {
        &self.entries
    }

    /// Index of the band `sample` falls in: the first entry whose threshold
    /// is not below `sample`, or [`NUM_BANDS`] when every threshold is.
    pub const fn band_of(&self, sample: u16) -> usize {
        let mut band = 0;
        while band < NUM_BANDS && self.entries[band].threshold < sample {
            band += 1;
        }
        band
    }

    const fn zip(thresholds: [u16; NUM_BANDS], mappings: [u8; NUM_BANDS]) -> [BandEntry; NUM_BANDS] {
        let mut entries = [BandEntry { threshold: 0, mapping: 0 }; NUM_BANDS];
        let mut i = 0;
        while i < NUM_BANDS {
            entries[i] = BandEntry {
                threshold: thresholds[i],
                mapping: mappings[i],
            };
            i += 1;
        }
        entries
    }
}

/// Decode one sample into a raw button mask with at most one bit set.
///
/// A sample above the last threshold decodes to an empty mask; on a pull-up
/// ladder that is the idle level.
pub const fn decode_band(sample: u16, table: &BandTable) -> ButtonMask {
    let band = table.band_of(sample);
    if band >= NUM_BANDS {
        return 0;
    }
    match (1 as ButtonMask).checked_shl(table.entries[band].mapping as u32) {
        Some(bit) => bit,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: BandTable = match BandTable::from_parts([100, 200, 300, 400, 500], [0, 1, 2, 3, 4]) {
        Ok(table) => table,
        Err(_) => panic!("invalid test table"),
    };

    #[test]
    fn test_decode_examples() {
        assert_eq!(decode_band(150, &TABLE), 0b00010);
        assert_eq!(decode_band(600, &TABLE), 0);
    }

    #[test]
    fn test_band_boundaries() {
        // Thresholds are inclusive upper bounds.
        assert_eq!(TABLE.band_of(0), 0);
        assert_eq!(TABLE.band_of(100), 0);
        assert_eq!(TABLE.band_of(101), 1);
        assert_eq!(TABLE.band_of(500), 4);
        assert_eq!(TABLE.band_of(501), 5);
        assert_eq!(decode_band(500, &TABLE), 0b10000);
        assert_eq!(decode_band(501, &TABLE), 0);
        assert_eq!(decode_band(u16::MAX, &TABLE), 0);
    }

    #[test]
    fn test_remapping() {
        let table = BandTable::from_parts([100, 200, 300, 400, 500], [9, 7, 5, 8, 6]).unwrap();
        assert_eq!(decode_band(50, &table), 1 << 9);
        assert_eq!(decode_band(250, &table), 1 << 5);
        assert_eq!(decode_band(450, &table), 1 << 6);
    }

    #[test]
    fn test_unchecked_mapping_never_panics() {
        let table = BandTable::new_unchecked([BandEntry { threshold: 10, mapping: 200 }; NUM_BANDS]);
        assert_eq!(decode_band(0, &table), 0);
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        assert_eq!(
            BandTable::from_parts([100, 300, 200, 400, 500], [0, 1, 2, 3, 4]),
            Err(ConfigError::UnsortedThresholds { index: 2 })
        );
        assert_eq!(
            BandTable::from_parts([100, 100, 200, 400, 500], [0, 1, 2, 3, 4]),
            Err(ConfigError::UnsortedThresholds { index: 1 })
        );
    }

    #[test]
    fn test_rejects_bad_mappings() {
        assert_eq!(
            BandTable::from_parts([100, 200, 300, 400, 500], [0, 1, 10, 3, 4]),
            Err(ConfigError::MappingOutOfRange { index: 2, mapping: 10 })
        );
        assert_eq!(
            BandTable::from_parts([100, 200, 300, 400, 500], [0, 1, 2, 1, 4]),
            Err(ConfigError::DuplicateMapping { mapping: 1 })
        );
    }
}
