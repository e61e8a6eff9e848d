//! Per-channel debounce logic.
//!
//! A raw mask has to be seen on DEBOUNCE_TICKS consecutive ticks before it
//! becomes the committed state. This absorbs contact bounce and ADC noise
//! around band thresholds.

use crate::band::{decode_band, BandTable};
use crate::ButtonMask;

/// Number of identical consecutive raw readings required to commit.
/// At the firmware's ~2ms tick this is ~20ms.
pub const DEBOUNCE_TICKS: u8 = 10;

/// Decode and debounce state for one ladder channel.
#[derive(Debug, Clone)]
pub struct ChannelDecodeState<'a> {
    config: &'a BandTable,
    /// Consecutive ticks `last_raw_mask` has been seen. Saturates at 255.
    stable_run_count: u8,
    last_raw_mask: ButtonMask,
    committed_mask: ButtonMask,
}

impl<'a> ChannelDecodeState<'a> {
    pub const fn new(config: &'a BandTable) -> Self {
        Self {
            config,
            stable_run_count: 0,
            last_raw_mask: 0,
            committed_mask: 0,
        }
    }

    pub const fn config(&self) -> &'a BandTable {
        self.config
    }

    /// The debounced mask. Valid between ticks.
    pub const fn committed(&self) -> ButtonMask {
        self.committed_mask
    }

    pub const fn stable_run_count(&self) -> u8 {
        self.stable_run_count
    }

    /// Feed one raw mask and return the committed mask.
    pub fn step(&mut self, raw_mask: ButtonMask) -> ButtonMask {
        if raw_mask != self.last_raw_mask {
            self.last_raw_mask = raw_mask;
            self.stable_run_count = 1;
        } else if self.stable_run_count != u8::MAX {
            self.stable_run_count = self.stable_run_count.saturating_add(1);
            if self.stable_run_count == DEBOUNCE_TICKS {
                self.committed_mask = self.last_raw_mask;
            }
        }

        self.committed_mask
    }

    /// Decode one sample with the channel's band table and debounce it.
    pub fn decode(&mut self, sample: u16) -> ButtonMask {
        let raw_mask = decode_band(sample, self.config);
        self.step(raw_mask)
    }
}

/// Free-function form of [`ChannelDecodeState::step`].
pub fn step(raw_mask: ButtonMask, state: &mut ChannelDecodeState<'_>) -> ButtonMask {
    state.step(raw_mask)
}
