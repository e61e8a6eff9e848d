//! Property-based tests for band decoding, debouncing and report framing.

use dronepad_core::{
    decode_band, frame, BandTable, ChannelDecodeState, ControllerReport, DEBOUNCE_TICKS, NUM_BANDS,
};
use proptest::prelude::*;

/// Strictly ascending thresholds with a shuffled set of unique mappings.
fn band_table() -> impl Strategy<Value = BandTable> {
    (
        proptest::collection::btree_set(0u16..u16::MAX, NUM_BANDS),
        Just((0u8..10).collect::<Vec<_>>()).prop_shuffle(),
    )
        .prop_map(|(thresholds, mappings)| {
            let mut t = [0u16; NUM_BANDS];
            for (slot, value) in t.iter_mut().zip(thresholds) {
                *slot = value;
            }
            let mut m = [0u8; NUM_BANDS];
            m.copy_from_slice(&mappings[..NUM_BANDS]);
            BandTable::from_parts(t, m).unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A single decode never sets more than one bit.
    #[test]
    fn prop_decode_is_one_hot_or_empty(table in band_table(), sample: u16) {
        prop_assert!(decode_band(sample, &table).count_ones() <= 1);
    }

    /// Samples at or below the first threshold decode to band 0's button.
    #[test]
    fn prop_low_samples_hit_band_zero(table in band_table(), frac in 0.0f64..=1.0) {
        let first = table.entries()[0];
        let sample = (f64::from(first.threshold) * frac) as u16;
        prop_assert_eq!(decode_band(sample, &table), 1u16 << first.mapping);
    }

    /// Samples above the last threshold decode to nothing.
    #[test]
    fn prop_high_samples_are_empty(table in band_table(), offset in 1u16..=u16::MAX) {
        let last = table.entries()[NUM_BANDS - 1].threshold;
        let sample = last.saturating_add(offset);
        prop_assume!(sample > last);
        prop_assert_eq!(decode_band(sample, &table), 0);
    }

    /// The band index never decreases as the sample rises.
    #[test]
    fn prop_band_is_monotonic(table in band_table(), a: u16, b: u16) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(table.band_of(lo) <= table.band_of(hi));
    }

    /// A steady raw mask commits exactly once, on the tenth tick, and then holds.
    #[test]
    fn prop_steady_input_commits_once(table in band_table(), raw in 1u16..0x0400, extra in 0usize..600) {
        let mut state = ChannelDecodeState::new(&table);
        let mut commits = 0;
        let mut previous = state.committed();
        for tick in 1..=(usize::from(DEBOUNCE_TICKS) + extra) {
            let committed = state.step(raw);
            if committed != previous {
                commits += 1;
                prop_assert_eq!(tick, usize::from(DEBOUNCE_TICKS));
            }
            previous = committed;
        }
        prop_assert_eq!(commits, 1);
        prop_assert_eq!(state.committed(), raw);
    }

    /// One differing tick before the window closes delays the commit by a full window.
    #[test]
    fn prop_single_glitch_restarts_window(
        table in band_table(),
        raw in 1u16..0x0400,
        glitch in 0u16..0x0400,
        at in 1usize..usize::from(DEBOUNCE_TICKS),
    ) {
        prop_assume!(glitch != raw);
        let mut state = ChannelDecodeState::new(&table);
        for _ in 0..at {
            state.step(raw);
        }
        state.step(glitch);
        for _ in 0..usize::from(DEBOUNCE_TICKS) - 1 {
            prop_assert_ne!(state.step(raw), raw);
        }
        prop_assert_eq!(state.step(raw), raw);
    }

    /// Long steady runs never wrap the counter into a second commit.
    #[test]
    fn prop_saturated_counter_never_recommits(table in band_table(), raw in 0u16..0x0400, ticks in 256usize..2000) {
        let mut state = ChannelDecodeState::new(&table);
        for _ in 0..ticks {
            prop_assert!(state.step(raw) == raw || state.stable_run_count() < DEBOUNCE_TICKS);
        }
        prop_assert_eq!(state.stable_run_count(), u8::MAX);
        prop_assert_eq!(state.committed(), raw);
    }

    /// Clamping is idempotent and never exceeds the ceiling.
    #[test]
    fn prop_frame_idempotent(axes: [u16; 4], buttons: u16, max_axis: u16) {
        let once = frame(axes, buttons, max_axis);
        prop_assert!(once.axes().iter().all(|&v| v <= max_axis));
        prop_assert_eq!(frame(once.axes(), once.buttons, max_axis), once);
    }

    /// Values at or below the ceiling pass through untouched.
    #[test]
    fn prop_frame_passes_in_range(axes: [u16; 4], buttons: u16) {
        let report = frame(axes, buttons, u16::MAX);
        prop_assert_eq!(report.axes(), axes);
        prop_assert_eq!(report.buttons, buttons);
    }

    /// Wire encoding is readable back by the host parser.
    #[test]
    fn prop_wire_decodes(axes: [u16; 4], buttons: u16) {
        let report = frame(axes, buttons, 743);
        prop_assert_eq!(ControllerReport::from_wire(&report.to_wire()), Ok(report));
    }
}
