//! Offline replay of ladder samples through the decode and debounce path.
//!
//! Trace format: one line per tick with one whitespace-separated ADC code
//! per ladder channel. `#` starts a comment; blank lines are skipped.

use anyhow::{bail, Context, Result};
use tracing::debug;

use dronepad_core::report::ControllerReport;
use dronepad_core::{decode_band, BandTable, ButtonMask, ChannelDecodeState, NUM_BUTTONS};

/// A change of the combined committed mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// 1-based tick at which the new mask was committed.
    pub tick: usize,
    pub buttons: ButtonMask,
}

pub fn parse_trace(input: &str, channels: usize) -> Result<Vec<Vec<u16>>> {
    let mut ticks = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((data, _)) => data,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let samples = line
            .split_whitespace()
            .map(|s| {
                s.parse::<u16>()
                    .with_context(|| format!("line {}: invalid sample {:?}", line_num + 1, s))
            })
            .collect::<Result<Vec<u16>>>()?;

        if samples.len() != channels {
            bail!(
                "line {}: expected {} samples, got {}",
                line_num + 1,
                channels,
                samples.len()
            );
        }
        ticks.push(samples);
    }

    Ok(ticks)
}

/// Feed every tick through one decoder per channel and collect the changes
/// of the combined committed mask.
pub fn run(tables: &[BandTable], ticks: &[Vec<u16>]) -> Vec<Transition> {
    let mut states: Vec<ChannelDecodeState<'_>> =
        tables.iter().map(ChannelDecodeState::new).collect();
    let mut committed: ButtonMask = 0;
    let mut transitions = Vec::new();

    for (i, samples) in ticks.iter().enumerate() {
        let tick = i + 1;
        let mut raw: ButtonMask = 0;
        let mut buttons: ButtonMask = 0;
        for (state, &sample) in states.iter_mut().zip(samples) {
            // Split decode from step so the raw mask can be logged
            let channel_raw = decode_band(sample, state.config());
            raw |= channel_raw;
            buttons |= state.step(channel_raw);
        }
        debug!(tick, raw, buttons, "tick");

        if buttons != committed {
            committed = buttons;
            transitions.push(Transition { tick, buttons });
        }
    }

    transitions
}

/// Bitmask plus the 1-based list of pressed buttons.
pub fn describe(buttons: ButtonMask) -> String {
    let report = ControllerReport {
        buttons,
        ..ControllerReport::empty()
    };
    let pressed: Vec<String> = report.pressed().map(|i| (i + 1).to_string()).collect();
    let list = if pressed.is_empty() {
        "none".to_string()
    } else {
        pressed.join(" ")
    };
    format!("{:0width$b} ({})", buttons, list, width = NUM_BUTTONS)
}
