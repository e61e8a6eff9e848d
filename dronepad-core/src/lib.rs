//! Shared input decoding and report framing for the drone controller.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool.
//!
//! Each tick the firmware samples every analog channel once. Button ladder
//! channels go through [`band::decode_band`] and a per-channel
//! [`debounce::ChannelDecodeState`]; the committed masks are ORed together
//! and framed with the axis samples by [`report::frame`].

#![no_std]

pub mod adc;
pub mod band;
pub mod config;
pub mod debounce;
pub mod ladder;
pub mod report;

pub use band::{decode_band, BandEntry, BandTable, ConfigError};
pub use debounce::{ChannelDecodeState, DEBOUNCE_TICKS};
pub use report::{frame, ControllerReport, ReportError};

/// Debounced or raw button bitmask. Bit `n` is HID button `n + 1`.
pub type ButtonMask = u16;

/// Number of logical buttons the report carries.
pub const NUM_BUTTONS: usize = 10;

/// Number of bands on one ladder channel.
pub const NUM_BANDS: usize = 5;

/// Number of analog axes in a report.
pub const NUM_AXES: usize = 4;

/// Shared V-USB vendor ID (Van Ooijen Technische Informatica).
pub const VENDOR_ID: u16 = 0x16C0;
/// Shared V-USB product ID for HID joysticks.
pub const PRODUCT_ID: u16 = 0x27DC;
