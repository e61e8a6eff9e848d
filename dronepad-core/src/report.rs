//! Gamepad input report framing and wire format.
//!
//! The report carries four 16-bit axes followed by a 16-bit button field,
//! all little-endian, behind report ID 1:
//!
//! | Offset | Field    | HID usage |
//! |--------|----------|-----------|
//! | 0      | right X  | X         |
//! | 2      | right Y  | Y         |
//! | 4      | left Y   | Z         |
//! | 6      | left X   | Rz        |
//! | 8      | buttons  | Button 1-10, 6 bits padding |

use thiserror::Error;

use crate::adc::clamp_axis;
use crate::config::MAX_AXIS;
use crate::{ButtonMask, NUM_AXES, NUM_BUTTONS};

/// HID report ID of the gamepad input report.
pub const REPORT_ID: u8 = 0x01;

/// Report payload length, without the report ID.
pub const REPORT_LEN: usize = 2 * NUM_AXES + 2;

/// Length on the wire, report ID included.
pub const WIRE_LEN: usize = REPORT_LEN + 1;

/// Length of the HID report descriptor.
pub const DESCRIPTOR_LEN: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("invalid report length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unexpected report ID 0x{0:02X}")]
    UnexpectedReportId(u8),
}

/// One gamepad input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerReport {
    pub right_x: u16,
    pub right_y: u16,
    pub left_y: u16,
    pub left_x: u16,
    pub buttons: ButtonMask,
}

impl ControllerReport {
    pub const fn empty() -> Self {
        Self {
            right_x: 0,
            right_y: 0,
            left_y: 0,
            left_x: 0,
            buttons: 0,
        }
    }

    /// Axes in report order.
    pub const fn axes(&self) -> [u16; NUM_AXES] {
        [self.right_x, self.right_y, self.left_y, self.left_x]
    }

    /// Whether button `index` (0-based) is pressed.
    pub fn button(&self, index: usize) -> bool {
        index < NUM_BUTTONS && self.buttons & (1 << index) != 0
    }

    /// Indices of the pressed buttons.
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..NUM_BUTTONS).filter(move |&i| self.button(i))
    }

    /// Serialize the payload.
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut out = [0u8; REPORT_LEN];
        let fields = [
            self.right_x,
            self.right_y,
            self.left_y,
            self.left_x,
            self.buttons,
        ];
        for (chunk, field) in out.chunks_exact_mut(2).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    /// Serialize the payload behind the report ID.
    pub fn to_wire(&self) -> [u8; WIRE_LEN] {
        let mut out = [0u8; WIRE_LEN];
        out[0] = REPORT_ID;
        out[1..].copy_from_slice(&self.to_bytes());
        out
    }

    /// Parse a payload. Trailing bytes are an error.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReportError> {
        if data.len() != REPORT_LEN {
            return Err(ReportError::InvalidLength {
                expected: REPORT_LEN,
                actual: data.len(),
            });
        }
        let field = |i: usize| u16::from_le_bytes([data[2 * i], data[2 * i + 1]]);
        Ok(Self {
            right_x: field(0),
            right_y: field(1),
            left_y: field(2),
            left_x: field(3),
            buttons: field(4),
        })
    }

    /// Parse a report as read from the interrupt endpoint.
    pub fn from_wire(data: &[u8]) -> Result<Self, ReportError> {
        match data.split_first() {
            Some((&REPORT_ID, payload)) => Self::from_bytes(payload),
            Some((&id, _)) => Err(ReportError::UnexpectedReportId(id)),
            None => Err(ReportError::InvalidLength {
                expected: WIRE_LEN,
                actual: 0,
            }),
        }
    }
}

/// Clamp each axis to `max_axis` and pack axes and buttons into a report.
///
/// Axis order is `[right_x, right_y, left_y, left_x]`. The button field is
/// passed through untouched.
pub fn frame(axes: [u16; NUM_AXES], buttons: ButtonMask, max_axis: u16) -> ControllerReport {
    let [right_x, right_y, left_y, left_x] = axes.map(|v| clamp_axis(v, max_axis));
    ControllerReport {
        right_x,
        right_y,
        left_y,
        left_x,
        buttons,
    }
}

/// Build the gamepad HID report descriptor for a given axis logical maximum.
pub const fn report_descriptor(logical_max: u16) -> [u8; DESCRIPTOR_LEN] {
    let [max_lo, max_hi] = logical_max.to_le_bytes();
    [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x05, // Usage (Game Pad)
        0xA1, 0x01, // Collection (Application)
        0xA1, 0x00, //   Collection (Physical)
        0x85, REPORT_ID, // Report ID
        0x05, 0x01, //     Usage Page (Generic Desktop)
        0x09, 0x30, //     Usage (X)
        0x09, 0x31, //     Usage (Y)
        0x09, 0x32, //     Usage (Z)
        0x09, 0x35, //     Usage (Rz)
        0x16, 0x00, 0x00, // Logical Minimum (0)
        0x26, max_lo, max_hi, // Logical Maximum (max_axis)
        0x95, NUM_AXES as u8, // Report Count (4)
        0x75, 0x10, //     Report Size (16)
        0x81, 0x02, //     Input (Data, Variable, Absolute)
        0x05, 0x09, //     Usage Page (Button)
        0x19, 0x01, //     Usage Minimum (Button 1)
        0x29, NUM_BUTTONS as u8, // Usage Maximum (Button 10)
        0x15, 0x00, //     Logical Minimum (0)
        0x25, 0x01, //     Logical Maximum (1)
        0x75, NUM_BUTTONS as u8, // Report Size (10)
        0x95, 0x01, //     Report Count (1)
        0x81, 0x02, //     Input (Data, Variable, Absolute)
        0x95, 0x01, //     Report Count (1)
        0x75, (16 - NUM_BUTTONS) as u8, // Report Size (6)
        0x81, 0x03, //     Input (Constant)
        0xC0, //   End Collection
        0xC0, // End Collection
    ]
}

/// Descriptor for the default axis range.
pub static REPORT_DESCRIPTOR: [u8; DESCRIPTOR_LEN] = report_descriptor(MAX_AXIS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clamps_axes() {
        let report = frame([0, 743, 744, u16::MAX], 0b10_0000_0001, 743);
        assert_eq!(report.axes(), [0, 743, 743, 743]);
        assert_eq!(report.buttons, 0b10_0000_0001);
    }

    #[test]
    fn test_frame_is_idempotent() {
        let once = frame([100, 900, 743, 5000], 3, 743);
        let twice = frame(once.axes(), once.buttons, 743);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_byte_layout() {
        let report = ControllerReport {
            right_x: 0x0102,
            right_y: 0x0304,
            left_y: 0x0506,
            left_x: 0x0708,
            buttons: 0x0201,
        };
        assert_eq!(
            report.to_wire(),
            [0x01, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07, 0x01, 0x02]
        );
        assert_eq!(ControllerReport::from_wire(&report.to_wire()), Ok(report));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ControllerReport::from_bytes(&[0; 9]),
            Err(ReportError::InvalidLength { expected: 10, actual: 9 })
        );
        assert_eq!(
            ControllerReport::from_wire(&[0x02; WIRE_LEN]),
            Err(ReportError::UnexpectedReportId(0x02))
        );
        assert_eq!(
            ControllerReport::from_wire(&[]),
            Err(ReportError::InvalidLength { expected: 11, actual: 0 })
        );
    }

    #[test]
    fn test_pressed_buttons() {
        let report = ControllerReport {
            buttons: 0b10_0000_0101,
            ..ControllerReport::empty()
        };
        let mut pressed = [usize::MAX; 4];
        for (slot, index) in pressed.iter_mut().zip(report.pressed()) {
            *slot = index;
        }
        assert_eq!(pressed, [0, 2, 9, usize::MAX]);
        assert!(!report.button(10));
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(REPORT_DESCRIPTOR.len(), DESCRIPTOR_LEN);
        // Logical Maximum carries ADC_MAX (743 = 0x02E7).
        assert_eq!(&REPORT_DESCRIPTOR[23..26], &[0x26, 0xE7, 0x02]);
        assert_eq!(&REPORT_DESCRIPTOR[8..10], &[0x85, REPORT_ID]);
        assert_eq!(REPORT_DESCRIPTOR[DESCRIPTOR_LEN - 1], 0xC0);
    }
}
