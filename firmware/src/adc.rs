//! Analog sampling for the joystick axes and button ladders.
//!
//! The converter uses AVcc (USB 5V) as reference and a /128 prescaler, which
//! gives a 125kHz ADC clock at 16MHz and ~100us per conversion. All eight
//! inputs are sampled every tick.
//!
//! Pro Micro pin mapping:
//!   Axes:    A0 (PF7, ADC7), A1 (PF6, ADC6), A2 (PF5, ADC5), A3 (PF4, ADC4)
//!   Ladders: A6 (PD4, ADC8), A7 (PD6, ADC9)

use avr_device::atmega32u4::ADC;

use dronepad_core::adc::ADC_MAX;
use dronepad_core::config::NUM_CHANNELS;
use dronepad_core::NUM_AXES;

/// ADC inputs of the joystick axes, in report order
/// (right X, right Y, left Y, left X).
pub const AXIS_CHANNELS: [u8; NUM_AXES] = [7, 6, 5, 4];

/// ADC inputs of the button ladders, in band table order.
pub const LADDER_CHANNELS: [u8; NUM_CHANNELS] = [8, 9];

/// Axis value used until the first conversion succeeds (stick centred).
pub const AXIS_REST: u16 = ADC_MAX / 2;

/// Ladder value used until the first conversion succeeds (no button).
pub const LADDER_IDLE: u16 = 0x3FF;

// ADMUX
const REFS_AVCC: u8 = 0x40;
// ADCSRA
const ADEN: u8 = 0x80;
const ADSC: u8 = 0x40;
const ADPS_128: u8 = 0x07;
// ADCSRB
const MUX5: u8 = 0x20;

/// Enable the ADC and disable the digital input buffers on the analog pins.
pub fn init(adc: &ADC) {
    // ADC4-ADC7
    adc.didr0.write(|w| unsafe { w.bits(0xF0) });
    // ADC8-ADC9
    adc.didr2.write(|w| unsafe { w.bits(0x03) });

    adc.adcsra.write(|w| unsafe { w.bits(ADEN | ADPS_128) });

    // The first conversion after enabling takes 25 ADC cycles and is discarded.
    let _ = read(adc, AXIS_CHANNELS[0]);
}

/// Run one single-ended conversion on `channel` (0-13) and return the
/// 10-bit code, or `None` if the conversion timed out.
pub fn read(adc: &ADC, channel: u8) -> Option<u16> {
    let mux5 = if channel >= 8 { MUX5 } else { 0 };
    adc.adcsrb.write(|w| unsafe { w.bits(mux5) });
    adc.admux.write(|w| unsafe { w.bits(REFS_AVCC | (channel & 0x07)) });

    adc.adcsra.modify(|r, w| unsafe { w.bits(r.bits() | ADSC) });

    // ADSC clears when the conversion completes
    let mut timeout: u16 = 0xFFFF;
    while adc.adcsra.read().bits() & ADSC != 0 {
        timeout = timeout.wrapping_sub(1);
        if timeout == 0 {
            return None;
        }
    }

    Some(adc.adc.read().bits())
}

/// Sample a group of channels in order.
pub fn read_all<const N: usize>(adc: &ADC, channels: &[u8; N]) -> [Option<u16>; N] {
    (*channels).map(|channel| read(adc, channel))
}
