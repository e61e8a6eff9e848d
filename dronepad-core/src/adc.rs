//! ADC code arithmetic for the 10-bit ATmega32U4 converter.
//!
//! The converter runs off the USB 5 V rail while the joysticks swing 0-3.3 V,
//! so full-scale codes never appear on the axes.

/// Nominal ADC reference voltage in millivolts.
pub const ADC_REFERENCE_MV: u32 = 5000;

/// Number of distinct ADC codes (10-bit).
pub const ADC_RESOLUTION: u32 = 1024;

/// Joystick and ladder supply rail in millivolts.
pub const SUPPLY_MV: u32 = 3300;

/// Headroom above the supply rail, in percent. The USB-powered reference
/// drifts by about this much.
pub const TOLERANCE_PERCENT: u32 = 10;

/// Highest axis code reported to the host.
pub const ADC_MAX: u16 = adc_level(SUPPLY_MV * (100 + TOLERANCE_PERCENT) / 100);

/// Convert a voltage in millivolts to the ADC code, rounding half up.
///
/// Saturates at the largest code the converter can produce.
pub const fn adc_level(millivolts: u32) -> u16 {
    let code = ADC_RESOLUTION
        .saturating_mul(millivolts)
        .saturating_add(ADC_REFERENCE_MV / 2)
        / ADC_REFERENCE_MV;
    if code >= ADC_RESOLUTION {
        (ADC_RESOLUTION - 1) as u16
    } else {
        code as u16
    }
}

/// Clamp an axis code to `max`.
#[inline]
pub const fn clamp_axis(value: u16, max: u16) -> u16 {
    if value > max {
        max
    } else {
        value
    }
}

/// Store each new reading, keeping the previous sample where a conversion
/// produced nothing.
pub fn hold_last<const N: usize>(samples: &mut [u16; N], readings: [Option<u16>; N]) {
    for (sample, reading) in samples.iter_mut().zip(readings) {
        if let Some(code) = reading {
            *sample = code;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_max() {
        // 3.63 V at a 5 V reference
        assert_eq!(ADC_MAX, 743);
    }

    #[test]
    fn test_adc_level_rounds_half_up() {
        assert_eq!(adc_level(0), 0);
        assert_eq!(adc_level(150), 31);
        assert_eq!(adc_level(2500), 512);
        assert_eq!(adc_level(5000), 1023);
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(0, ADC_MAX), 0);
        assert_eq!(clamp_axis(743, ADC_MAX), 743);
        assert_eq!(clamp_axis(744, ADC_MAX), 743);
        assert_eq!(clamp_axis(u16::MAX, ADC_MAX), 743);
    }

    #[test]
    fn test_hold_last_keeps_previous_on_timeout() {
        let mut axes = [371, 371, 100, 600];
        hold_last(&mut axes, [Some(400), None, None, Some(0)]);
        assert_eq!(axes, [400, 371, 100, 0]);

        // A timed-out axis never jumps to full scale
        hold_last(&mut axes, [None; 4]);
        assert_eq!(axes, [400, 371, 100, 0]);
    }
}
