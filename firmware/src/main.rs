//! Drone controller firmware for ATmega32U4 (Pro Micro).
//!
//! Turns two 2-axis analog joysticks and two resistor-ladder button strips
//! into a USB HID gamepad:
//! - ADC sampling of 4 axes and 2 ladder channels every tick
//! - Band decoding and per-channel debouncing of the ladders
//! - Axis clamping and report framing
//! - USB HID gamepad reports (4 x 16-bit axes, 10 buttons)

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod adc;
mod hid;

use avr_device::atmega32u4::Peripherals;

use dronepad_core::adc::hold_last;
use dronepad_core::config::{CHANNELS, MAX_AXIS, NUM_CHANNELS};
use dronepad_core::{frame, ButtonMask, ChannelDecodeState, NUM_AXES};

use hid::UsbGamepad;

/// Panic handler — on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Pro Micro fuses select the 16MHz crystal; make sure the prescaler is 1
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    // TX LED on PD5 (active low) for diagnostics
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x20) });

    adc::init(&dp.ADC);

    let mut usb = UsbGamepad::new();
    usb.init(&dp);

    let mut ladders: [ChannelDecodeState<'static>; NUM_CHANNELS] =
        core::array::from_fn(|i| ChannelDecodeState::new(&CHANNELS[i]));

    // LED on to indicate firmware is running
    dp.PORTD
        .portd
        .modify(|r, w| unsafe { w.bits(r.bits() & !0x20) });

    let mut axes = [adc::AXIS_REST; NUM_AXES];
    let mut samples = [adc::LADDER_IDLE; NUM_CHANNELS];

    loop {
        // Poll USB (handle enumeration, control requests)
        usb.poll(&dp);

        // A timed-out conversion keeps the previous sample
        hold_last(&mut axes, adc::read_all(&dp.ADC, &adc::AXIS_CHANNELS));
        hold_last(&mut samples, adc::read_all(&dp.ADC, &adc::LADDER_CHANNELS));

        // Each ladder reports at most one button; combine the channels
        let mut buttons: ButtonMask = 0;
        for (ladder, &sample) in ladders.iter_mut().zip(samples.iter()) {
            buttons |= ladder.decode(sample);
        }

        let report = frame(axes, buttons, MAX_AXIS);

        // Send report if changed
        usb.send_report(&dp, &report);

        // ~2ms tick, so the debounce window is ~20ms
        delay_ms(2);
    }
}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn delay_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
