//! USB HID gamepad implementation for ATmega32U4.
//!
//! Exposes a single gamepad interface with one interrupt IN endpoint using the
//! ATmega32U4's built-in USB controller. Uses direct register access via
//! avr-device. The report layout and descriptor come from `dronepad-core`.

use avr_device::atmega32u4::Peripherals;

use dronepad_core::report::{DESCRIPTOR_LEN, REPORT_DESCRIPTOR, WIRE_LEN};
use dronepad_core::{ControllerReport, PRODUCT_ID, VENDOR_ID};

// ============================================================================
// ATmega32U4 USB Register-Level Driver
// ============================================================================

// USB endpoint configuration for the gamepad
const EP0_SIZE: u8 = 64; // Control endpoint size
const EP1_SIZE: u8 = 16; // Interrupt IN endpoint size (11-byte reports)

// USB descriptors
static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,    // bDeviceClass (defined at interface level)
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    VENDOR_ID as u8, (VENDOR_ID >> 8) as u8, // idVendor
    PRODUCT_ID as u8, (PRODUCT_ID >> 8) as u8, // idProduct (shared joystick PID)
    0x01, 0x00, // bcdDevice (1.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    // Configuration descriptor
    9,    // bLength
    2,    // bDescriptorType (Configuration)
    34, 0, // wTotalLength
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface descriptor
    9,    // bLength
    4,    // bDescriptorType (Interface)
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    0,    // bInterfaceSubClass (none, no boot protocol for gamepads)
    0,    // bInterfaceProtocol (none)
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    DESCRIPTOR_LEN as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP1 IN — interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    0x81, // bEndpointAddress (EP1 IN)
    0x03, // bmAttributes (Interrupt)
    EP1_SIZE, 0, // wMaxPacketSize
    10,   // bInterval (10ms polling)
];

/// String descriptor 0 (language ID)
static STRING_DESC_0: [u8; 4] = [4, 3, 0x09, 0x04]; // English (US)

/// String descriptor 1 (manufacturer): "DronePad"
static STRING_DESC_1: [u8; 18] = [
    18, 3, // bLength, bDescriptorType
    b'D', 0, b'r', 0, b'o', 0, b'n', 0, b'e', 0, b'P', 0, b'a', 0, b'd', 0,
];

/// String descriptor 2 (product): "Controller"
static STRING_DESC_2: [u8; 22] = [
    22, 3, // bLength, bDescriptorType
    b'C', 0, b'o', 0, b'n', 0, b't', 0, b'r', 0, b'o', 0, b'l', 0, b'l', 0, b'e', 0, b'r', 0,
];

/// USB device state.
pub struct UsbGamepad {
    configured: bool,
    last_report: ControllerReport,
    /// Nothing has been sent since configuration; the first report always goes out.
    pending_first: bool,
}

impl UsbGamepad {
    pub const fn new() -> Self {
        Self {
            configured: false,
            last_report: ControllerReport::empty(),
            pending_first: true,
        }
    }

    /// Initialize the ATmega32U4 USB controller.
    pub fn init(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        // Enable USB pad regulator
        usb.uhwcon.write(|w| w.uvrege().set_bit());

        // Enable USB controller and VBUS pad
        usb.usbcon
            .write(|w| w.usbe().set_bit().otgpade().set_bit());

        // Configure PLL for 16MHz crystal -> 96MHz PLL -> 48MHz USB clock
        // PLLCSR: PINDIV=1 (16MHz), PLLE=1
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());

        // Wait for PLL lock
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        // Enable USB clock
        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());

        // Attach to bus (clear DETACH)
        usb.udcon.modify(|_, w| w.detach().clear_bit());

        // Enable End-Of-Reset interrupt
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Poll for USB events and handle them. Call this once per tick.
    pub fn poll(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        let udint = usb.udint.read();

        // End of reset
        if udint.eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0(dp);
            self.configured = false;
        }

        // Check for SETUP packet on EP0
        self.select_endpoint(dp, 0);
        let ueintx = usb.ueintx.read();
        if ueintx.rxstpi().bit_is_set() {
            self.handle_setup(dp);
        }
    }

    /// Send a gamepad report if it has changed since the last one sent.
    pub fn send_report(&mut self, dp: &Peripherals, report: &ControllerReport) {
        if !self.configured || (!self.pending_first && *report == self.last_report) {
            return;
        }

        let usb = &dp.USB_DEVICE;
        self.select_endpoint(dp, 1);

        // Wait for endpoint ready (RWAL set means we can write)
        let mut timeout: u16 = 0xFFFF;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return;
            }
        }

        // Report ID followed by the little-endian payload
        let wire: [u8; WIRE_LEN] = report.to_wire();
        for &byte in &wire {
            usb.uedatx.write(|w| w.bits(byte));
        }

        // Clear FIFOCON and TXINI to send
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());

        self.last_report = *report;
        self.pending_first = false;
    }

    fn configure_ep0(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 0);
        // Enable EP0 as control endpoint, 64 bytes
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 1);
        usb.ueconx.write(|w| w.epen().set_bit());
        // Interrupt IN endpoint, 16 bytes
        usb.uecfg0x
            .write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b001).alloc().set_bit());
    }

    fn select_endpoint(&self, dp: &Peripherals, ep: u8) {
        dp.USB_DEVICE
            .uenum
            .write(|w| w.bits(ep & 0x07));
    }

    fn handle_setup(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        // Read 8-byte SETUP packet
        let bm_request_type = usb.uedatx.read().bits();
        let b_request = usb.uedatx.read().bits();
        let w_value_l = usb.uedatx.read().bits();
        let w_value_h = usb.uedatx.read().bits();
        let _w_index_l = usb.uedatx.read().bits();
        let _w_index_h = usb.uedatx.read().bits();
        let w_length_l = usb.uedatx.read().bits();
        let w_length_h = usb.uedatx.read().bits();

        // Acknowledge SETUP
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let w_length = (w_length_h as u16) << 8 | w_length_l as u16;

        match (bm_request_type, b_request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => {
                let desc_type = w_value_h;
                let desc_index = w_value_l;
                match desc_type {
                    1 => self.send_descriptor(dp, &DEVICE_DESCRIPTOR, w_length),
                    2 => self.send_descriptor(dp, &CONFIG_DESCRIPTOR, w_length),
                    3 => match desc_index {
                        0 => self.send_descriptor(dp, &STRING_DESC_0, w_length),
                        1 => self.send_descriptor(dp, &STRING_DESC_1, w_length),
                        2 => self.send_descriptor(dp, &STRING_DESC_2, w_length),
                        _ => self.stall(dp),
                    },
                    _ => self.stall(dp),
                }
            }

            // SET_ADDRESS
            (0x00, 0x05) => {
                // Send ZLP first, then set address
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(w_value_l & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                self.configure_ep1(dp);
                self.configured = true;
                self.pending_first = true;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => {
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.uedatx
                    .write(|w| w.bits(if self.configured { 1 } else { 0 }));
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            // HID GET_DESCRIPTOR (interface-level)
            (0x81, 0x06) => {
                let desc_type = w_value_h;
                match desc_type {
                    0x22 => self.send_descriptor(dp, &REPORT_DESCRIPTOR, w_length),
                    _ => self.stall(dp),
                }
            }

            // HID GET_REPORT: answer with the last report sent
            (0xA1, 0x01) => {
                let wire = self.last_report.to_wire();
                self.send_descriptor(dp, &wire, w_length);
            }

            // HID SET_IDLE
            (0x21, 0x0A) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            _ => {
                self.stall(dp);
            }
        }
    }

    /// Send `desc` on EP0 in packet-sized chunks, truncated to `max_length`.
    fn send_descriptor(&self, dp: &Peripherals, desc: &[u8], max_length: u16) {
        let usb = &dp.USB_DEVICE;
        let len = core::cmp::min(desc.len(), max_length as usize);
        let mut sent = 0;

        while sent < len {
            while usb.ueintx.read().txini().bit_is_clear() {}

            let chunk_end = core::cmp::min(sent + EP0_SIZE as usize, len);
            for &byte in &desc[sent..chunk_end] {
                usb.uedatx.write(|w| w.bits(byte));
            }

            usb.ueintx.modify(|_, w| w.txini().clear_bit());
            sent = chunk_end;
        }

        // Wait for status stage (host sends ZLP)
        while usb.ueintx.read().rxouti().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    fn stall(&self, dp: &Peripherals) {
        dp.USB_DEVICE
            .ueconx
            .modify(|_, w| w.stallrq().set_bit());
    }
}
