use anyhow::{bail, Context, Result};
use rusb::{Device, DeviceHandle, GlobalContext};
use tracing::{debug, warn};

use dronepad_core::{PRODUCT_ID, VENDOR_ID};

/// Interface number of the gamepad.
pub const INTERFACE: u8 = 0;

/// Interrupt IN endpoint carrying input reports.
pub const REPORT_ENDPOINT: u8 = 0x81;

/// All attached controllers.
pub fn find() -> Result<Vec<Device<GlobalContext>>> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    let mut found = Vec::new();
    for device in devices.iter() {
        let desc = device
            .device_descriptor()
            .context("failed to read device descriptor")?;
        if desc.vendor_id() == VENDOR_ID && desc.product_id() == PRODUCT_ID {
            debug!(
                bus = device.bus_number(),
                address = device.address(),
                "found controller"
            );
            found.push(device);
        }
    }
    Ok(found)
}

/// Open the first attached controller and claim its HID interface.
pub fn open() -> Result<DeviceHandle<GlobalContext>> {
    let Some(device) = find()?.into_iter().next() else {
        bail!("controller not found (VID {:04x}, PID {:04x})", VENDOR_ID, PRODUCT_ID);
    };

    let handle = device
        .open()
        .context("failed to open controller (may need root/sudo or udev rules)")?;

    // The OS HID driver normally owns the interface
    if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
        warn!("kernel driver auto-detach unavailable: {}", e);
    }
    handle
        .claim_interface(INTERFACE)
        .context("failed to claim HID interface")?;

    Ok(handle)
}
