//! Live view of the controller's input reports.

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rusb::{DeviceHandle, GlobalContext};
use std::time::Duration;
use tracing::{debug, trace};

use dronepad_core::ControllerReport;

use crate::device::REPORT_ENDPOINT;
use crate::simulate::describe;

/// Read timeout per interrupt transfer. The device only sends on change.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

const AXIS_NAMES: [&str; 4] = ["right X", "right Y", "left Y", "left X"];

/// Read and display reports until `count` have arrived (or forever).
pub fn run(handle: &DeviceHandle<GlobalContext>, max_axis: u16, count: Option<u64>) -> Result<()> {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:>8} [{bar:40.cyan/blue}] {pos:>4}")
        .context("invalid progress template")?
        .progress_chars("=> ");

    let bars: Vec<ProgressBar> = AXIS_NAMES
        .iter()
        .map(|name| {
            let bar = multi.add(ProgressBar::new(u64::from(max_axis)));
            bar.set_style(style.clone());
            bar.set_prefix(*name);
            bar
        })
        .collect();

    let buttons = multi.add(ProgressBar::new_spinner());
    buttons.set_style(
        ProgressStyle::with_template("{prefix:>8} {msg}").context("invalid progress template")?,
    );
    buttons.set_prefix("buttons");
    buttons.set_message(describe(0));

    let mut buf = [0u8; 64];
    let mut received: u64 = 0;

    while count.map_or(true, |n| received < n) {
        let len = match handle.read_interrupt(REPORT_ENDPOINT, &mut buf, READ_TIMEOUT) {
            Ok(len) => len,
            Err(rusb::Error::Timeout) => {
                trace!("no report within {:?}", READ_TIMEOUT);
                continue;
            }
            Err(e) => return Err(e).context("interrupt transfer failed"),
        };

        let report = match ControllerReport::from_wire(&buf[..len]) {
            Ok(report) => report,
            Err(e) => {
                debug!("skipping report: {}", e);
                continue;
            }
        };

        for (bar, value) in bars.iter().zip(report.axes()) {
            bar.set_position(u64::from(value));
        }
        buttons.set_message(describe(report.buttons));
        received += 1;
    }

    for bar in &bars {
        bar.finish();
    }
    buttons.finish();
    Ok(())
}
