mod config;
mod device;
mod monitor;
mod simulate;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dronepad_core::adc::SUPPLY_MV;
use dronepad_core::config::PULL_UP_OHMS;
use dronepad_core::report::report_descriptor;
use dronepad_core::{ladder, NUM_BANDS};

#[derive(Parser)]
#[command(name = "dronepad")]
#[command(about = "Drone controller gamepad tools")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List attached controllers
    Detect,
    /// Show live axis and button state from an attached controller
    Monitor {
        /// Stop after this many reports
        #[arg(short, long)]
        count: Option<u64>,
        /// Axis full-scale value for the bars; overrides the config file
        #[arg(long)]
        max_axis: Option<u16>,
        /// Configuration (TOML) providing `max_axis`
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run band decoding and debouncing over a recorded sample trace
    Simulate {
        /// Trace file: one line per tick, one sample per ladder channel
        trace: PathBuf,
        /// Channel configuration (TOML); defaults to the firmware tables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute band thresholds for a resistor ladder
    Thresholds {
        /// Rung resistors in ohms, lowest voltage first
        #[arg(num_args = NUM_BANDS, required = true)]
        rungs: Vec<u32>,
        /// Ladder supply voltage in millivolts
        #[arg(long, default_value_t = SUPPLY_MV)]
        supply_mv: u32,
        /// Pull-up resistor in ohms
        #[arg(long, default_value_t = PULL_UP_OHMS)]
        pull_up: u32,
    },
    /// Print the HID report descriptor
    Descriptor {
        /// Logical maximum of the axes; overrides the config file
        #[arg(long)]
        max_axis: Option<u16>,
        /// Configuration (TOML) providing `max_axis`
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dronepad={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Command::Detect => {
            let found = device::find()?;
            if found.is_empty() {
                println!("No controller detected.");
            }
            for dev in &found {
                println!(
                    "Bus {:03} Device {:03}: {:04x}:{:04x}",
                    dev.bus_number(),
                    dev.address(),
                    dronepad_core::VENDOR_ID,
                    dronepad_core::PRODUCT_ID
                );
            }
        }
        Command::Monitor {
            count,
            max_axis,
            config,
        } => {
            let max_axis = config::resolve_max_axis(max_axis, config.as_deref())?;
            let handle = device::open()?;
            monitor::run(&handle, max_axis, count)?;
        }
        Command::Simulate { trace, config } => {
            let cfg = match &config {
                Some(path) => config::ControllerConfig::load(path)?,
                None => config::ControllerConfig::default(),
            };
            let tables = cfg.band_tables()?;

            let contents = fs::read_to_string(&trace)
                .with_context(|| format!("reading {}", trace.display()))?;
            let ticks = simulate::parse_trace(&contents, tables.len())
                .with_context(|| format!("parsing {}", trace.display()))?;

            let transitions = simulate::run(&tables, &ticks);
            for t in &transitions {
                println!("tick {:>6}: {}", t.tick, simulate::describe(t.buttons));
            }
            println!(
                "{} ticks, {} transitions, {} channel(s)",
                ticks.len(),
                transitions.len(),
                tables.len()
            );
        }
        Command::Thresholds {
            rungs,
            supply_mv,
            pull_up,
        } => {
            let rungs: [u32; NUM_BANDS] = match rungs.try_into() {
                Ok(rungs) => rungs,
                Err(rungs) => bail!("expected {} rung resistors, got {}", NUM_BANDS, rungs.len()),
            };
            if rungs.windows(2).any(|w| w[0] >= w[1]) {
                bail!("rung resistors must be strictly ascending");
            }

            let thresholds = ladder::thresholds(supply_mv, pull_up, rungs);
            for (rung, threshold) in rungs.iter().zip(thresholds) {
                let mv = ladder::divider_mv(supply_mv, pull_up, *rung);
                println!("{:>7} ohm  {:>5} mV  threshold {:>4}", rung, mv, threshold);
            }

            let channel = config::ChannelConfig {
                thresholds,
                mappings: [0, 1, 2, 3, 4],
            };
            channel
                .band_table()
                .context("thresholds do not form a valid band table")?;
            println!();
            print!("{}", config::channel_snippet(&channel)?);
        }
        Command::Descriptor { max_axis, config } => {
            let max_axis = config::resolve_max_axis(max_axis, config.as_deref())?;
            let desc = report_descriptor(max_axis);
            for line in desc.chunks(8) {
                let hex: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
                println!("{}", hex.join(" "));
            }
            println!("{} bytes", desc.len());
        }
    }

    Ok(())
}
