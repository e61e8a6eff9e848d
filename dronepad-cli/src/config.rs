//! Channel configuration loaded from a TOML file.
//!
//! ```toml
//! max_axis = 743
//!
//! [[channel]]
//! thresholds = [31, 92, 169, 277, 507]
//! mappings = [0, 1, 2, 3, 4]
//! ```
//!
//! Without any `[[channel]]` tables the firmware defaults are used.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use dronepad_core::config::{CHANNELS, MAX_AXIS};
use dronepad_core::{BandTable, ConfigError, NUM_BANDS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub thresholds: [u16; NUM_BANDS],
    pub mappings: [u8; NUM_BANDS],
}

impl ChannelConfig {
    pub fn band_table(&self) -> Result<BandTable, ConfigError> {
        BandTable::from_parts(self.thresholds, self.mappings)
    }
}

impl From<&BandTable> for ChannelConfig {
    fn from(table: &BandTable) -> Self {
        let entries = *table.entries();
        Self {
            thresholds: entries.map(|e| e.threshold),
            mappings: entries.map(|e| e.mapping),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    #[serde(default = "default_max_axis")]
    pub max_axis: u16,
    #[serde(default, rename = "channel")]
    pub channels: Vec<ChannelConfig>,
}

fn default_max_axis() -> u16 {
    MAX_AXIS
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_axis: MAX_AXIS,
            channels: CHANNELS.iter().map(ChannelConfig::from).collect(),
        }
    }
}

impl ControllerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        info!(
            path = %path.display(),
            channels = config.channels.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text).context("invalid configuration")?;
        if config.channels.is_empty() {
            debug!("no channels configured, using firmware defaults");
            config.channels = Self::default().channels;
        }
        // Fail fast before anything runs on a bad table
        config.band_tables()?;
        Ok(config)
    }

    /// Validated band tables in channel order.
    pub fn band_tables(&self) -> Result<Vec<BandTable>> {
        self.channels
            .iter()
            .enumerate()
            .map(|(i, ch)| ch.band_table().with_context(|| format!("channel {}", i)))
            .collect()
    }
}

/// Axis ceiling for the device tools: the explicit flag wins, then the
/// configuration file, then the firmware default.
pub fn resolve_max_axis(flag: Option<u16>, config: Option<&Path>) -> Result<u16> {
    if let Some(max_axis) = flag {
        return Ok(max_axis);
    }
    match config {
        Some(path) => Ok(ControllerConfig::load(path)?.max_axis),
        None => Ok(MAX_AXIS),
    }
}

/// Render one `[[channel]]` table.
pub fn channel_snippet(channel: &ChannelConfig) -> Result<String> {
    #[derive(Serialize)]
    struct Snippet<'a> {
        channel: [&'a ChannelConfig; 1],
    }

    toml::to_string(&Snippet { channel: [channel] }).context("serializing channel")
}
