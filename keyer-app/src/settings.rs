use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use keyer_core::{KeyerConfig, DEFAULT_WPM};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// GPIO line numbers, BCM numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinSettings {
    /// Offset added to every line (newer kernels number the header from 512)
    pub gpio_base: u32,
    pub dit: u32,
    pub dah: u32,
    pub light: u32,
    pub light_active_low: bool,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            gpio_base: 0,
            dit: 2,
            dah: 3,
            light: 17,
            light_active_low: false,
        }
    }
}

/// Keyer settings, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub wpm: u32,

    // Sidetone settings
    pub sidetone_frequency: f32,
    pub sidetone_volume: f32,
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub output_device: Option<String>,

    pub pins: PinSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            sidetone_frequency: 440.0,
            sidetone_volume: 0.5,
            sample_rate: 22_500,
            bit_depth: 16,
            output_device: None,
            pins: PinSettings::default(),
        }
    }
}

impl Settings {
    /// Get the path to the default settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("iambic-keyer");
            path.push("settings.json");
            path
        })
    }

    /// Load settings.
    ///
    /// An explicit path must exist and parse. The default location falls
    /// back to defaults when the file is absent or unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            let settings = Self::from_json(&contents)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
            info!("Loaded settings from {}", path.display());
            return Ok(settings);
        }

        let Some(path) = Self::config_path() else {
            warn!("Could not determine config path, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        match fs::read_to_string(&path).map_err(anyhow::Error::from).and_then(|c| Self::from_json(&c)) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                warn!("Ignoring settings at {}: {:#}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sidetone_volume) {
            bail!("sidetone_volume must be between 0.0 and 1.0");
        }
        if self.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if !(self.sidetone_frequency > 0.0 && self.sidetone_frequency < self.sample_rate as f32 / 2.0) {
            bail!("sidetone_frequency must be between 0 and half the sample rate");
        }
        if !matches!(self.bit_depth, 8 | 16 | 32) {
            bail!("bit_depth must be 8, 16 or 32");
        }
        let PinSettings { dit, dah, light, .. } = self.pins;
        if dit == dah || dit == light || dah == light {
            bail!("dit, dah and light pins must be distinct");
        }
        self.keyer_config().map(|_| ())
    }

    pub fn keyer_config(&self) -> Result<KeyerConfig> {
        KeyerConfig::new(self.wpm).map_err(|e| anyhow!(e))
    }
}
