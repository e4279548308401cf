//! # Configuration
//!
//! User configuration stored in `~/.config/blockbar/config.json`, and the
//! host capabilities derived from it.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. The `directories` crate resolves the
//! platform-appropriate location.
//!
//! ```text
//! ~/.config/blockbar/config.json
//! ```
//!
//! ## Host variants
//!
//! Toolbars never probe their environment. The host variant is read from
//! config (or the `--host-variant` flag) and turned into a [`Capabilities`]
//! value that is handed to each toolbar.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The host environment the panel runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostVariant {
    /// Native clipboard access, apply/run actions available.
    #[default]
    Standard,
    /// Clipboard goes through the host, and the action button is hidden.
    Mediated,
}

/// What the toolbar is allowed to do in the current host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Copy through a host request instead of the platform clipboard.
    pub host_mediated_clipboard: bool,
    /// Show the Apply / Run in terminal button.
    pub action_button: bool,
}

impl Capabilities {
    pub fn for_variant(variant: HostVariant) -> Self {
        match variant {
            HostVariant::Standard => Self {
                host_mediated_clipboard: false,
                action_button: true,
            },
            HostVariant::Mediated => Self {
                host_mediated_clipboard: true,
                action_button: false,
            },
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::for_variant(HostVariant::default())
    }
}

/// Persisted user configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub host_variant: HostVariant,

    /// How long the Copied / Applying... feedback stays visible.
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,

    /// Shell used to run terminal blocks.
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_feedback_ms() -> u64 {
    2000
}

fn default_shell() -> String {
    "bash".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_variant: HostVariant::default(),
            feedback_ms: default_feedback_ms(),
            shell: default_shell(),
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Falling back to default config: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_variant(self.host_variant)
    }

    pub fn feedback_window(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "blockbar")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Directory used for the log file.
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "blockbar")
            .context("Could not determine data directory")?;
        Ok(dirs.data_local_dir().to_path_buf())
    }
}
