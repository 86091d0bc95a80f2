//! Configuration management for the Gesturing application.
//!
//! This module provides functionality for loading and managing application
//! configuration, including filter timing, classifier thresholds and the
//! mapping from gestures to actions.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::classifier::Thresholds;
use crate::error::Error;
use crate::filter::FilterConfig;
use crate::gesture::Gesture;
use crate::keyboard::Action;

/// Output side configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(default)]
pub struct OutputConfig {
    /// Show a desktop notification whenever a gesture is confirmed
    pub notify: bool,
    /// Log actions instead of simulating key presses
    pub dry_run: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(default)]
pub struct Config {
    /// Stability and cooldown settings
    pub filter: FilterConfig,
    /// Geometric thresholds of the classifier
    pub classifier: Thresholds,
    /// Gesture to action mapping, gestures left out trigger nothing
    pub actions: BTreeMap<Gesture, Action>,
    /// Output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            classifier: Thresholds::default(),
            actions: BTreeMap::from([
                (Gesture::Peace, Action::Next),
                (Gesture::Fist, Action::Prev),
                (Gesture::ThumbsUp, Action::VolumeUp),
                (Gesture::ThumbsDown, Action::VolumeDown),
                (Gesture::Pinch, Action::PlayPause),
            ]),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Gets the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Cannot find config directory")?;
        path.push("gesturing");
        path.push("config.toml");
        Ok(path)
    }

    /// The action mapped to a confirmed gesture.
    pub fn action_for(&self, gesture: Gesture) -> Option<Action> {
        self.actions.get(&gesture).copied()
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> std::result::Result<(), Error> {
        self.filter.validate()?;
        self.classifier.validate()?;
        for gesture in self.actions.keys().filter(|g| !g.is_actionable()) {
            warn!("{gesture} is never confirmed, its action will not run");
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string(self)?;
        std::fs::write(path, contents).with_context(|| format!("Writing {}", path.display()))?;
        Ok(())
    }

    /// Loads configuration from the default location, creating it if it doesn't exist.
    pub fn load_or_write_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };
        let path = path.as_path();
        // If config exists, use it
        if path.exists() {
            return Self::from_file(path)
                .context(format!("Reading default config from {}", path.display()));
        }

        // If no config exists, create default config
        let config = Self::default();
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        config.save_to_file(path)?;
        Ok(config)
    }
}
