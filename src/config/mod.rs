use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::GroundTruth;
use crate::logging::LoggingConfig;
use crate::registration::AlignmentConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub alignment: AlignmentConfig,
    pub image: ImageConfig,
    pub demo: DemoConfig,
    pub logging: LoggingConfig,
}

/// Limits applied to images loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_size: 8,
            max_size: 16384,
        }
    }
}

/// Distortion and scene used by the `demo` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Side of the synthetic scene when no source image is given.
    pub scene_size: usize,
    pub seed: u64,
    pub distortion: GroundTruth,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene_size: 256,
            seed: 42,
            distortion: GroundTruth::reference_scenario(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        if content.trim_start().starts_with('{') {
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON config {:?}", path))
        } else {
            toml::from_str(&content).with_context(|| format!("Invalid TOML config {:?}", path))
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.alignment.validate() {
            errors.push(e.to_string());
        }

        if self.image.min_size == 0 {
            errors.push("Image min_size must be positive".to_string());
        }

        if self.image.min_size >= self.image.max_size {
            errors.push("Image min_size must be less than max_size".to_string());
        }

        if self.demo.scene_size < self.image.min_size as usize {
            errors.push("Demo scene_size must be at least image min_size".to_string());
        }

        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl std::str::FromStr for ConfigFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(anyhow::anyhow!("Unknown config format: {}", other)),
        }
    }
}

pub fn load_config_or_default(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => match Config::load_from_file(path) {
            Ok(config) => {
                if let Err(errors) = config.validate() {
                    tracing::warn!(?errors, "Configuration validation failed, using defaults");
                    eprintln!("Configuration validation errors:");
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                    eprintln!("Using default configuration instead.");
                    Config::default()
                } else {
                    config
                }
            }
            Err(e) => {
                eprintln!("Failed to load config from '{}': {:#}", path, e);
                eprintln!("Using default configuration.");
                Config::default()
            }
        },
        None => Config::default(),
    }
}
