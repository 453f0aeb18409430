//! Garden configuration.
//!
//! Loaded from an optional JSON file; every field has a default so an empty
//! object (or no file at all) gives the stock garden. Command-line flags are
//! applied on top by the CLI.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::environment::{Environment, Mood};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    pub scene: SceneConfig,
    pub audio: AudioConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random placement. Random when absent.
    pub seed: Option<u64>,
    pub environment: Environment,
    pub mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory (or URL prefix on the web) that track names are resolved against.
    pub root: String,
    /// Playback volume, 0-1.
    pub volume: f32,
    /// Pause between the end of a track and its restart.
    pub restart_delay_secs: f32,
    /// Per-environment candidate list overriding the built-in catalog.
    pub tracks: HashMap<Environment, Vec<String>>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            root: "audio".to_string(),
            volume: 0.4,
            restart_delay_secs: 0.5,
            tracks: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Luminagarden".to_string(),
        }
    }
}

impl GardenConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(json).context("Invalid garden config")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
