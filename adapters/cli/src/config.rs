//! Layered configuration: built-in defaults, an optional TOML file, then
//! command-line overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use dot_estimate_core::GameConfig;
use serde::Deserialize;

/// Everything the binary can be configured with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Session rules handed to the game controller.
    pub(crate) game: GameConfig,
    /// Scripted player used by `--headless`.
    pub(crate) headless: HeadlessConfig,
    /// Window presentation options.
    pub(crate) window: WindowConfig,
}

/// Profile of the scripted player.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HeadlessConfig {
    /// Number of rounds to play.
    pub(crate) rounds: u32,
    /// Probability of naming the true count.
    pub(crate) accuracy: f64,
    /// Mean time before answering.
    pub(crate) reaction_ms: u64,
    /// Standard deviation of the answer time.
    pub(crate) reaction_jitter_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            rounds: 50,
            accuracy: 0.8,
            reaction_ms: 1_500,
            reaction_jitter_ms: 400,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            vsync: true,
            show_fps: false,
        }
    }
}

/// Reads `path` when given, falling back to the defaults otherwise.
pub(crate) fn load(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    Ok(toml::from_str(contents)?)
}
