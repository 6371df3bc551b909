//! Optional TOML file supplying defaults for the command-line options.
//!
//! ```toml
//! seed = 7
//! max_steps = 500
//! policy = "cycle"
//! verbose = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// How headless runs pick their next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Random legal moves
    #[default]
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub seed: u64,
    /// Maximum steps per episode (0 = unlimited)
    pub max_steps: u32,
    pub policy: Policy,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: 42,
            max_steps: 10_000,
            policy: Policy::Random,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
