// SPDX-License-Identifier: AGPL-3.0-or-later
//! Optional TOML configuration

use cos_core::{CollectOptions, CosError, CosResult};
use cos_process::RunOptions;
use serde::Deserialize;
use std::path::Path;

/// Defaults for the `collect` and `run` commands; flags override them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collect: CollectOptions,
    pub run: RunOptions,
}

impl Config {
    pub fn load(path: Option<&Path>) -> CosResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| CosError::read(path.display().to_string(), e))?;
        Self::parse(&text).map_err(|e| CosError::Other(format!("invalid config {}: {}", path.display(), e)))
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
