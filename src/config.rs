//! Optional TOML-backed configuration for network defaults and trainer
//! parameters, loaded once at startup rather than threaded through every
//! constructor call.

use serde::{Deserialize, Serialize};

use crate::errors::GraphResult;

/// Defaults applied when a caller doesn't specify per-cell learning
/// parameters explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkDefaults {
    pub eta: f32,
    pub alpha: f32,
    pub lambda: f32,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            eta: 0.5,
            alpha: 0.0,
            lambda: 0.0,
        }
    }
}

/// Trainer-level configuration. A configuration error (`epochs == 0` is
/// allowed — it means "run the validation pass but no epochs" — but a
/// missing or unparsable file is a hard failure at `Trainer::execute`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrainerConfig {
    pub epochs: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self { epochs: 1 }
    }
}

/// Top-level configuration document combining both sections under `[network]`
/// and `[trainer]` tables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkDefaults,
    #[serde(default)]
    pub trainer: TrainerConfig,
}

pub fn load_toml(text: &str) -> GraphResult<Config> {
    toml::from_str(text).map_err(|e| {
        crate::errors::GraphError::MalformedSnapshot(format!("invalid configuration: {e}"))
    })
}
