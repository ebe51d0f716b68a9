//! Optional TOML configuration for the demo client.

use std::{path::Path, time::Duration};

use anyhow::Context;
use bonsai_client::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, PollConfig};
use serde::{Deserialize, Serialize};

/// Image ID of the `factors` example guest.
pub const DEFAULT_IMAGE_ID: &str =
    "d5ddf6ddb4b8ee860a56c4fcf65d0b1b843ac2aa74b45c0d0b71d8c1db424ecb";

/// zkVM version announced to the service.
pub const DEFAULT_RISC0_VERSION: &str = "0.19.1";

/// Client configuration. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the service API.
    pub api_url: String,
    /// Value of the `x-risc0-version` header.
    pub risc0_version: String,
    /// Image to prove.
    pub image_id: String,
    /// Status polling.
    pub poll: PollSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            risc0_version: DEFAULT_RISC0_VERSION.to_string(),
            image_id: DEFAULT_IMAGE_ID.to_string(),
            poll: PollSettings::default(),
        }
    }
}

/// Status polling settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSettings {
    /// Seconds between two status requests.
    pub interval_secs: u64,
    /// Give up after this many status requests.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_attempts: None,
        }
    }
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        PollConfig {
            interval: Duration::from_secs(settings.interval_secs),
            max_attempts: settings.max_attempts,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {path:?}"))?;
        Self::from_toml_str(&string)
    }

    /// Parse config from TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml_edit::de::from_str(s)
            .with_context(|| format!("Failed to deserialize TOML config:\n{s}"))
    }
}
