//! Configuration types for the NexStar mount driver

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub serial: SerialConfig,
    pub mount: MountConfig,
}

/// Serial port configuration
///
/// The baud rate and frame parameters must match the hand control's
/// documented serial profile (9600 8N1) or every write is garbage to the
/// receiver. They are configuration only so a different mount revision can
/// be described without a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path. When absent the driver enumerates available ports and
    /// picks one deterministically.
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_open_timeout")]
    pub open_timeout_seconds: u64,
}

/// Mount device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub name: String,
    pub description: String,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_open_timeout() -> u64 {
    2
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            open_timeout_seconds: default_open_timeout(),
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            name: "NexStar Hand Control".to_string(),
            description: "Celestron NexStar-compatible GOTO mount".to_string(),
        }
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &PathBuf) -> std::result::Result<Config, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
