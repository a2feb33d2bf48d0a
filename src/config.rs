//! Node configuration.

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// The node's own LAN host, used both for binding awareness and as the
    /// discovery scan origin.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Last-octet offsets probed around `host` during discovery.
    #[serde(default)]
    pub neighbor_ip_range_start: u8,
    #[serde(default = "default_ip_range_end")]
    pub neighbor_ip_range_end: u8,
    #[serde(default = "default_port_range_start")]
    pub neighbor_port_range_start: u16,
    #[serde(default = "default_port_range_end")]
    pub neighbor_port_range_end: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            host: default_host(),
            port: default_port(),
            neighbor_ip_range_start: 0,
            neighbor_ip_range_end: default_ip_range_end(),
            neighbor_port_range_start: default_port_range_start(),
            neighbor_port_range_end: default_port_range_end(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    /// Address the mining reward is paid to. Left empty, the node generates
    /// an ephemeral key pair at startup and logs the derived address.
    #[serde(default)]
    pub blockchain_address: String,
    #[serde(default = "default_mining_enabled")]
    pub enabled: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            blockchain_address: String::new(),
            enabled: default_mining_enabled(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ip_range_end() -> u8 {
    1
}

fn default_port_range_start() -> u16 {
    5000
}

fn default_port_range_end() -> u16 {
    5003
}

fn default_mining_enabled() -> bool {
    true
}

/// Loads `config.toml` from the working directory, falling back to defaults
/// when the file is absent.
pub fn load_config() -> Result<Config, ChainError> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        Config::default()
    } else {
        toml::from_str(&config_str).map_err(|e| ChainError::ConfigError(e.to_string()))?
    };

    if config.network.host.is_empty() {
        return Err(ChainError::ConfigError(
            "network.host must be set".to_string(),
        ));
    }
    if config.network.neighbor_port_range_start > config.network.neighbor_port_range_end {
        return Err(ChainError::ConfigError(
            "neighbor port range start exceeds end".to_string(),
        ));
    }

    Ok(config)
}
