//! Configuration Module
//!
//! This module defines all configuration structures for the account node.
//! Configuration is loaded from TOML files and parsed using serde.

use crate::{AccountVariant, account::DEPLOYER_SYSTEM_CONTRACT};
use ethers::types::Address;
use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [account]
/// variant = "evm"
/// entry_point = "0x0000000000000000000000000000000000004337"
/// chain_id = 31337
///
/// [api]
/// host = "127.0.0.1"
/// port = 8545
///
/// [database]
/// url = "sqlite://accounts.db?mode=rwc"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
}

/// Smart account configuration
///
/// # Fields
/// - `variant`: Account variant created by `createAccount` ("evm" or "zksync")
/// - `entry_point`: The trusted infrastructure caller (entry point or bootloader)
/// - `system_deployer`: Reserved address routed through the system dispatcher
///   by zksync accounts
/// - `chain_id`: Chain id mixed into the operation digest domain
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub variant: AccountVariant,
    pub entry_point: Address,
    #[serde(default = "default_system_deployer")]
    pub system_deployer: Address,
    pub chain_id: u64,
}

fn default_system_deployer() -> Address {
    DEPLOYER_SYSTEM_CONTRACT
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            variant: AccountVariant::Evm,
            entry_point: Address::from_low_u64_be(0x4337),
            system_deployer: DEPLOYER_SYSTEM_CONTRACT,
            chain_id: 31337,
        }
    }
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 8545)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
///
/// # Fields
/// - `url`: Database connection URL (e.g., "sqlite://accounts.db?mode=rwc")
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
