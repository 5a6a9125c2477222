// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::load_config::resolve_config_path;
use crate::mocks::MockConfig;
use crate::validation::ValidUrl;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{env, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "cofhe.config.yaml";
pub const ENV_PREFIX: &str = "COFHE_";

/// Where the key cache is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum KeyStoreConfig {
    /// Lives for the duration of the process
    #[default]
    Memory,
    /// Sled database at the given path
    Sled { path: PathBuf },
}

/// The config used throughout the sdk
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct CofheConfig {
    /// Host chains the co-processor serves
    pub chains: Vec<ChainConfig>,
    /// Local test network settings
    pub mocks: MockConfig,
    /// Generate proofs off the calling thread when possible
    pub use_worker: bool,
    /// Backing store for fetched keys
    pub key_store: KeyStoreConfig,
}

impl Default for CofheConfig {
    fn default() -> Self {
        Self {
            chains: vec![],
            mocks: MockConfig::default(),
            use_worker: true,
            key_store: KeyStoreConfig::default(),
        }
    }
}

impl CofheConfig {
    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chains.push(chain);
        self
    }

    /// Get the configuration for a chain
    pub fn chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Whether encryption on this chain is served by the mock contracts
    pub fn is_mock_chain(&self, chain_id: u64) -> bool {
        self.mocks.chain_id == chain_id
    }

    /// Every configured chain except the local mock chain
    pub fn live_chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains
            .iter()
            .filter(move |c| !self.is_mock_chain(c.chain_id))
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.chain_id) {
                bail!(
                    "Chain id {} is configured more than once (latest entry: '{}')",
                    chain.chain_id,
                    chain.name
                );
            }
            for (field, url) in chain.endpoints() {
                url.parse::<ValidUrl>()
                    .with_context(|| format!("Invalid {field} for chain '{}'", chain.name))?;
            }
            chain.rpc()?;
        }
        Ok(())
    }
}

/// Load configuration from the given yaml file or the nearest `cofhe.config.yaml`, with
/// `COFHE_` prefixed environment variables taking precedence. Nested keys use `__`, eg.
/// `COFHE_MOCKS__STEP_DELAY_MS=100`.
pub fn load_config(config_file: Option<PathBuf>) -> Result<CofheConfig> {
    let resolved = resolve_config_path(env::current_dir()?, DEFAULT_CONFIG_NAME, config_file);

    let mut figment = Figment::from(Serialized::defaults(CofheConfig::default()));
    if let Some(path) = &resolved {
        debug!(path = %path.display(), "Loading configuration file");
        figment = figment.merge(Yaml::file(path));
    }

    let config: CofheConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    Ok(config)
}
