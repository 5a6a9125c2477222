// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::rpc::RPC;
use anyhow::*;
use serde::{Deserialize, Serialize};

/// Endpoints of the co-processor network for a single host chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    /// Serves the network fhe public key and crs
    pub cofhe_url: Option<String>,
    /// Verifies packed zk proofs and returns signed ciphertext handles
    pub verifier_url: Option<String>,
    /// Threshold network answering seal output requests
    pub threshold_network_url: Option<String>,
    pub rpc_url: Option<String>,
}

impl ChainConfig {
    pub fn new(name: &str, chain_id: u64) -> Self {
        Self {
            name: name.to_owned(),
            chain_id,
            cofhe_url: None,
            verifier_url: None,
            threshold_network_url: None,
            rpc_url: None,
        }
    }

    pub fn with_cofhe_url(mut self, url: &str) -> Self {
        self.cofhe_url = Some(trim_url(url));
        self
    }

    pub fn with_verifier_url(mut self, url: &str) -> Self {
        self.verifier_url = Some(trim_url(url));
        self
    }

    pub fn with_threshold_network_url(mut self, url: &str) -> Self {
        self.threshold_network_url = Some(trim_url(url));
        self
    }

    pub fn with_rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = Some(url.to_owned());
        self
    }

    pub fn rpc(&self) -> Result<Option<RPC>> {
        self.rpc_url
            .as_deref()
            .map(|url| {
                RPC::from_url(url)
                    .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.name, e))
            })
            .transpose()
    }

    /// All configured endpoint urls paired with their field name
    pub fn endpoints(&self) -> Vec<(&'static str, &str)> {
        [
            ("cofhe_url", self.cofhe_url.as_deref()),
            ("verifier_url", self.verifier_url.as_deref()),
            ("threshold_network_url", self.threshold_network_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.map(|u| (name, u)))
        .collect()
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcProtocol;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let chain = ChainConfig::new("sepolia", 11155111)
            .with_cofhe_url("https://cofhe.example.com/")
            .with_verifier_url("https://verifier.example.com");
        assert_eq!(
            chain.cofhe_url.as_deref(),
            Some("https://cofhe.example.com")
        );
        assert_eq!(chain.endpoints().len(), 2);
    }

    #[test]
    fn test_rpc_parsing() -> Result<()> {
        let chain = ChainConfig::new("local", 31337).with_rpc_url("ws://localhost:8545");
        let rpc = chain.rpc()?.expect("rpc is set");
        assert_eq!(rpc.protocol(), RpcProtocol::Ws);
        assert_eq!(rpc.url().port(), Some(8545));

        let chain = ChainConfig::new("broken", 1).with_rpc_url("ftp://nope");
        assert!(chain.rpc().is_err());

        assert!(ChainConfig::new("none", 1).rpc()?.is_none());
        Ok(())
    }
}
