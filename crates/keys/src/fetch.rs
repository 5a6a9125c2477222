// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{KeyDeserializer, KeyError, KeysStore};
use cofhe_config::CofheConfig;
use futures::future::try_join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Returned by the key endpoint for chains without an fhe deployment
const NOT_FHE_ENABLED: &str = "0x";

/// Anything shorter (in hex characters) cannot be a network public key
pub const MIN_PUBLIC_KEY_HEX_LEN: usize = 15000;

/// Key material needed to build and prove a packed list on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedKeys {
    pub chain_id: u64,
    pub security_zone: u8,
    pub fhe_public_key: Vec<u8>,
    pub crs: Vec<u8>,
}

#[derive(Clone, Copy)]
enum Material {
    PublicKey,
    Crs,
}

impl Material {
    fn label(self) -> &'static str {
        match self {
            Material::PublicKey => "fhe public key",
            Material::Crs => "crs",
        }
    }

    fn route(self) -> &'static str {
        match self {
            Material::PublicKey => "GetNetworkPublicKey",
            Material::Crs => "GetCrs",
        }
    }

    fn field(self) -> &'static str {
        match self {
            Material::PublicKey => "publicKey",
            Material::Crs => "crs",
        }
    }
}

/// Cache-first retrieval of the fhe public key and crs from a chain's key endpoint.
#[derive(Clone)]
pub struct KeyFetcher {
    client: reqwest::Client,
    store: Arc<KeysStore>,
    deserializer: Arc<dyn KeyDeserializer>,
}

impl KeyFetcher {
    pub fn new(store: Arc<KeysStore>, deserializer: Arc<dyn KeyDeserializer>) -> Self {
        Self {
            client: reqwest::Client::new(),
            store,
            deserializer,
        }
    }

    pub fn store(&self) -> &Arc<KeysStore> {
        &self.store
    }

    /// Resolve both blobs for `(chain_id, security_zone)`. Cached values are returned without
    /// touching the network; fetched values are validated before they are cached.
    pub async fn fetch_keys(
        &self,
        config: &CofheConfig,
        chain_id: u64,
        security_zone: u8,
    ) -> Result<FetchedKeys, KeyError> {
        let chain = config
            .chain(chain_id)
            .ok_or(KeyError::UnsupportedChain(chain_id))?;
        let cofhe_url = chain
            .cofhe_url
            .as_deref()
            .ok_or(KeyError::CofheUrlUninitialized(chain_id))?;

        let fhe_public_key = match self.store.get_fhe_key(chain_id, security_zone)? {
            Some(key) => {
                debug!(chain_id, security_zone, "Using cached fhe public key");
                key
            }
            None => {
                let key = self
                    .fetch_material(cofhe_url, Material::PublicKey, chain_id, security_zone)
                    .await?;
                self.store.set_fhe_key(chain_id, security_zone, key.clone())?;
                key
            }
        };

        let crs = match self.store.get_crs(chain_id)? {
            Some(crs) => {
                debug!(chain_id, "Using cached crs");
                crs
            }
            None => {
                let crs = self
                    .fetch_material(cofhe_url, Material::Crs, chain_id, security_zone)
                    .await?;
                self.store.set_crs(chain_id, crs.clone())?;
                crs
            }
        };

        Ok(FetchedKeys {
            chain_id,
            security_zone,
            fhe_public_key,
            crs,
        })
    }

    /// Warm the cache for every live chain in parallel, using security zone 0.
    pub async fn fetch_multichain_keys(
        &self,
        config: &CofheConfig,
    ) -> Result<Vec<FetchedKeys>, KeyError> {
        try_join_all(
            config
                .live_chains()
                .map(|chain| self.fetch_keys(config, chain.chain_id, 0)),
        )
        .await
    }

    async fn fetch_material(
        &self,
        cofhe_url: &str,
        material: Material,
        chain_id: u64,
        security_zone: u8,
    ) -> Result<Vec<u8>, KeyError> {
        let what = material.label();
        let failed = |reason: String| KeyError::FetchFailed {
            what,
            chain_id,
            reason,
        };

        info!(chain_id, security_zone, "Fetching {} from {}", what, cofhe_url);
        let response: Value = self
            .client
            .post(format!("{}/{}", cofhe_url, material.route()))
            .json(&json!({ "securityZone": security_zone }))
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| failed(e.to_string()))?
            .json()
            .await
            .map_err(|e| failed(format!("response is not json: {e}")))?;

        let encoded = match response.get(material.field()) {
            None | Some(Value::Null) => {
                return Err(failed(format!("response is missing '{}'", material.field())))
            }
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(failed(format!(
                    "expected '{}' to be a string, got {}",
                    material.field(),
                    other
                )))
            }
        };

        if encoded == NOT_FHE_ENABLED {
            return Err(KeyError::NotFheEnabled(chain_id));
        }
        if matches!(material, Material::PublicKey) && encoded.len() < MIN_PUBLIC_KEY_HEX_LEN {
            return Err(failed(format!(
                "public key is {} characters, expected at least {}",
                encoded.len(),
                MIN_PUBLIC_KEY_HEX_LEN
            )));
        }

        let bytes = hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| failed(format!("invalid hex: {e}")))?;

        let validated = match material {
            Material::PublicKey => self.deserializer.deserialize_fhe_public_key(&bytes),
            Material::Crs => self.deserializer.deserialize_crs(&bytes),
        };
        validated.map_err(|e| KeyError::DeserializationFailed {
            what,
            chain_id,
            reason: format!("{e:#}"),
        })?;

        Ok(bytes)
    }
}
