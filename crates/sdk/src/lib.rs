// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod client;
mod connection;
mod context;
mod decrypt;
mod encrypt;
mod error;
pub mod logging;
mod permits;
mod result;

pub use client::*;
pub use connection::*;
pub use decrypt::*;
pub use encrypt::*;
pub use error::*;
pub use permits::*;
pub use result::*;

pub use cofhe_config::{load_config, ChainConfig, CofheConfig, KeyStoreConfig, MockConfig};
pub use cofhe_keys::{FetchedKeys, KeyDeserializer, KeysStore};
pub use cofhe_types::{
    Encryptable, EncryptableItem, EncryptedItemInput, EncryptedPayload, FheType, PlainValue,
    UnsealedValue, MAX_ENCRYPTABLE_BITS,
};
pub use cofhe_zk::{Prover, ZkBackend, ZkBuilder, ZkComputeLoad, ZkCrs, ZkProvenList};
