// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod app_config;
pub mod chain_config;
pub mod load_config;
pub mod mocks;
pub mod rpc;
mod store_keys;
pub mod validation;

pub use app_config::*;
pub use chain_config::ChainConfig;
pub use mocks::{MockConfig, MOCKS_CHAIN_ID};
pub use rpc::*;
pub use store_keys::*;
