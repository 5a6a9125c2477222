// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod chain;
mod keys;
mod permits;
mod server;
mod zk;

pub use chain::*;
pub use keys::*;
pub use permits::*;
pub use server::*;
pub use zk::*;
