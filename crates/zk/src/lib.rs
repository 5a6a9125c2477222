// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
mod metadata;
pub mod mocks;
mod pack;
mod prover;
mod traits;
mod verify;

pub use error::ZkError;
pub use metadata::*;
pub use pack::*;
pub use prover::*;
pub use traits::*;
pub use verify::*;
