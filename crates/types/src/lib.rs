// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod encryptable;
mod encrypted;
mod fhe_type;
mod unsealed;

pub use encryptable::*;
pub use encrypted::*;
pub use fhe_type::*;
pub use unsealed::*;

/// Maximum aggregate bit-width that may be packed into a single proven list
pub const MAX_ENCRYPTABLE_BITS: u32 = 2048;
