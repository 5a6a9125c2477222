// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
mod fetch;
mod store;
mod traits;

pub use error::KeyError;
pub use fetch::*;
pub use store::*;
pub use traits::KeyDeserializer;
