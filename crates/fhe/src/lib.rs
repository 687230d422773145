// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod adaptor;
mod codec;
mod decryptor;
mod engine;
mod params;

pub use adaptor::*;
pub use codec::*;
pub use decryptor::*;
pub use engine::*;
pub use params::*;
