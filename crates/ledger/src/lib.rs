// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod category;
mod controller;
mod correlation;
mod error;
mod keying;
mod protocol;
mod record_store;

pub use category::*;
pub use controller::*;
pub use correlation::*;
pub use error::*;
pub use keying::*;
pub use protocol::*;
pub use record_store::*;
