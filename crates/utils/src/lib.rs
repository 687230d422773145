// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.


mod arc_bytes;
mod atomic;
pub mod formatters;

pub use arc_bytes::ArcBytes;
pub use atomic::ready_atomic;
pub use formatters::hexf;
