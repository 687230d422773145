// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod fixture;
mod manual_oracle;
mod trace;

pub use fixture::*;
pub use manual_oracle::*;
pub use trace::*;
