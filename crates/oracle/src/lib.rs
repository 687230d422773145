// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Everything on our side of the decryption oracle boundary: the client trait used to
//! issue requests, the callback message the oracle answers with, the cleartext wire format
//! and the attestation every callback must carry.

mod cleartext;
mod kms;
mod local_oracle;
mod oracle;
mod proof;

pub use cleartext::*;
pub use kms::*;
pub use local_oracle::*;
pub use oracle::*;
pub use proof::*;
