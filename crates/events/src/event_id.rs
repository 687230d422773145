// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.


use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

/// Content address of a notification. Two notifications of the same kind carrying the
/// same payload share an id, which lets the bus drop re-publications.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub [u8; 32]);

impl EventId {
    pub fn from_payload<T: Hash>(kind: &str, payload: &T) -> Self {
        let mut fingerprint = DefaultHasher::new();
        payload.hash(&mut fingerprint);

        let digest = Sha256::new()
            .chain_update(kind.as_bytes())
            .chain_update([0u8])
            .chain_update(fingerprint.finish().to_be_bytes())
            .finalize();
        EventId(digest.into())
    }

    pub fn short(&self) -> String {
        bs58::encode(&self.0[..6]).into_string()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt:{}", self.short())
    }
}
