// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::DecryptionProof;
use actix::Message;
use anyhow::Result;
use async_trait::async_trait;
use cg_events::RequestId;
use cg_utils::ArcBytes;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Which callback the oracle must answer a request with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackSelector {
    Geometry,
    CategoryCount,
}

impl Display for CallbackSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Client side of an external decryption service.
///
/// `request_decryption` returns as soon as the oracle has accepted the request. The
/// cleartext arrives later as an [`OracleCallback`], possibly never.
#[async_trait]
pub trait DecryptionOracle: Send + Sync {
    async fn request_decryption(
        &self,
        ciphertexts: Vec<ArcBytes>,
        selector: CallbackSelector,
    ) -> Result<RequestId>;
}

/// What the oracle delivers once it has decrypted a request. Untrusted until the proof
/// has been verified.
#[derive(Message, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct OracleCallback {
    pub selector: CallbackSelector,
    pub request_id: RequestId,
    pub cleartext: ArcBytes,
    pub proof: DecryptionProof,
}

impl Display for OracleCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "selector: {}, request_id: {}, cleartext: {} bytes",
            self.selector,
            self.request_id,
            self.cleartext.len()
        )
    }
}
