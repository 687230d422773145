// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use cg_events::RequestId;
use cg_oracle::{CallbackSelector, DecryptionOracle, OracleCallback, OracleKms};
use cg_utils::ArcBytes;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedRequest {
    pub request_id: RequestId,
    pub ciphertexts: Vec<ArcBytes>,
    pub selector: CallbackSelector,
}

#[derive(Default)]
struct State {
    last_id: u64,
    requests: Vec<IssuedRequest>,
    failing: bool,
    fixed_id: Option<RequestId>,
}

/// Oracle that only records requests. Callbacks are produced on demand with
/// [`ManualOracle::callback_for`] so tests decide when, and whether, they land.
#[derive(Clone)]
pub struct ManualOracle {
    kms: Arc<OracleKms>,
    state: Arc<Mutex<State>>,
}

impl ManualOracle {
    pub fn new(kms: Arc<OracleKms>) -> Self {
        Self {
            kms,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Answer every request with the same id, as a misbehaving oracle would.
    pub fn with_fixed_id(self, request_id: RequestId) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.fixed_id = Some(request_id);
        }
        self
    }

    /// Refuse subsequent requests.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.failing = failing;
        }
    }

    pub fn requests(&self) -> Vec<IssuedRequest> {
        self.state
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<IssuedRequest> {
        self.requests().pop()
    }

    /// The genuine, signed callback for a recorded request.
    pub fn callback_for(&self, request_id: RequestId) -> Result<OracleCallback> {
        let Some(request) = self
            .requests()
            .into_iter()
            .rev()
            .find(|r| r.request_id == request_id)
        else {
            bail!("No request {request_id} was issued");
        };
        self.kms
            .respond(request_id, &request.ciphertexts, request.selector)
    }
}

#[async_trait]
impl DecryptionOracle for ManualOracle {
    async fn request_decryption(
        &self,
        ciphertexts: Vec<ArcBytes>,
        selector: CallbackSelector,
    ) -> Result<RequestId> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("ManualOracle state poisoned"))?;
        if state.failing {
            bail!("Oracle is refusing requests");
        }
        state.last_id += 1;
        let request_id = state.fixed_id.unwrap_or(RequestId::new(state.last_id));
        state.requests.push(IssuedRequest {
            request_id,
            ciphertexts,
            selector,
        });
        Ok(request_id)
    }
}
