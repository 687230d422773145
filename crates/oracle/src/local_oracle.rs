// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    ciphertext_digest, CallbackSelector, DecryptionOracle, DecryptionProof, OracleCallback,
    OracleKms,
};
use actix::prelude::*;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use async_trait::async_trait;
use cg_events::RequestId;
use cg_utils::ArcBytes;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId>")]
pub struct SubmitDecryption {
    pub ciphertexts: Vec<ArcBytes>,
    pub selector: CallbackSelector,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
struct Fulfil {
    request_id: RequestId,
    ciphertexts: Vec<ArcBytes>,
    selector: CallbackSelector,
}

/// In-process decryption oracle. Accepts a request, hands back a fresh id and answers on the
/// callback recipient once the current message has been processed.
pub struct LocalOracle {
    kms: Arc<OracleKms>,
    next_request_id: u64,
    callbacks: Recipient<OracleCallback>,
    forger: Option<PrivateKeySigner>,
}

impl LocalOracle {
    pub fn new(kms: Arc<OracleKms>, callbacks: Recipient<OracleCallback>) -> Self {
        Self {
            kms,
            next_request_id: 1,
            callbacks,
            forger: None,
        }
    }

    /// Sign every attestation with a key nobody trusts.
    pub fn with_forged_proofs(mut self) -> Self {
        self.forger = Some(PrivateKeySigner::random());
        self
    }

    pub fn attach(kms: Arc<OracleKms>, callbacks: Recipient<OracleCallback>) -> Addr<Self> {
        Self::new(kms, callbacks).start()
    }

    fn respond(&self, msg: &Fulfil) -> Result<OracleCallback> {
        let mut callback = self
            .kms
            .respond(msg.request_id, &msg.ciphertexts, msg.selector)?;
        if let Some(forger) = &self.forger {
            callback.proof = DecryptionProof::sign(
                msg.request_id,
                &ciphertext_digest(&msg.ciphertexts),
                &callback.cleartext,
                forger,
            )?;
        }
        Ok(callback)
    }
}

impl Actor for LocalOracle {
    type Context = Context<Self>;
}

impl Handler<SubmitDecryption> for LocalOracle {
    type Result = Result<RequestId>;

    fn handle(&mut self, msg: SubmitDecryption, ctx: &mut Self::Context) -> Self::Result {
        let request_id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        info!(
            "Oracle accepted {} request {} for {} ciphertext(s)",
            msg.selector,
            request_id,
            msg.ciphertexts.len()
        );
        ctx.notify(Fulfil {
            request_id,
            ciphertexts: msg.ciphertexts,
            selector: msg.selector,
        });
        Ok(request_id)
    }
}

impl Handler<Fulfil> for LocalOracle {
    type Result = ();

    fn handle(&mut self, msg: Fulfil, _: &mut Self::Context) -> Self::Result {
        match self.respond(&msg) {
            Ok(callback) => self.callbacks.do_send(callback),
            Err(e) => error!("Oracle could not fulfil request {}: {e}", msg.request_id),
        }
    }
}

/// [`DecryptionOracle`] handle backed by a [`LocalOracle`] actor.
#[derive(Clone)]
pub struct LocalOracleClient {
    addr: Addr<LocalOracle>,
}

impl LocalOracleClient {
    pub fn new(addr: Addr<LocalOracle>) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl DecryptionOracle for LocalOracleClient {
    async fn request_decryption(
        &self,
        ciphertexts: Vec<ArcBytes>,
        selector: CallbackSelector,
    ) -> Result<RequestId> {
        self.addr
            .send(SubmitDecryption {
                ciphertexts,
                selector,
            })
            .await?
    }
}
