// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    DecryptionProtocol, DecryptionState, PreparedRequest, ProtocolError, RecordStatus, Subject,
};
use actix::prelude::*;
use cg_events::{
    BusError, Category, CategoryCountDecrypted, CategoryCountRequested, DecryptionRequested,
    EventBus, RecordDecrypted, RecordId, RecordSubmitted, RequestId, ShapeErrorType, ShapeEvent,
};
use cg_oracle::{CallbackSelector, DecryptionOracle, DecryptionProof, OracleCallback};
use cg_utils::{ready_atomic, ArcBytes};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RecordId, ProtocolError>")]
pub struct SubmitShape {
    pub shape2d: ArcBytes,
    pub shape3d: ArcBytes,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId, ProtocolError>")]
pub struct RequestGeometryDecryption {
    pub record_id: RecordId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<DecryptionState, ProtocolError>")]
pub struct GetDecryptedGeometry {
    pub record_id: RecordId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<ArcBytes, ProtocolError>")]
pub struct GetEncryptedIntersectionCount {
    pub category: Category,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId, ProtocolError>")]
pub struct RequestCategoryCountDecryption {
    pub category: Category,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Option<u64>, ProtocolError>")]
pub struct GetRevealedCount {
    pub category: Category,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RecordStatus, ProtocolError>")]
pub struct GetRecordStatus {
    pub record_id: RecordId,
}

/// Geometry callback with the outcome returned to the sender.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RecordId, ProtocolError>")]
pub struct HandleGeometryCallback {
    pub request_id: RequestId,
    pub cleartext: ArcBytes,
    pub proof: DecryptionProof,
}

/// Category count callback with the outcome returned to the sender.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(Category, u64), ProtocolError>")]
pub struct HandleCategoryCountCallback {
    pub request_id: RequestId,
    pub cleartext: ArcBytes,
    pub proof: DecryptionProof,
}

/// Actor front of the [`DecryptionProtocol`].
///
/// The actor processes one message at a time and request handlers hold the mailbox while the
/// oracle call is in flight, so a request id is always registered before its callback can be
/// handled. Outcomes are published on the bus; failures are also returned to the sender.
pub struct DecryptionController {
    protocol: DecryptionProtocol,
    oracle: Arc<dyn DecryptionOracle>,
    bus: Addr<EventBus<ShapeEvent>>,
}

impl DecryptionController {
    pub fn new(
        protocol: DecryptionProtocol,
        oracle: Arc<dyn DecryptionOracle>,
        bus: Addr<EventBus<ShapeEvent>>,
    ) -> Self {
        Self {
            protocol,
            oracle,
            bus,
        }
    }

    /// Start a controller whose oracle needs to know where to deliver callbacks.
    pub fn attach<F>(
        protocol: DecryptionProtocol,
        bus: Addr<EventBus<ShapeEvent>>,
        oracle: F,
    ) -> Addr<Self>
    where
        F: FnOnce(Recipient<OracleCallback>) -> Arc<dyn DecryptionOracle>,
    {
        Self::create(|ctx| {
            let oracle = oracle(ctx.address().recipient());
            Self::new(protocol, oracle, bus)
        })
    }

    fn report(&self, err_type: ShapeErrorType, err: &ProtocolError) {
        error!("{err_type:?}: {err}");
        self.bus.err(err_type, anyhow::Error::new(err.clone()));
    }

    /// Send a prepared request to the oracle and register the id it hands back.
    fn dispatch(
        &self,
        prepared: PreparedRequest,
    ) -> AtomicResponse<Self, Result<RequestId, ProtocolError>> {
        let oracle = self.oracle.clone();
        let ciphertexts = prepared.ciphertexts.clone();
        let selector = prepared.selector();

        AtomicResponse::new(Box::pin(
            async move { oracle.request_decryption(ciphertexts, selector).await }
                .into_actor(self)
                .map(move |res, act, _| {
                    let result = res
                        .map_err(|e| ProtocolError::Oracle(format!("{e:#}")))
                        .and_then(|request_id| {
                            act.protocol.register_request(
                                request_id,
                                prepared.subject.clone(),
                                prepared.ciphertext_digest,
                            )?;
                            Ok(request_id)
                        });

                    match &result {
                        Ok(request_id) => act.publish_requested(&prepared.subject, *request_id),
                        Err(e @ ProtocolError::Oracle(_)) => act.report(ShapeErrorType::Oracle, e),
                        Err(e) => act.report(ShapeErrorType::DecryptionRequest, e),
                    }
                    result
                }),
        ))
    }

    fn publish_requested(&self, subject: &Subject, request_id: RequestId) {
        info!("Requested decryption of {subject} as {request_id}");
        let event = match subject {
            Subject::Geometry(record_id) => ShapeEvent::from(DecryptionRequested {
                record_id: *record_id,
                request_id,
            }),
            Subject::CategoryCount(category) => ShapeEvent::from(CategoryCountRequested {
                category: category.clone(),
                request_id,
            }),
        };
        self.bus.do_send(event);
    }

    fn on_geometry_callback(
        &mut self,
        request_id: RequestId,
        cleartext: &[u8],
        proof: &DecryptionProof,
    ) -> Result<RecordId, ProtocolError> {
        match self
            .protocol
            .apply_geometry_callback(request_id, cleartext, proof)
        {
            Ok((record_id, category)) => {
                self.bus.do_send(ShapeEvent::from(RecordDecrypted {
                    record_id,
                    request_id,
                    category,
                }));
                Ok(record_id)
            }
            Err(e) => {
                self.report(ShapeErrorType::GeometryCallback, &e);
                Err(e)
            }
        }
    }

    fn on_category_count_callback(
        &mut self,
        request_id: RequestId,
        cleartext: &[u8],
        proof: &DecryptionProof,
    ) -> Result<(Category, u64), ProtocolError> {
        match self
            .protocol
            .apply_category_count_callback(request_id, cleartext, proof)
        {
            Ok((category, count)) => {
                self.bus.do_send(ShapeEvent::from(CategoryCountDecrypted {
                    category: category.clone(),
                    request_id,
                    count,
                }));
                Ok((category, count))
            }
            Err(e) => {
                self.report(ShapeErrorType::CategoryCountCallback, &e);
                Err(e)
            }
        }
    }
}

impl Actor for DecryptionController {
    type Context = Context<Self>;
}

impl Handler<SubmitShape> for DecryptionController {
    type Result = Result<RecordId, ProtocolError>;

    fn handle(&mut self, msg: SubmitShape, _: &mut Self::Context) -> Self::Result {
        match self.protocol.submit(msg.shape2d, msg.shape3d) {
            Ok((record_id, submitted_at)) => {
                self.bus.do_send(ShapeEvent::from(RecordSubmitted {
                    record_id,
                    submitted_at,
                }));
                Ok(record_id)
            }
            Err(e) => {
                self.report(ShapeErrorType::Submission, &e);
                Err(e)
            }
        }
    }
}

impl Handler<RequestGeometryDecryption> for DecryptionController {
    type Result = AtomicResponse<Self, Result<RequestId, ProtocolError>>;

    fn handle(&mut self, msg: RequestGeometryDecryption, _: &mut Self::Context) -> Self::Result {
        match self.protocol.prepare_geometry_decryption(msg.record_id) {
            Ok(prepared) => self.dispatch(prepared),
            Err(e) => {
                self.report(ShapeErrorType::DecryptionRequest, &e);
                ready_atomic(self, Err(e))
            }
        }
    }
}

impl Handler<RequestCategoryCountDecryption> for DecryptionController {
    type Result = AtomicResponse<Self, Result<RequestId, ProtocolError>>;

    fn handle(
        &mut self,
        msg: RequestCategoryCountDecryption,
        _: &mut Self::Context,
    ) -> Self::Result {
        match self.protocol.prepare_category_count_decryption(&msg.category) {
            Ok(prepared) => self.dispatch(prepared),
            Err(e) => {
                self.report(ShapeErrorType::DecryptionRequest, &e);
                ready_atomic(self, Err(e))
            }
        }
    }
}

impl Handler<GetDecryptedGeometry> for DecryptionController {
    type Result = Result<DecryptionState, ProtocolError>;

    fn handle(&mut self, msg: GetDecryptedGeometry, _: &mut Self::Context) -> Self::Result {
        self.protocol.decrypted_geometry(msg.record_id)
    }
}

impl Handler<GetEncryptedIntersectionCount> for DecryptionController {
    type Result = Result<ArcBytes, ProtocolError>;

    fn handle(
        &mut self,
        msg: GetEncryptedIntersectionCount,
        _: &mut Self::Context,
    ) -> Self::Result {
        self.protocol.encrypted_count(&msg.category)
    }
}

impl Handler<GetRevealedCount> for DecryptionController {
    type Result = Result<Option<u64>, ProtocolError>;

    fn handle(&mut self, msg: GetRevealedCount, _: &mut Self::Context) -> Self::Result {
        self.protocol.revealed_count(&msg.category)
    }
}

impl Handler<GetRecordStatus> for DecryptionController {
    type Result = Result<RecordStatus, ProtocolError>;

    fn handle(&mut self, msg: GetRecordStatus, _: &mut Self::Context) -> Self::Result {
        self.protocol.record_status(msg.record_id)
    }
}

impl Handler<HandleGeometryCallback> for DecryptionController {
    type Result = Result<RecordId, ProtocolError>;

    fn handle(&mut self, msg: HandleGeometryCallback, _: &mut Self::Context) -> Self::Result {
        self.on_geometry_callback(msg.request_id, &msg.cleartext, &msg.proof)
    }
}

impl Handler<HandleCategoryCountCallback> for DecryptionController {
    type Result = Result<(Category, u64), ProtocolError>;

    fn handle(&mut self, msg: HandleCategoryCountCallback, _: &mut Self::Context) -> Self::Result {
        self.on_category_count_callback(msg.request_id, &msg.cleartext, &msg.proof)
    }
}

impl Handler<OracleCallback> for DecryptionController {
    type Result = ();

    fn handle(&mut self, msg: OracleCallback, _: &mut Self::Context) -> Self::Result {
        // Failures have already been published on the bus.
        let _ = match msg.selector {
            CallbackSelector::Geometry => self
                .on_geometry_callback(msg.request_id, &msg.cleartext, &msg.proof)
                .map(|_| ()),
            CallbackSelector::CategoryCount => self
                .on_category_count_callback(msg.request_id, &msg.cleartext, &msg.proof)
                .map(|_| ()),
        };
    }
}
