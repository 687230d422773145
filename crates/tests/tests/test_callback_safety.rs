// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use cg_events::{
    Category, EventBus, EventBusConfig, GetErrors, RecordId, RequestId, ShapeErrorType, ShapeEvent,
};
use cg_ledger::{
    CategoryKeying, DecryptionController, DecryptionProtocol, GetDecryptedGeometry,
    GetEncryptedIntersectionCount, GetRecordStatus, HandleCategoryCountCallback,
    HandleGeometryCallback, ProtocolError, RecordStatus, RequestCategoryCountDecryption,
    RequestGeometryDecryption, SubmitShape,
};
use cg_oracle::{ciphertext_digest, DecryptionProof, OracleCallback, ProofVerifier};
use cg_test_helpers::{Fixture, ManualOracle};
use std::sync::Arc;

struct System {
    fixture: Fixture,
    oracle: ManualOracle,
    bus: Addr<EventBus<ShapeEvent>>,
    controller: Addr<DecryptionController>,
}

fn start_system(seed: u64, oracle: impl FnOnce(ManualOracle) -> ManualOracle) -> Result<System> {
    let fixture = Fixture::new(seed)?;
    let oracle = oracle(ManualOracle::new(fixture.kms.clone()));
    let bus = EventBus::<ShapeEvent>::new(EventBusConfig::default()).start();
    let protocol = DecryptionProtocol::new(
        fixture.fhe.clone(),
        ProofVerifier::new([fixture.kms.address()]),
        CategoryKeying::Shape3D,
    );
    let controller =
        DecryptionController::new(protocol, Arc::new(oracle.clone()), bus.clone()).start();
    Ok(System {
        fixture,
        oracle,
        bus,
        controller,
    })
}

impl System {
    async fn submit(&self, shape2d: &str, shape3d: &str) -> Result<RecordId> {
        Ok(self
            .controller
            .send(SubmitShape {
                shape2d: self.fixture.fhe.encrypt_shape(shape2d)?,
                shape3d: self.fixture.fhe.encrypt_shape(shape3d)?,
            })
            .await??)
    }

    async fn request(&self, record_id: RecordId) -> Result<RequestId, ProtocolError> {
        self.controller
            .send(RequestGeometryDecryption { record_id })
            .await
            .map_err(|e| ProtocolError::Oracle(e.to_string()))?
    }

    async fn deliver(&self, request_id: RequestId) -> Result<Result<RecordId, ProtocolError>> {
        let callback = self.oracle.callback_for(request_id)?;
        Ok(self
            .controller
            .send(HandleGeometryCallback {
                request_id: callback.request_id,
                cleartext: callback.cleartext,
                proof: callback.proof,
            })
            .await?)
    }

    async fn count(&self, category: &str) -> Result<u64> {
        let ct = self
            .controller
            .send(GetEncryptedIntersectionCount {
                category: Category::new(category),
            })
            .await??;
        self.fixture.kms.decryptor().decrypt_u64(&ct)
    }

    async fn is_decrypted(&self, record_id: RecordId) -> Result<bool> {
        Ok(self
            .controller
            .send(GetDecryptedGeometry { record_id })
            .await??
            .is_decrypted)
    }
}

#[actix::test]
async fn test_two_records_into_one_category() -> Result<()> {
    let system = start_system(10, |o| o)?;
    let a = system.submit("square", "X").await?;
    let b = system.submit("circle", "X").await?;

    let request_a = system.request(a).await?;
    system.deliver(request_a).await??;
    assert_eq!(system.count("X").await?, 1);

    let request_b = system.request(b).await?;
    system.deliver(request_b).await??;
    assert_eq!(system.count("X").await?, 2);

    assert_eq!(
        system
            .controller
            .send(RequestCategoryCountDecryption {
                category: Category::new("Y"),
            })
            .await?,
        Err(ProtocolError::CategoryNotFound(Category::new("Y")))
    );
    Ok(())
}

#[actix::test]
async fn test_re_request_before_and_after_the_callback() -> Result<()> {
    let system = start_system(11, |o| o)?;
    let id = system.submit("square", "cube").await?;
    assert_eq!(id, RecordId::new(1));

    let first = system.request(id).await?;
    // Accepted while the first request is still outstanding.
    let second = system.request(id).await?;
    assert_ne!(first, second);
    assert_eq!(
        system.controller.send(GetRecordStatus { record_id: id }).await??,
        RecordStatus::DecryptionRequested
    );

    system.deliver(first).await??;
    assert_eq!(system.request(id).await, Err(ProtocolError::AlreadyDecrypted(id)));

    // The late answer to the second request does not count the record twice.
    assert_eq!(
        system.deliver(second).await?,
        Err(ProtocolError::AlreadyDecrypted(id))
    );
    // Neither does a replay of the first.
    assert_eq!(
        system.deliver(first).await?,
        Err(ProtocolError::AlreadyDecrypted(id))
    );
    assert_eq!(system.count("cube").await?, 1);
    assert_eq!(system.oracle.requests().len(), 2);
    Ok(())
}

#[actix::test]
async fn test_unknown_request_id_is_refused() -> Result<()> {
    let system = start_system(12, |o| o)?;
    let id = system.submit("square", "cube").await?;
    let request_id = system.request(id).await?;

    // A correctly signed answer under an id that was never handed out.
    let genuine = system.oracle.callback_for(request_id)?;
    let requests = system.oracle.requests();
    let ciphertexts = &requests[0].ciphertexts;
    let stray = RequestId::new(9_999);
    let proof = system
        .fixture
        .kms
        .attest(stray, &ciphertext_digest(ciphertexts), &genuine.cleartext)?;
    let res = system
        .controller
        .send(HandleGeometryCallback {
            request_id: stray,
            cleartext: genuine.cleartext.clone(),
            proof,
        })
        .await?;
    assert_eq!(res, Err(ProtocolError::InvalidRequest(stray)));
    assert!(!system.is_decrypted(id).await?);

    // A geometry answer to a category request is refused as well.
    system.deliver(request_id).await??;
    let count_request = system
        .controller
        .send(RequestCategoryCountDecryption {
            category: Category::new("cube"),
        })
        .await??;
    let res = system
        .controller
        .send(HandleGeometryCallback {
            request_id: count_request,
            cleartext: genuine.cleartext,
            proof: genuine.proof,
        })
        .await?;
    assert_eq!(res, Err(ProtocolError::InvalidRequest(count_request)));
    Ok(())
}

#[actix::test]
async fn test_untrusted_signer_is_refused() -> Result<()> {
    let system = start_system(13, |o| o)?;
    let id = system.submit("square", "cube").await?;
    let request_id = system.request(id).await?;

    let genuine = system.oracle.callback_for(request_id)?;
    let requests = system.oracle.requests();
    let ciphertexts = &requests[0].ciphertexts;
    let forged = DecryptionProof::sign(
        request_id,
        &ciphertext_digest(ciphertexts),
        &genuine.cleartext,
        &PrivateKeySigner::random(),
    )?;

    // Delivered the way an oracle would, the failure only shows up on the bus.
    system
        .controller
        .send(OracleCallback {
            proof: forged,
            ..genuine.clone()
        })
        .await?;
    assert!(!system.is_decrypted(id).await?);
    let errors = system.bus.send(GetErrors::<ShapeEvent>::new()).await?;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not a trusted oracle"));

    // The genuine answer still goes through afterwards.
    system.controller.send(genuine).await?;
    assert!(system.is_decrypted(id).await?);
    Ok(())
}

#[actix::test]
async fn test_every_replayed_callback_is_reported() -> Result<()> {
    let system = start_system(17, |o| o)?;
    let id = system.submit("square", "cube").await?;
    let request_id = system.request(id).await?;
    let callback = system.oracle.callback_for(request_id)?;

    system.controller.send(callback.clone()).await?;
    assert!(system.is_decrypted(id).await?);
    for _ in 0..3 {
        system.controller.send(callback.clone()).await?;
    }

    let errors = system.bus.send(GetErrors::<ShapeEvent>::new()).await?;
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .all(|e| e.err_type == ShapeErrorType::GeometryCallback));
    assert_eq!(system.count("cube").await?, 1);
    Ok(())
}

#[actix::test]
async fn test_oracle_reusing_request_ids() -> Result<()> {
    let system = start_system(14, |o| o.with_fixed_id(RequestId::new(5)))?;
    let a = system.submit("square", "cube").await?;
    let b = system.submit("circle", "sphere").await?;

    assert_eq!(system.request(a).await, Ok(RequestId::new(5)));
    assert_eq!(
        system.request(b).await,
        Err(ProtocolError::DuplicateRequest(RequestId::new(5)))
    );

    // B's answer under id 5 does not verify, since 5 was registered for A.
    system.deliver(RequestId::new(5)).await.ok();
    assert!(!system.is_decrypted(b).await?);
    Ok(())
}

#[actix::test]
async fn test_category_count_callback_is_applied_once() -> Result<()> {
    let system = start_system(15, |o| o)?;
    for shape in ["a", "b", "c", "d"] {
        let id = system.submit(shape, "cube").await?;
        let request_id = system.request(id).await?;
        system.deliver(request_id).await??;
    }

    let request_id = system
        .controller
        .send(RequestCategoryCountDecryption {
            category: Category::new("cube"),
        })
        .await??;
    let callback = system.oracle.callback_for(request_id)?;
    let message = HandleCategoryCountCallback {
        request_id,
        cleartext: callback.cleartext,
        proof: callback.proof,
    };

    assert_eq!(
        system.controller.send(message.clone()).await??,
        (Category::new("cube"), 4)
    );
    assert_eq!(
        system.controller.send(message).await?,
        Err(ProtocolError::InvalidRequest(request_id))
    );
    Ok(())
}

#[actix::test]
async fn test_oracle_outage_is_reported() -> Result<()> {
    let system = start_system(16, |o| o)?;
    let id = system.submit("square", "cube").await?;

    system.oracle.set_failing(true);
    assert!(matches!(
        system.request(id).await,
        Err(ProtocolError::Oracle(_))
    ));
    system.oracle.set_failing(false);

    let request_id = system.request(id).await?;
    assert_eq!(request_id, RequestId::new(1));
    system.deliver(request_id).await??;
    assert!(system.is_decrypted(id).await?);
    Ok(())
}
