// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use anyhow::Result;
use cg_events::{
    Category, Event, EventBus, EventBusConfig, GetErrors, GetHistory, RecordId, ShapeErrorType,
    ShapeEvent,
};
use cg_ledger::{
    CategoryKeying, DecryptionController, DecryptionProtocol, GetDecryptedGeometry,
    GetEncryptedIntersectionCount, GetRecordStatus, GetRevealedCount, ProtocolError,
    RecordStatus, RequestCategoryCountDecryption, RequestGeometryDecryption, SubmitShape,
};
use cg_logger::SimpleLogger;
use cg_oracle::{DecryptionOracle, LocalOracle, LocalOracleClient, ProofVerifier};
use cg_test_helpers::{trace_test, Fixture};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

struct System {
    fixture: Fixture,
    bus: Addr<EventBus<ShapeEvent>>,
    controller: Addr<DecryptionController>,
}

fn start_system(seed: u64, keying: CategoryKeying, forge_proofs: bool) -> Result<System> {
    let fixture = Fixture::new(seed)?;
    let bus = EventBus::<ShapeEvent>::new(EventBusConfig::default()).start();
    SimpleLogger::attach("test", bus.clone());

    let protocol = DecryptionProtocol::new(
        fixture.fhe.clone(),
        ProofVerifier::new([fixture.kms.address()]),
        keying,
    );
    let kms = fixture.kms.clone();
    let controller = DecryptionController::attach(protocol, bus.clone(), move |callbacks| {
        let mut oracle = LocalOracle::new(kms, callbacks);
        if forge_proofs {
            oracle = oracle.with_forged_proofs();
        }
        let client: Arc<dyn DecryptionOracle> = Arc::new(LocalOracleClient::new(oracle.start()));
        client
    });

    Ok(System {
        fixture,
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

    async fn status(&self, record_id: RecordId) -> Result<RecordStatus> {
        Ok(self.controller.send(GetRecordStatus { record_id }).await??)
    }

    /// Callbacks from the local oracle land asynchronously.
    async fn settle(&self) {
        sleep(Duration::from_millis(200)).await;
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
}

#[actix::test]
async fn test_submit_decrypt_and_reveal_count() -> Result<()> {
    let _guard = trace_test("info");
    let system = start_system(1, CategoryKeying::Shape3DKind, false)?;

    let shapes = [
        ("circle:r=1", "sphere:r=1"),
        ("square:2", "cube:2,2,2"),
        ("circle:r=3", "sphere:r=3"),
    ];
    let mut ids = vec![];
    for (shape2d, shape3d) in shapes {
        let id = system.submit(shape2d, shape3d).await?;
        assert_eq!(system.status(id).await?, RecordStatus::Submitted);
        ids.push(id);
    }
    assert_eq!(ids, vec![RecordId::new(1), RecordId::new(2), RecordId::new(3)]);

    for id in &ids {
        system
            .controller
            .send(RequestGeometryDecryption { record_id: *id })
            .await??;
    }
    system.settle().await;

    for (id, (shape2d, shape3d)) in ids.iter().zip(shapes) {
        let state = system
            .controller
            .send(GetDecryptedGeometry { record_id: *id })
            .await??;
        assert!(state.is_decrypted);
        assert_eq!(state.shape2d, shape2d);
        assert_eq!(state.shape3d, shape3d);
    }
    assert_eq!(system.count("sphere").await?, 2);
    assert_eq!(system.count("cube").await?, 1);

    let sphere = Category::new("sphere");
    system
        .controller
        .send(RequestCategoryCountDecryption {
            category: sphere.clone(),
        })
        .await??;
    system.settle().await;
    assert_eq!(
        system
            .controller
            .send(GetRevealedCount { category: sphere })
            .await??,
        Some(2)
    );

    let history = system.bus.send(GetHistory::<ShapeEvent>::new()).await?;
    let count_of = |name: &str| history.iter().filter(|e| e.event_type() == name).count();
    assert_eq!(count_of("RecordSubmitted"), 3);
    assert_eq!(count_of("DecryptionRequested"), 3);
    assert_eq!(count_of("RecordDecrypted"), 3);
    assert_eq!(count_of("CategoryCountRequested"), 1);
    assert_eq!(count_of("CategoryCountDecrypted"), 1);
    assert!(system.bus.send(GetErrors::<ShapeEvent>::new()).await?.is_empty());
    Ok(())
}

#[actix::test]
async fn test_forged_oracle_cannot_decrypt() -> Result<()> {
    let system = start_system(2, CategoryKeying::Shape3D, true)?;
    let id = system.submit("triangle", "tetrahedron").await?;

    system
        .controller
        .send(RequestGeometryDecryption { record_id: id })
        .await??;
    system.settle().await;

    assert_eq!(system.status(id).await?, RecordStatus::DecryptionRequested);
    let state = system
        .controller
        .send(GetDecryptedGeometry { record_id: id })
        .await??;
    assert!(!state.is_decrypted);
    assert!(state.shape2d.is_empty() && state.shape3d.is_empty());

    let errors = system.bus.send(GetErrors::<ShapeEvent>::new()).await?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].err_type, ShapeErrorType::GeometryCallback);

    assert_eq!(
        system
            .controller
            .send(GetEncryptedIntersectionCount {
                category: Category::new("tetrahedron"),
            })
            .await?,
        Err(ProtocolError::CategoryNotFound(Category::new("tetrahedron")))
    );
    Ok(())
}

#[actix::test]
async fn test_re_request_after_decryption_is_refused() -> Result<()> {
    let system = start_system(3, CategoryKeying::Shape3D, false)?;
    let id = system.submit("square", "cube").await?;

    system
        .controller
        .send(RequestGeometryDecryption { record_id: id })
        .await??;
    system.settle().await;
    assert_eq!(system.status(id).await?, RecordStatus::Decrypted);

    assert_eq!(
        system
            .controller
            .send(RequestGeometryDecryption { record_id: id })
            .await?,
        Err(ProtocolError::AlreadyDecrypted(id))
    );
    assert_eq!(
        system
            .controller
            .send(RequestGeometryDecryption {
                record_id: RecordId::new(42)
            })
            .await?,
        Err(ProtocolError::RecordNotFound(RecordId::new(42)))
    );
    assert_eq!(system.count("cube").await?, 1);
    Ok(())
}
