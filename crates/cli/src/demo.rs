// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::oracle_key::signer_or_ephemeral;
use actix::prelude::*;
use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{Context, Result};
use cg_config::AppConfig;
use cg_events::{Category, EventBus, EventBusConfig, GetErrors, RecordId, ShapeError, ShapeEvent};
use cg_fhe::{create_shared_rng_from_entropy, BfvParamSet, FheDecryptor};
use cg_ledger::{
    CategoryKeying, DecryptionController, DecryptionProtocol, DecryptionState, GetDecryptedGeometry,
    GetRecordStatus, GetRevealedCount, RecordStatus, RequestCategoryCountDecryption,
    RequestGeometryDecryption, SubmitShape,
};
use cg_logger::SimpleLogger;
use cg_oracle::{DecryptionOracle, LocalOracle, LocalOracleClient, OracleKms, ProofVerifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const POLL_ATTEMPTS: usize = 100;

pub struct DemoSetup {
    pub name: String,
    pub params: BfvParamSet,
    pub keying: CategoryKeying,
    pub trusted_signers: Vec<Address>,
    pub oracle_signer: PrivateKeySigner,
    pub forge_proofs: bool,
}

#[derive(Debug)]
pub struct DemoReport {
    pub records: Vec<(RecordId, DecryptionState)>,
    pub category: Option<Category>,
    pub revealed_count: Option<u64>,
    pub errors: Vec<ShapeError>,
}

#[instrument(skip_all)]
pub async fn execute(
    config: &AppConfig,
    shape2d: String,
    shape3d: String,
    count: u32,
    forge_proofs: bool,
) -> Result<()> {
    let setup = DemoSetup {
        name: config.name().to_string(),
        params: config.fhe().param_set(),
        keying: config.category_keying(),
        trusted_signers: config.trusted_signers()?,
        oracle_signer: signer_or_ephemeral(config)?,
        forge_proofs,
    };
    let report = run(setup, &shape2d, &shape3d, count).await?;

    for (record_id, state) in &report.records {
        if state.is_decrypted {
            println!("{record_id}: {} / {}", state.shape2d, state.shape3d);
        } else {
            println!("{record_id}: still encrypted");
        }
    }
    match (&report.category, report.revealed_count) {
        (Some(category), Some(count)) => println!("category '{category}': {count} record(s)"),
        (Some(category), None) => println!("category '{category}': count not revealed"),
        _ => println!("no category was counted"),
    }
    for error in &report.errors {
        println!("error: {:?}: {}", error.err_type, error.message);
    }
    Ok(())
}

/// Submit `count` copies of a record, decrypt them all, then reveal their category count.
pub async fn run(setup: DemoSetup, shape2d: &str, shape3d: &str, count: u32) -> Result<DemoReport> {
    let params = setup.params.build_arc()?;
    let rng = create_shared_rng_from_entropy();
    let decryptor = FheDecryptor::generate(params, &rng)?;
    let fhe = Arc::new(decryptor.public_fhe(rng));
    let kms = Arc::new(OracleKms::new(decryptor, setup.oracle_signer));

    let mut trusted = setup.trusted_signers;
    trusted.push(kms.address());
    info!("Trusting oracle signers {:?}", trusted);

    let bus = EventBus::<ShapeEvent>::new(EventBusConfig::default()).start();
    SimpleLogger::attach(&setup.name, bus.clone());

    let protocol = DecryptionProtocol::new(fhe.clone(), ProofVerifier::new(trusted), setup.keying);
    let forge_proofs = setup.forge_proofs;
    let controller = DecryptionController::attach(protocol, bus.clone(), |callbacks| {
        let mut oracle = LocalOracle::new(kms, callbacks);
        if forge_proofs {
            oracle = oracle.with_forged_proofs();
        }
        let client: Arc<dyn DecryptionOracle> = Arc::new(LocalOracleClient::new(oracle.start()));
        client
    });

    let mut record_ids = Vec::new();
    for _ in 0..count {
        let record_id = controller
            .send(SubmitShape {
                shape2d: fhe.encrypt_shape(shape2d)?,
                shape3d: fhe.encrypt_shape(shape3d)?,
            })
            .await??;
        controller
            .send(RequestGeometryDecryption { record_id })
            .await??;
        record_ids.push(record_id);
    }

    let all_decrypted = wait_until_decrypted(&controller, &record_ids).await?;

    let mut records = Vec::new();
    for record_id in &record_ids {
        let state = controller
            .send(GetDecryptedGeometry {
                record_id: *record_id,
            })
            .await??;
        records.push((*record_id, state));
    }

    let category = setup.keying.category_for(shape2d, shape3d);
    let mut revealed_count = None;
    match &category {
        Some(category) if all_decrypted && !record_ids.is_empty() => {
            controller
                .send(RequestCategoryCountDecryption {
                    category: category.clone(),
                })
                .await??;
            revealed_count = wait_for_count(&controller, category).await?;
        }
        _ => (),
    }

    let errors = bus.send(GetErrors::<ShapeEvent>::new()).await?;

    Ok(DemoReport {
        records,
        category,
        revealed_count,
        errors,
    })
}

async fn wait_until_decrypted(
    controller: &Addr<DecryptionController>,
    record_ids: &[RecordId],
) -> Result<bool> {
    for _ in 0..POLL_ATTEMPTS {
        let mut pending = 0;
        for record_id in record_ids {
            let status = controller
                .send(GetRecordStatus {
                    record_id: *record_id,
                })
                .await??;
            if status != RecordStatus::Decrypted {
                pending += 1;
            }
        }
        if pending == 0 {
            return Ok(true);
        }
        sleep(POLL_INTERVAL).await;
    }
    Ok(false)
}

async fn wait_for_count(
    controller: &Addr<DecryptionController>,
    category: &Category,
) -> Result<Option<u64>> {
    for _ in 0..POLL_ATTEMPTS {
        let revealed = controller
            .send(GetRevealedCount {
                category: category.clone(),
            })
            .await?
            .context("Category disappeared")?;
        if revealed.is_some() {
            return Ok(revealed);
        }
        sleep(POLL_INTERVAL).await;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_events::ShapeErrorType;
    use cg_fhe::BfvPreset;

    fn setup(forge_proofs: bool) -> DemoSetup {
        DemoSetup {
            name: "test".to_string(),
            params: BfvPreset::InsecureBfv512.param_set(),
            keying: CategoryKeying::Shape3DKind,
            trusted_signers: vec![],
            oracle_signer: PrivateKeySigner::random(),
            forge_proofs,
        }
    }

    #[actix::test]
    async fn demo_reveals_the_category_count() -> Result<()> {
        let report = run(setup(false), "circle:r=1", "sphere:r=1", 3).await?;
        assert_eq!(report.records.len(), 3);
        assert!(report.records.iter().all(|(_, s)| s.is_decrypted));
        assert_eq!(report.category, Some(Category::new("sphere")));
        assert_eq!(report.revealed_count, Some(3));
        assert!(report.errors.is_empty());
        Ok(())
    }

    #[actix::test]
    async fn demo_with_forged_proofs_decrypts_nothing() -> Result<()> {
        let report = run(setup(true), "circle", "sphere", 1).await?;
        assert!(!report.records[0].1.is_decrypted);
        assert_eq!(report.revealed_count, None);
        assert_eq!(
            report.errors.first().map(|e| e.err_type.clone()),
            Some(ShapeErrorType::GeometryCallback)
        );
        Ok(())
    }
}
