// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use cg_fhe::{create_shared_rng_from_u64, BfvPreset, Fhe, FheDecryptor};
use cg_oracle::OracleKms;
use std::sync::Arc;

/// Deterministic BFV keys on the small insecure preset plus a fresh oracle signer.
pub struct Fixture {
    pub fhe: Arc<Fhe>,
    pub kms: Arc<OracleKms>,
}

impl Fixture {
    pub fn new(seed: u64) -> Result<Self> {
        let rng = create_shared_rng_from_u64(seed);
        let params = BfvPreset::InsecureBfv512.param_set().build_arc()?;
        let decryptor = FheDecryptor::generate(params, &rng)?;
        let fhe = Arc::new(decryptor.public_fhe(rng));
        let kms = Arc::new(OracleKms::new(decryptor, PrivateKeySigner::random()));
        Ok(Self { fhe, kms })
    }
}
