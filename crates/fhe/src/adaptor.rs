// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{encode_shape, HeEngine, SharedRng};
use anyhow::{anyhow, Context, Result};
use cg_utils::ArcBytes;
use fhe::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey};
use fhe_traits::{DeserializeParametrized, FheEncoder, FheEncrypter, Serialize};
use std::sync::Arc;

/// BFV adaptor holding only public material. Used by the ledger for counter arithmetic
/// and by clients to encrypt their shapes.
#[derive(Clone)]
pub struct Fhe {
    params: Arc<BfvParameters>,
    public_key: PublicKey,
    rng: SharedRng,
}

impl Fhe {
    pub fn new(params: Arc<BfvParameters>, public_key: PublicKey, rng: SharedRng) -> Self {
        Self {
            params,
            public_key,
            rng,
        }
    }

    pub fn from_public_key_bytes(
        params: Arc<BfvParameters>,
        public_key: &[u8],
        rng: SharedRng,
    ) -> Result<Self> {
        let public_key = PublicKey::from_bytes(public_key, &params)
            .map_err(|e| anyhow!("Error deserializing public key: {e}"))?;
        Ok(Self::new(params, public_key, rng))
    }

    pub fn params(&self) -> &Arc<BfvParameters> {
        &self.params
    }

    /// Client side: encrypt a shape description under the public key.
    pub fn encrypt_shape(&self, shape: &str) -> Result<ArcBytes> {
        let coefficients = encode_shape(shape, self.params.degree())?;
        self.encrypt_coefficients(&coefficients)
    }

    fn encrypt_coefficients(&self, input: &Vec<u64>) -> Result<ArcBytes> {
        let pt = Plaintext::try_encode(input, Encoding::poly(), &self.params)
            .map_err(|e| anyhow!("Error encoding plaintext: {e}"))?;
        let ct = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| anyhow!("FHE rng lock poisoned"))?;
            self.public_key
                .try_encrypt(&pt, &mut *rng)
                .map_err(|e| anyhow!("Error encrypting data: {e}"))?
        };
        Ok(ArcBytes::from_bytes(ct.to_bytes()))
    }

    fn ciphertext(&self, bytes: &[u8]) -> Result<Ciphertext> {
        Ciphertext::from_bytes(bytes, &self.params).context("Error deserializing ciphertext")
    }
}

impl HeEngine for Fhe {
    fn wrap_constant(&self, value: u32) -> Result<ArcBytes> {
        let input = vec![value as u64];
        self.encrypt_coefficients(&input)
    }

    fn add(&self, lhs: &ArcBytes, rhs: &ArcBytes) -> Result<ArcBytes> {
        let lhs = self.ciphertext(lhs)?;
        let rhs = self.ciphertext(rhs)?;
        let sum = &lhs + &rhs;
        Ok(ArcBytes::from_bytes(sum.to_bytes()))
    }

    fn is_initialized(&self, ciphertext: &ArcBytes) -> bool {
        !ciphertext.is_empty() && self.ciphertext(ciphertext).is_ok()
    }

    fn to_transport_form(&self, ciphertext: &ArcBytes) -> ArcBytes {
        ciphertext.clone()
    }
}
