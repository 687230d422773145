// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{decode_shape, Fhe, SharedRng};
use anyhow::{anyhow, Context, Result};
use fhe::bfv::{BfvParameters, Ciphertext, Encoding, PublicKey, SecretKey};
use fhe_traits::{DeserializeParametrized, FheDecoder, FheDecrypter, Serialize};
use std::sync::Arc;

/// Holder of the BFV secret key. Only the decryption oracle owns one of these.
pub struct FheDecryptor {
    params: Arc<BfvParameters>,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl FheDecryptor {
    pub fn generate(params: Arc<BfvParameters>, rng: &SharedRng) -> Result<Self> {
        let mut rng = rng.lock().map_err(|_| anyhow!("FHE rng lock poisoned"))?;
        let secret_key = SecretKey::random(&params, &mut *rng);
        let public_key = PublicKey::new(&secret_key, &mut *rng);
        Ok(Self {
            params,
            secret_key,
            public_key,
        })
    }

    pub fn params(&self) -> &Arc<BfvParameters> {
        &self.params
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes()
    }

    /// Build the public-only adaptor matching this key.
    pub fn public_fhe(&self, rng: SharedRng) -> Fhe {
        Fhe::new(self.params.clone(), self.public_key.clone(), rng)
    }

    pub fn decrypt_shape(&self, ciphertext: &[u8]) -> Result<String> {
        let coefficients = self.decrypt_coefficients(ciphertext)?;
        Ok(decode_shape(&coefficients)?)
    }

    pub fn decrypt_u64(&self, ciphertext: &[u8]) -> Result<u64> {
        let coefficients = self.decrypt_coefficients(ciphertext)?;
        coefficients
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Decrypted plaintext has no coefficients"))
    }

    fn decrypt_coefficients(&self, ciphertext: &[u8]) -> Result<Vec<u64>> {
        let ct = Ciphertext::from_bytes(ciphertext, &self.params)
            .context("Error deserializing ciphertext")?;
        let pt = self
            .secret_key
            .try_decrypt(&ct)
            .map_err(|e| anyhow!("Error decrypting ciphertext: {e}"))?;
        Vec::<u64>::try_decode(&pt, Encoding::poly())
            .map_err(|e| anyhow!("Error decoding plaintext: {e}"))
    }
}
