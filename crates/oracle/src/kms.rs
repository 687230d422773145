// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    ciphertext_digest, encode_count_cleartext, encode_geometry_cleartext, CallbackSelector,
    DecryptionProof, OracleCallback,
};
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Result};
use cg_events::RequestId;
use cg_fhe::FheDecryptor;
use cg_utils::ArcBytes;

/// Key material of a decryption oracle: the FHE secret key and the attestation key.
pub struct OracleKms {
    decryptor: FheDecryptor,
    signer: PrivateKeySigner,
}

impl OracleKms {
    pub fn new(decryptor: FheDecryptor, signer: PrivateKeySigner) -> Self {
        Self { decryptor, signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn decryptor(&self) -> &FheDecryptor {
        &self.decryptor
    }

    /// Decrypt the ciphertexts of a request and attest the result.
    pub fn respond(
        &self,
        request_id: RequestId,
        ciphertexts: &[ArcBytes],
        selector: CallbackSelector,
    ) -> Result<OracleCallback> {
        let cleartext = match selector {
            CallbackSelector::Geometry => {
                let [shape2d, shape3d] = ciphertexts else {
                    bail!(
                        "Geometry decryption expects 2 ciphertexts, got {}",
                        ciphertexts.len()
                    );
                };
                encode_geometry_cleartext(
                    &self.decryptor.decrypt_shape(shape2d)?,
                    &self.decryptor.decrypt_shape(shape3d)?,
                )
            }
            CallbackSelector::CategoryCount => {
                let [count] = ciphertexts else {
                    bail!(
                        "Category count decryption expects 1 ciphertext, got {}",
                        ciphertexts.len()
                    );
                };
                encode_count_cleartext(self.decryptor.decrypt_u64(count)?)
            }
        };

        let proof = self.attest(request_id, &ciphertext_digest(ciphertexts), &cleartext)?;

        Ok(OracleCallback {
            selector,
            request_id,
            cleartext: ArcBytes::from_bytes(cleartext),
            proof,
        })
    }

    pub fn attest(
        &self,
        request_id: RequestId,
        ciphertext_digest: &B256,
        cleartext: &[u8],
    ) -> Result<DecryptionProof> {
        DecryptionProof::sign(request_id, ciphertext_digest, cleartext, &self.signer)
    }
}
