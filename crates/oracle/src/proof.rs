// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Callback attestation.
//!
//! The oracle signs `keccak256(abi.encodePacked(uint256 requestId, bytes32 ciphertextDigest,
//! bytes cleartext))` with an EIP-191 personal-message signature. The ciphertext digest is
//! computed by the requester when the request is issued, so a proof only verifies for the
//! exact ciphertexts that were sent under that request id.

use alloy::primitives::{keccak256, Address, Bytes, Signature, B256, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol_types::SolValue;
use anyhow::{anyhow, Result};
use cg_events::RequestId;
use cg_utils::ArcBytes;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error as ThisError;

/// Digest binding a request to the ciphertexts sent with it:
/// `keccak256(abi.encode(bytes[] ciphertexts))`.
pub fn ciphertext_digest(ciphertexts: &[ArcBytes]) -> B256 {
    let encoded = ciphertexts
        .iter()
        .map(|ct| Bytes::copy_from_slice(ct))
        .collect::<Vec<_>>()
        .abi_encode();
    keccak256(&encoded)
}

pub fn proof_digest(request_id: RequestId, ciphertext_digest: &B256, cleartext: &[u8]) -> B256 {
    let encoded = (
        U256::from(request_id.value()),
        *ciphertext_digest,
        Bytes::copy_from_slice(cleartext),
    )
        .abi_encode_packed();
    keccak256(&encoded)
}

/// 65-byte ECDSA signature (r ‖ s ‖ v).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptionProof {
    pub signature: ArcBytes,
}

impl DecryptionProof {
    pub fn sign(
        request_id: RequestId,
        ciphertext_digest: &B256,
        cleartext: &[u8],
        signer: &PrivateKeySigner,
    ) -> Result<Self> {
        let digest = proof_digest(request_id, ciphertext_digest, cleartext);
        let sig = signer
            .sign_message_sync(digest.as_slice())
            .map_err(|e| anyhow!("Failed to sign decryption proof: {e}"))?;
        Ok(Self {
            signature: ArcBytes::from_bytes(sig.as_bytes().to_vec()),
        })
    }

    pub fn recover_signer(
        &self,
        request_id: RequestId,
        ciphertext_digest: &B256,
        cleartext: &[u8],
    ) -> Result<Address, ProofError> {
        let sig = Signature::try_from(&self.signature[..])
            .map_err(|e| ProofError::MalformedSignature(e.to_string()))?;
        let digest = proof_digest(request_id, ciphertext_digest, cleartext);
        sig.recover_address_from_msg(digest.as_slice())
            .map_err(|e| ProofError::Recovery(e.to_string()))
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),
    #[error("Could not recover signer: {0}")]
    Recovery(String),
    #[error("Signer {0} is not a trusted oracle")]
    UntrustedSigner(Address),
}

/// Accepts proofs signed by one of a fixed set of oracle keys.
#[derive(Clone, Debug)]
pub struct ProofVerifier {
    trusted_signers: HashSet<Address>,
}

impl ProofVerifier {
    pub fn new(trusted_signers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            trusted_signers: trusted_signers.into_iter().collect(),
        }
    }

    pub fn trusted_signers(&self) -> &HashSet<Address> {
        &self.trusted_signers
    }

    pub fn verify(
        &self,
        request_id: RequestId,
        ciphertext_digest: &B256,
        cleartext: &[u8],
        proof: &DecryptionProof,
    ) -> Result<Address, ProofError> {
        let signer = proof.recover_signer(request_id, ciphertext_digest, cleartext)?;
        if !self.trusted_signers.contains(&signer) {
            return Err(ProofError::UntrustedSigner(signer));
        }
        Ok(signer)
    }
}
