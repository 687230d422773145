// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cg_events::{Category, RecordId, RequestId};
use cg_oracle::{CleartextError, ProofError};
use thiserror::Error;

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Failures of ledger operations. Every one of them leaves the ledger untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{0} has already been decrypted")]
    AlreadyDecrypted(RecordId),

    #[error("No outstanding decryption request matches {0}")]
    InvalidRequest(RequestId),

    #[error("Decryption proof rejected: {0}")]
    ProofVerificationFailed(String),

    #[error("Category '{0}' has never been registered")]
    CategoryNotFound(Category),

    #[error("{0} does not exist")]
    RecordNotFound(RecordId),

    #[error("Oracle issued {0} more than once")]
    DuplicateRequest(RequestId),

    #[error("Invalid cleartext: {0}")]
    InvalidCleartext(String),

    #[error("Ciphertext engine error: {0}")]
    Engine(String),

    #[error("Decryption oracle error: {0}")]
    Oracle(String),
}

impl From<ProofError> for ProtocolError {
    fn from(value: ProofError) -> Self {
        ProtocolError::ProofVerificationFailed(value.to_string())
    }
}

impl From<CleartextError> for ProtocolError {
    fn from(value: CleartextError) -> Self {
        ProtocolError::InvalidCleartext(value.to_string())
    }
}

impl ProtocolError {
    pub fn engine(err: anyhow::Error) -> Self {
        ProtocolError::Engine(format!("{err:#}"))
    }
}
