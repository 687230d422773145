// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    CategoryAggregator, CategoryKeying, CorrelationTable, DecryptionState, PendingRequest,
    ProtocolError, ProtocolResult, RecordStatus, RecordStore, Subject,
};
use alloy::primitives::B256;
use cg_events::{Category, RecordId, RequestId};
use cg_fhe::HeEngine;
use cg_oracle::{
    ciphertext_digest, decode_count_cleartext, decode_geometry_cleartext, CallbackSelector,
    DecryptionProof, ProofVerifier,
};
use cg_utils::ArcBytes;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything needed to send one decryption request to the oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub subject: Subject,
    pub ciphertexts: Vec<ArcBytes>,
    pub ciphertext_digest: B256,
}

impl PreparedRequest {
    fn new(subject: Subject, ciphertexts: Vec<ArcBytes>) -> Self {
        let ciphertext_digest = ciphertext_digest(&ciphertexts);
        Self {
            subject,
            ciphertexts,
            ciphertext_digest,
        }
    }

    pub fn selector(&self) -> CallbackSelector {
        self.subject.selector()
    }
}

/// Synchronous core of the decryption protocol.
///
/// Owns the record store, the correlation table and the category counters. Sending requests
/// to the oracle is left to the caller: `prepare_*` yields what must be sent and
/// `register_request` records the id the oracle answered with. Callbacks are verified in
/// full before anything is written, so every failing operation leaves the state as it was.
pub struct DecryptionProtocol {
    records: RecordStore,
    correlation: CorrelationTable,
    categories: CategoryAggregator,
    engine: Arc<dyn HeEngine>,
    verifier: ProofVerifier,
    keying: CategoryKeying,
}

impl DecryptionProtocol {
    pub fn new(engine: Arc<dyn HeEngine>, verifier: ProofVerifier, keying: CategoryKeying) -> Self {
        Self {
            records: RecordStore::new(),
            correlation: CorrelationTable::new(),
            categories: CategoryAggregator::new(),
            engine,
            verifier,
            keying,
        }
    }

    pub fn submit(
        &mut self,
        shape2d: ArcBytes,
        shape3d: ArcBytes,
    ) -> ProtocolResult<(RecordId, i64)> {
        if !self.engine.is_initialized(&shape2d) || !self.engine.is_initialized(&shape3d) {
            return Err(ProtocolError::Engine(
                "submitted shape is not an initialized ciphertext".to_string(),
            ));
        }
        let (record_id, submitted_at) = self.records.submit(shape2d, shape3d);
        info!("Stored {record_id}");
        Ok((record_id, submitted_at))
    }

    /// Gather the two shape ciphertexts of a record that has not been decrypted yet.
    pub fn prepare_geometry_decryption(
        &self,
        record_id: RecordId,
    ) -> ProtocolResult<PreparedRequest> {
        if self.records.get_decryption_state(record_id)?.is_decrypted {
            return Err(ProtocolError::AlreadyDecrypted(record_id));
        }
        let record = self.records.get_encrypted(record_id)?;
        let ciphertexts = vec![
            self.engine.to_transport_form(&record.shape2d),
            self.engine.to_transport_form(&record.shape3d),
        ];
        Ok(PreparedRequest::new(Subject::Geometry(record_id), ciphertexts))
    }

    pub fn prepare_category_count_decryption(
        &self,
        category: &Category,
    ) -> ProtocolResult<PreparedRequest> {
        let counter = self.categories.encrypted_count(category)?;
        Ok(PreparedRequest::new(
            Subject::CategoryCount(category.clone()),
            vec![self.engine.to_transport_form(counter)],
        ))
    }

    /// Remember which subject an oracle request id belongs to.
    pub fn register_request(
        &mut self,
        request_id: RequestId,
        subject: Subject,
        ciphertext_digest: B256,
    ) -> ProtocolResult<()> {
        self.correlation.insert(
            request_id,
            PendingRequest {
                subject,
                ciphertext_digest,
                issued_at: Utc::now().timestamp(),
                answered: false,
            },
        )
    }

    /// Apply a geometry callback: verify, store the plaintext shapes and count the record
    /// under its category.
    pub fn apply_geometry_callback(
        &mut self,
        request_id: RequestId,
        cleartext: &[u8],
        proof: &DecryptionProof,
    ) -> ProtocolResult<(RecordId, Category)> {
        let pending = self
            .correlation
            .get(request_id)
            .ok_or(ProtocolError::InvalidRequest(request_id))?;
        let Subject::Geometry(record_id) = pending.subject else {
            return Err(ProtocolError::InvalidRequest(request_id));
        };

        if self.records.get_decryption_state(record_id)?.is_decrypted {
            warn!("Ignoring callback {request_id}: {record_id} is already decrypted");
            return Err(ProtocolError::AlreadyDecrypted(record_id));
        }

        self.verifier
            .verify(request_id, &pending.ciphertext_digest, cleartext, proof)?;

        let (shape2d, shape3d) = decode_geometry_cleartext(cleartext)?;
        let category = self.keying.category_for(&shape2d, &shape3d).ok_or_else(|| {
            ProtocolError::InvalidCleartext(format!("no category can be derived for {record_id}"))
        })?;
        let counter = self
            .categories
            .incremented(&category, self.engine.as_ref())?;

        self.records.set_decrypted(record_id, shape2d, shape3d)?;
        self.categories.store(&category, counter);
        self.correlation.complete(request_id)?;

        info!("Decrypted {record_id} into category '{category}'");
        Ok((record_id, category))
    }

    /// Apply a category count callback. The returned count is the one this request
    /// decrypted; the count kept for later queries only moves forward, see
    /// [`CategoryAggregator::record_revealed`].
    pub fn apply_category_count_callback(
        &mut self,
        request_id: RequestId,
        cleartext: &[u8],
        proof: &DecryptionProof,
    ) -> ProtocolResult<(Category, u64)> {
        let pending = self
            .correlation
            .get(request_id)
            .filter(|p| !p.answered)
            .ok_or(ProtocolError::InvalidRequest(request_id))?;
        let Subject::CategoryCount(category) = &pending.subject else {
            return Err(ProtocolError::InvalidRequest(request_id));
        };
        let category = category.clone();

        self.verifier
            .verify(request_id, &pending.ciphertext_digest, cleartext, proof)?;
        let count = decode_count_cleartext(cleartext)?;

        let newest = self
            .categories
            .record_revealed(&category, request_id, count)?;
        self.correlation.complete(request_id)?;

        if newest {
            info!("Category '{category}' revealed a count of {count}");
        } else {
            info!("Category '{category}' revealed a stale count of {count} for {request_id}");
        }
        Ok((category, count))
    }

    pub fn decrypted_geometry(&self, record_id: RecordId) -> ProtocolResult<DecryptionState> {
        self.records.get_decryption_state(record_id).cloned()
    }

    pub fn encrypted_count(&self, category: &Category) -> ProtocolResult<ArcBytes> {
        self.categories.encrypted_count(category).cloned()
    }

    pub fn revealed_count(&self, category: &Category) -> ProtocolResult<Option<u64>> {
        self.categories.revealed_count(category)
    }

    pub fn record_status(&self, record_id: RecordId) -> ProtocolResult<RecordStatus> {
        if self.records.get_decryption_state(record_id)?.is_decrypted {
            return Ok(RecordStatus::Decrypted);
        }
        if self
            .correlation
            .pending_for(&Subject::Geometry(record_id))
            .is_empty()
        {
            Ok(RecordStatus::Submitted)
        } else {
            Ok(RecordStatus::DecryptionRequested)
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.categories()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn correlation(&self) -> &CorrelationTable {
        &self.correlation
    }
}
