// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ProtocolError, ProtocolResult};
use alloy::primitives::B256;
use cg_events::{Category, RecordId, RequestId};
use cg_oracle::CallbackSelector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display};

/// What an oracle request was issued for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Geometry(RecordId),
    CategoryCount(Category),
}

impl Subject {
    pub fn selector(&self) -> CallbackSelector {
        match self {
            Subject::Geometry(_) => CallbackSelector::Geometry,
            Subject::CategoryCount(_) => CallbackSelector::CategoryCount,
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Geometry(id) => write!(f, "geometry of {id}"),
            Subject::CategoryCount(category) => write!(f, "count of '{category}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub subject: Subject,
    /// Digest of the exact ciphertexts sent to the oracle.
    pub ciphertext_digest: B256,
    pub issued_at: i64,
    pub answered: bool,
}

/// Maps oracle request ids to the subject they were issued for. Answered entries are kept so
/// that a replayed callback can still be told apart from one the oracle never issued.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: HashMap<RequestId, PendingRequest>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request_id: RequestId, request: PendingRequest) -> ProtocolResult<()> {
        if self.entries.contains_key(&request_id) {
            return Err(ProtocolError::DuplicateRequest(request_id));
        }
        self.entries.insert(request_id, request);
        Ok(())
    }

    pub fn get(&self, request_id: RequestId) -> Option<&PendingRequest> {
        self.entries.get(&request_id)
    }

    /// Mark a request as answered. It no longer counts as outstanding.
    pub fn complete(&mut self, request_id: RequestId) -> ProtocolResult<()> {
        let entry = self
            .entries
            .get_mut(&request_id)
            .ok_or(ProtocolError::InvalidRequest(request_id))?;
        entry.answered = true;
        Ok(())
    }

    /// Outstanding request ids for a subject, oldest first.
    pub fn pending_for(&self, subject: &Subject) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self
            .entries
            .iter()
            .filter(|(_, req)| !req.answered && &req.subject == subject)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
