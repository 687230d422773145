// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ProtocolError, ProtocolResult};
use cg_events::RecordId;
use cg_utils::ArcBytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A submission as it was received. Never changes after `submit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub id: RecordId,
    pub shape2d: ArcBytes,
    pub shape3d: ArcBytes,
    pub submitted_at: i64,
}

/// Plaintext side of a record. Empty until the oracle has delivered a verified cleartext.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionState {
    pub shape2d: String,
    pub shape3d: String,
    pub is_decrypted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Submitted,
    DecryptionRequested,
    Decrypted,
}

#[derive(Clone, Debug)]
struct StoredRecord {
    encrypted: EncryptedRecord,
    state: DecryptionState,
}

#[derive(Debug)]
pub struct RecordStore {
    last_id: u64,
    records: HashMap<RecordId, StoredRecord>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            last_id: 0,
            records: HashMap::new(),
        }
    }

    /// Store a new record together with its empty decryption state. Ids start at 1.
    pub fn submit(&mut self, shape2d: ArcBytes, shape3d: ArcBytes) -> (RecordId, i64) {
        self.last_id += 1;
        let id = RecordId::new(self.last_id);
        let submitted_at = Utc::now().timestamp();
        self.records.insert(
            id,
            StoredRecord {
                encrypted: EncryptedRecord {
                    id,
                    shape2d,
                    shape3d,
                    submitted_at,
                },
                state: DecryptionState::default(),
            },
        );
        (id, submitted_at)
    }

    pub fn get_encrypted(&self, id: RecordId) -> ProtocolResult<&EncryptedRecord> {
        self.get(id).map(|r| &r.encrypted)
    }

    pub fn get_decryption_state(&self, id: RecordId) -> ProtocolResult<&DecryptionState> {
        self.get(id).map(|r| &r.state)
    }

    /// One-way transition to decrypted. A second write is refused, as is an empty plaintext.
    pub fn set_decrypted(
        &mut self,
        id: RecordId,
        shape2d: String,
        shape3d: String,
    ) -> ProtocolResult<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(ProtocolError::RecordNotFound(id))?;
        if record.state.is_decrypted {
            return Err(ProtocolError::AlreadyDecrypted(id));
        }
        if shape2d.is_empty() || shape3d.is_empty() {
            return Err(ProtocolError::InvalidCleartext(format!(
                "decrypted geometry of {id} has an empty shape"
            )));
        }
        record.state = DecryptionState {
            shape2d,
            shape3d,
            is_decrypted: true,
        };
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn get(&self, id: RecordId) -> ProtocolResult<&StoredRecord> {
        self.records.get(&id).ok_or(ProtocolError::RecordNotFound(id))
    }
}
