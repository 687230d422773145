// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Category, RecordId, RequestId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A record's geometry has been decrypted and folded into its category counter.
/// The plaintext shapes are deliberately not carried on the bus.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct RecordDecrypted {
    pub record_id: RecordId,
    pub request_id: RequestId,
    pub category: Category,
}

impl Display for RecordDecrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record_id: {}, request_id: {}, category: {}",
            self.record_id, self.request_id, self.category
        )
    }
}
