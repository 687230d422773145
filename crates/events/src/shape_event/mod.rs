// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod category_count_decrypted;
mod category_count_requested;
mod decryption_requested;
mod record_decrypted;
mod record_submitted;
mod shape_error;

pub use category_count_decrypted::*;
pub use category_count_requested::*;
pub use decryption_requested::*;
pub use record_decrypted::*;
pub use record_submitted::*;
pub use shape_error::*;

use crate::{Category, ErrorEvent, Event, EventId, RecordId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to help define From traits for ShapeEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for ShapeEvent {
                fn from(data: $variant) -> Self {
                    ShapeEvent::$variant {
                        id: EventId::from_payload(stringify!($variant), &data),
                        data,
                    }
                }
            }
        )*
    };
}

/// Every notification the ledger publishes.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum ShapeEvent {
    RecordSubmitted {
        id: EventId,
        data: RecordSubmitted,
    },
    DecryptionRequested {
        id: EventId,
        data: DecryptionRequested,
    },
    RecordDecrypted {
        id: EventId,
        data: RecordDecrypted,
    },
    CategoryCountRequested {
        id: EventId,
        data: CategoryCountRequested,
    },
    CategoryCountDecrypted {
        id: EventId,
        data: CategoryCountDecrypted,
    },
    ShapeError {
        id: EventId,
        data: ShapeError,
    },
}

impl_from_event!(
    RecordSubmitted,
    DecryptionRequested,
    RecordDecrypted,
    CategoryCountRequested,
    CategoryCountDecrypted,
    ShapeError
);

impl ShapeEvent {
    pub fn get_id(&self) -> EventId {
        match self {
            ShapeEvent::RecordSubmitted { id, .. }
            | ShapeEvent::DecryptionRequested { id, .. }
            | ShapeEvent::RecordDecrypted { id, .. }
            | ShapeEvent::CategoryCountRequested { id, .. }
            | ShapeEvent::CategoryCountDecrypted { id, .. }
            | ShapeEvent::ShapeError { id, .. } => id.clone(),
        }
    }

    pub fn get_record_id(&self) -> Option<RecordId> {
        match self {
            ShapeEvent::RecordSubmitted { data, .. } => Some(data.record_id),
            ShapeEvent::DecryptionRequested { data, .. } => Some(data.record_id),
            ShapeEvent::RecordDecrypted { data, .. } => Some(data.record_id),
            _ => None,
        }
    }

    pub fn get_category(&self) -> Option<&Category> {
        match self {
            ShapeEvent::RecordDecrypted { data, .. } => Some(&data.category),
            ShapeEvent::CategoryCountRequested { data, .. } => Some(&data.category),
            ShapeEvent::CategoryCountDecrypted { data, .. } => Some(&data.category),
            _ => None,
        }
    }

    pub fn get_data(&self) -> String {
        match self {
            ShapeEvent::RecordSubmitted { data, .. } => format!("{}", data),
            ShapeEvent::DecryptionRequested { data, .. } => format!("{}", data),
            ShapeEvent::RecordDecrypted { data, .. } => format!("{}", data),
            ShapeEvent::CategoryCountRequested { data, .. } => format!("{}", data),
            ShapeEvent::CategoryCountDecrypted { data, .. } => format!("{}", data),
            ShapeEvent::ShapeError { data, .. } => format!("{}", data),
        }
    }
}

impl Event for ShapeEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        let s = format!("{:?}", self);
        extract_event_name(&s).to_string()
    }

    fn event_id(&self) -> Self::Id {
        self.get_id()
    }

    // Every failed attempt is reported, including replays of an identical one.
    fn deduplicate(&self) -> bool {
        !matches!(self, ShapeEvent::ShapeError { .. })
    }
}

impl ErrorEvent for ShapeEvent {
    type Error = ShapeError;
    type ErrorType = ShapeErrorType;

    fn as_error(&self) -> Option<&Self::Error> {
        match self {
            ShapeEvent::ShapeError { data, .. } => Some(data),
            _ => None,
        }
    }

    fn from_error(err_type: Self::ErrorType, error: anyhow::Error) -> Self {
        ShapeEvent::from(ShapeError::from_error(err_type, error))
    }
}

impl fmt::Display for ShapeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{}({})", self.event_type(), self.get_data()))
    }
}

fn extract_event_name(s: &str) -> &str {
    let bytes = s.as_bytes();
    for (i, &item) in bytes.iter().enumerate() {
        if item == b' ' || item == b'(' {
            return &s[..i];
        }
    }
    s
}
