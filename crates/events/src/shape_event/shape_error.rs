// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub trait FromError {
    type Error;
    fn from_error(err_type: ShapeErrorType, error: Self::Error) -> Self;
}

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ShapeError {
    pub err_type: ShapeErrorType,
    pub message: String,
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeErrorType {
    Submission,
    DecryptionRequest,
    GeometryCallback,
    CategoryCountCallback,
    Oracle,
}

impl ShapeError {
    pub fn new(err_type: ShapeErrorType, message: &str) -> Self {
        Self {
            err_type,
            message: message.to_string(),
        }
    }
}

impl FromError for ShapeError {
    type Error = anyhow::Error;
    fn from_error(err_type: ShapeErrorType, error: Self::Error) -> Self {
        Self {
            err_type,
            message: error.to_string(),
        }
    }
}
