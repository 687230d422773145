// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum ShapeCodecError {
    #[error("Shape is {len} bytes but at most {max} fit in one ciphertext")]
    TooLong { len: usize, max: usize },
    #[error("Shape must not contain NUL bytes")]
    ContainsNul,
    #[error("Shape must not be empty")]
    Empty,
    #[error("Coefficient {0} is not a byte")]
    NotAByte(u64),
    #[error("Decoded shape is not valid UTF-8")]
    InvalidUtf8,
}

/// Lay a shape string out as polynomial coefficients, one UTF-8 byte per coefficient.
/// The remaining coefficients are zero, which terminates the string on decode.
pub fn encode_shape(shape: &str, degree: usize) -> Result<Vec<u64>, ShapeCodecError> {
    let bytes = shape.as_bytes();
    if bytes.is_empty() {
        return Err(ShapeCodecError::Empty);
    }
    let max = degree.saturating_sub(1);
    if bytes.len() > max {
        return Err(ShapeCodecError::TooLong {
            len: bytes.len(),
            max,
        });
    }
    if bytes.contains(&0) {
        return Err(ShapeCodecError::ContainsNul);
    }
    Ok(bytes.iter().map(|b| *b as u64).collect())
}

pub fn decode_shape(coefficients: &[u64]) -> Result<String, ShapeCodecError> {
    let bytes = coefficients
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| u8::try_from(*c).map_err(|_| ShapeCodecError::NotAByte(*c)))
        .collect::<Result<Vec<u8>, _>>()?;
    String::from_utf8(bytes).map_err(|_| ShapeCodecError::InvalidUtf8)
}
