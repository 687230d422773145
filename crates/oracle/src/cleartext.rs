// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::sol_types::SolValue;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
#[error("Malformed cleartext: {0}")]
pub struct CleartextError(String);

/// Geometry cleartext: `abi.encode(string shape2D, string shape3D)`.
pub fn encode_geometry_cleartext(shape2d: &str, shape3d: &str) -> Vec<u8> {
    (shape2d.to_string(), shape3d.to_string()).abi_encode_params()
}

pub fn decode_geometry_cleartext(bytes: &[u8]) -> Result<(String, String), CleartextError> {
    <(String, String)>::abi_decode_params(bytes).map_err(|e| CleartextError(e.to_string()))
}

/// Category count cleartext: `abi.encode(uint64 count)`.
pub fn encode_count_cleartext(count: u64) -> Vec<u8> {
    count.abi_encode()
}

pub fn decode_count_cleartext(bytes: &[u8]) -> Result<u64, CleartextError> {
    u64::abi_decode(bytes).map_err(|e| CleartextError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_cleartext_decodes() {
        let bytes = encode_geometry_cleartext("square:2", "cube:2");
        let (shape2d, shape3d) = decode_geometry_cleartext(&bytes).unwrap();
        assert_eq!(shape2d, "square:2");
        assert_eq!(shape3d, "cube:2");
    }

    #[test]
    fn count_cleartext_is_one_word() {
        let bytes = encode_count_cleartext(3);
        assert_eq!(bytes.len(), 32);
        assert_eq!(decode_count_cleartext(&bytes).unwrap(), 3);
    }

    #[test]
    fn truncated_cleartext_is_rejected() {
        assert!(decode_geometry_cleartext(&[1, 2, 3]).is_err());
        assert!(decode_count_cleartext(&[]).is_err());
    }
}
