// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use cg_utils::ArcBytes;

/// The homomorphic arithmetic the ledger relies on. Handles are serialized ciphertexts;
/// nothing implementing this trait can read a plaintext back.
pub trait HeEngine: Send + Sync {
    /// Encrypt a public constant.
    fn wrap_constant(&self, value: u32) -> Result<ArcBytes>;
    /// Homomorphically add two ciphertexts.
    fn add(&self, lhs: &ArcBytes, rhs: &ArcBytes) -> Result<ArcBytes>;
    /// Whether the handle holds a ciphertext this engine can operate on.
    fn is_initialized(&self, ciphertext: &ArcBytes) -> bool;
    /// Bytes to ship to the decryption oracle.
    fn to_transport_form(&self, ciphertext: &ArcBytes) -> ArcBytes;
}
