// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, Result};
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error as ThisError;

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

pub fn create_shared_rng_from_u64(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed)))
}

pub fn create_shared_rng_from_entropy() -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::from_entropy()))
}

/// Named BFV parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BfvPreset {
    /// Degree 2048 with a single 54 bit ciphertext modulus. Shapes up to 2047 bytes.
    #[default]
    Bfv2048,
    /// Degree 512. Small and fast, only for tests and demos.
    InsecureBfv512,
}

#[derive(ThisError, Debug)]
pub enum PresetError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl BfvPreset {
    pub fn name(&self) -> &'static str {
        match self {
            BfvPreset::Bfv2048 => "bfv-2048",
            BfvPreset::InsecureBfv512 => "insecure-bfv-512",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, PresetError> {
        match name {
            "bfv-2048" => Ok(BfvPreset::Bfv2048),
            "insecure-bfv-512" => Ok(BfvPreset::InsecureBfv512),
            other => Err(PresetError::UnknownPreset(other.to_string())),
        }
    }

    pub fn param_set(&self) -> BfvParamSet {
        match self {
            BfvPreset::Bfv2048 => BfvParamSet {
                degree: 2048,
                plaintext_modulus: 1032193,
                moduli: vec![0x3FFFFFFF000001],
            },
            BfvPreset::InsecureBfv512 => BfvParamSet {
                degree: 512,
                plaintext_modulus: 1032193,
                moduli: vec![0x3FFFFFFF000001],
            },
        }
    }
}

/// Concrete values needed to construct `BfvParameters`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BfvParamSet {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: Vec<u64>,
}

impl BfvParamSet {
    pub fn build_arc(&self) -> Result<Arc<BfvParameters>> {
        build_bfv_params_arc(self.degree, self.plaintext_modulus, &self.moduli)
    }
}

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
) -> Result<Arc<BfvParameters>> {
    BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .build_arc()
        .map_err(|e| anyhow!("Failed to build BFV parameters: {e}"))
}
