// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use cg_config::AppConfig;
use tracing::warn;

/// Signer for the configured oracle key.
pub fn configured_signer(config: &AppConfig) -> Result<Option<PrivateKeySigner>> {
    config
        .oracle_private_key()?
        .map(|key| PrivateKeySigner::from_bytes(&key).context("Invalid oracle private key"))
        .transpose()
}

/// Configured signer, or a throwaway one when no key is configured.
pub fn signer_or_ephemeral(config: &AppConfig) -> Result<PrivateKeySigner> {
    Ok(match configured_signer(config)? {
        Some(signer) => signer,
        None => {
            warn!("No oracle.private_key configured, using an ephemeral oracle key");
            PrivateKeySigner::random()
        }
    })
}
