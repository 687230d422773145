// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::oracle_key::configured_signer;
use anyhow::{Context, Result};
use cg_config::AppConfig;

pub fn execute(config: &AppConfig) -> Result<()> {
    let signer = configured_signer(config)?.context("oracle.private_key is not configured")?;
    println!("{}", signer.address());
    Ok(())
}
