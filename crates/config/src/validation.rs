// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{Address, B256};
use anyhow::Context;
use std::str::FromStr;

/// A hex encoded, checksum agnostic account address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidAddress(Address);

impl FromStr for ValidAddress {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidAddress(
            Address::from_str(s.trim()).with_context(|| format!("Invalid address '{s}'"))?,
        ))
    }
}

impl From<ValidAddress> for Address {
    fn from(value: ValidAddress) -> Self {
        value.0
    }
}

/// A 32 byte hex encoded secp256k1 secret.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ValidPrivateKey(B256);

impl FromStr for ValidPrivateKey {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = B256::from_str(s.trim()).context("Private key must be 32 hex encoded bytes")?;
        if key == B256::ZERO {
            anyhow::bail!("Private key must not be zero");
        }
        Ok(ValidPrivateKey(key))
    }
}

impl From<ValidPrivateKey> for B256 {
    fn from(value: ValidPrivateKey) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses() {
        let addr: Address = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
            .parse::<ValidAddress>()
            .unwrap()
            .into();
        assert_eq!(
            addr.to_string(),
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
        );
        assert!("0x1234".parse::<ValidAddress>().is_err());
    }

    #[test]
    fn test_private_keys() {
        assert!(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse::<ValidPrivateKey>()
                .is_ok()
        );
        assert!(format!("0x{}", "00".repeat(32))
            .parse::<ValidPrivateKey>()
            .is_err());
        assert!("not a key".parse::<ValidPrivateKey>().is_err());
    }
}
