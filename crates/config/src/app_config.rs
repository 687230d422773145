// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use crate::validation::{ValidAddress, ValidPrivateKey};
use crate::yaml::load_yaml_with_env;
use alloy_primitives::{Address, B256};
use anyhow::{bail, Context, Result};
use cg_fhe::{BfvParamSet, BfvPreset};
use cg_ledger::CategoryKeying;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::info;

pub const DEFAULT_CONFIG_NAME: &str = "cgeo.config.yaml";
pub const ENV_PREFIX: &str = "CGEO_";

/// BFV parameters. Explicit `params` take precedence over the named preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FheConfig {
    #[serde(default)]
    pub preset: BfvPreset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BfvParamSet>,
}

impl FheConfig {
    pub fn param_set(&self) -> BfvParamSet {
        self.params
            .clone()
            .unwrap_or_else(|| self.preset.param_set())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Addresses whose decryption proofs are accepted.
    #[serde(default)]
    pub trusted_signers: Vec<String>,
    /// Signing key of the in-process oracle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    name: String,
    #[serde(default)]
    fhe: FheConfig,
    #[serde(default)]
    oracle: OracleConfig,
    #[serde(default)]
    category_keying: CategoryKeying,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    found_config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "cgeo".to_string(),
            fhe: FheConfig::default(),
            oracle: OracleConfig::default(),
            category_keying: CategoryKeying::default(),
            found_config_file: None,
        }
    }
}

impl AppConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fhe(&self) -> &FheConfig {
        &self.fhe
    }

    pub fn category_keying(&self) -> CategoryKeying {
        self.category_keying
    }

    pub fn found_config_file(&self) -> Option<&Path> {
        self.found_config_file.as_deref()
    }

    pub fn trusted_signers(&self) -> Result<Vec<Address>> {
        self.oracle
            .trusted_signers
            .iter()
            .map(|s| -> Result<Address> { Ok(s.parse::<ValidAddress>()?.into()) })
            .collect()
    }

    pub fn oracle_private_key(&self) -> Result<Option<B256>> {
        self.oracle
            .private_key
            .as_deref()
            .map(|key| -> Result<B256> { Ok(key.parse::<ValidPrivateKey>()?.into()) })
            .transpose()
    }

    /// Copy of the config that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.oracle.private_key.is_some() {
            config.oracle.private_key = Some("<redacted>".to_string());
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.trusted_signers()
            .context("oracle.trusted_signers contains an invalid address")?;
        self.oracle_private_key()
            .context("oracle.private_key is invalid")?;

        let params = self.fhe.param_set();
        if params.plaintext_modulus <= 255 {
            bail!(
                "fhe plaintext modulus must exceed 255 to hold shape bytes, got {}",
                params.plaintext_modulus
            );
        }
        if params.moduli.is_empty() {
            bail!("fhe moduli must not be empty");
        }
        Ok(())
    }
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    pub found_config_file: Option<PathBuf>,
}

/// Load the config at `config_file` or, failing that, the first `cgeo.config.yaml` found from
/// the working directory upwards, then the OS config dir. Only an explicitly given file must
/// exist. `CGEO_` prefixed variables override file values, with `__` separating nested keys.
pub fn load_config(config_file: Option<&str>) -> Result<AppConfig> {
    let resolved = resolve_config_path(
        find_in_parent,
        &env::current_dir()?,
        &OsDirs::config_dir()?,
        DEFAULT_CONFIG_NAME,
        config_file.map(Path::new),
    );

    let loaded_yaml = if resolved.explicit || resolved.path.exists() {
        load_yaml_with_env(&resolved.path).context("Configuration file not found")?
    } else {
        info!(
            "No configuration found at {}, using defaults",
            resolved.path.display()
        );
        String::new()
    };

    let found_config_file = resolved.path.exists().then_some(resolved.path);

    let config: AppConfig = Figment::from(Serialized::defaults(&AppConfig::default()))
        .merge(Yaml::string(&loaded_yaml))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(&CliOverrides { found_config_file }))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    Ok(config)
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("cgeo needs an OS that can provide a config dir")?
            .join("cgeo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const SIGNER: &str = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0";

    #[test]
    fn test_deserialization() -> Result<()> {
        let config: AppConfig = Figment::from(Serialized::defaults(&AppConfig::default()))
            .merge(Yaml::string(&format!(
                r#"
name: shapes
fhe:
  params:
    degree: 1024
    plaintext_modulus: 65537
    moduli: [0x3FFFFFFF000001]
oracle:
  trusted_signers: ["{SIGNER}"]
category_keying: shape3d_kind
"#
            )))
            .extract()?;

        assert_eq!(config.name(), "shapes");
        assert_eq!(config.fhe().param_set().degree, 1024);
        assert_eq!(config.category_keying(), CategoryKeying::Shape3DKind);
        assert_eq!(config.trusted_signers()?, vec![SIGNER.parse::<Address>()?]);
        assert_eq!(config.oracle_private_key()?, None);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = AppConfig::default();
        assert_eq!(config.fhe().param_set(), BfvPreset::Bfv2048.param_set());
        assert_eq!(config.category_keying(), CategoryKeying::Shape3D);
        assert!(config.trusted_signers()?.is_empty());
        config.validate()
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.fhe.params = Some(BfvParamSet {
            degree: 1024,
            plaintext_modulus: 17,
            moduli: vec![0x3FFFFFFF000001],
        });
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.oracle.trusted_signers = vec!["0xnothex".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.oracle.private_key = Some("0x1234".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted() {
        let mut config = AppConfig::default();
        config.oracle.private_key = Some(format!("0x{}", "11".repeat(32)));
        let printable = serde_yaml::to_string(&config.redacted()).unwrap();
        assert!(printable.contains("<redacted>"));
        assert!(!printable.contains("1111"));
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some("/nope/cgeo.config.yaml")) else {
            bail!("error expected");
        };
        assert!(err.downcast_ref::<std::io::Error>().is_some());
        Ok(())
    }

    #[test]
    fn test_config_file_and_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CGEO_TEST_KEY", format!("0x{}", "22".repeat(32)));
            jail.create_file(
                DEFAULT_CONFIG_NAME,
                &format!(
                    r#"
name: from-file
oracle:
  trusted_signers: ["{SIGNER}"]
  private_key: $CGEO_TEST_KEY
"#
                ),
            )?;
            jail.create_dir("nested")?;
            jail.change_dir("nested")?;

            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.name(), "from-file");
            assert_eq!(
                config.oracle_private_key().map_err(|e| e.to_string())?,
                Some(B256::repeat_byte(0x22))
            );
            assert!(config.found_config_file().is_some());
            assert_eq!(config.category_keying(), CategoryKeying::Shape3D);

            jail.set_env("CGEO_CATEGORY_KEYING", "shape2d");
            jail.set_env("CGEO_FHE__PRESET", "insecure-bfv-512");
            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.category_keying(), CategoryKeying::Shape2D);
            assert_eq!(config.fhe().preset, BfvPreset::InsecureBfv512);

            Ok(())
        });
    }
}
