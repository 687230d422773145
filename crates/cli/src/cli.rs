// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{demo, oracle_address, print_config};
use anyhow::Result;
use cg_config::{load_config, AppConfig};
use clap::{command, ArgAction, Parser, Subcommand};
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "cgeo")]
#[command(about = "Submit encrypted shapes and reveal per-category intersection counts through an attested decryption oracle", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `cgeo -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        setup_tracing(self.log_level())?;

        let config = self.load_config()?;
        info!("Config loaded from: {:?}", config.found_config_file());

        match self.command {
            Commands::Demo {
                shape2d,
                shape3d,
                count,
                forge_proofs,
            } => demo::execute(&config, shape2d, shape3d, count, forge_proofs).await?,
            Commands::OracleAddress => oracle_address::execute(&config)?,
            Commands::PrintConfig => print_config::execute(&config)?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(self.config.as_deref())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the whole protocol in process against a local oracle
    Demo {
        /// 2D shape of every submitted record
        #[arg(long)]
        shape2d: String,

        /// 3D shape of every submitted record
        #[arg(long)]
        shape3d: String,

        /// Number of records to submit
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Have the oracle sign with an untrusted key
        #[arg(long)]
        forge_proofs: bool,
    },

    /// Print the address of the configured oracle key
    OracleAddress,

    /// Print the resolved configuration
    PrintConfig,
}
