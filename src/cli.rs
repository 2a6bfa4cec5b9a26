//! Command-line options shared by the binaries.
//!
//! Both `picobot` and `tui` take `--config`; each flattens [`ConfigArgs`]
//! into its own `clap::Parser` so the flag is spelled and loaded the same
//! way everywhere.

use std::path::PathBuf;

use clap::Args;

use crate::config::EngineConfig;
use crate::error::ConfigError;

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConfigArgs {
    /// TOML file overriding the built-in tunables
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load the named file, or fall back to the defaults when none was given.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        match &self.config {
            Some(path) => EngineConfig::load(path),
            None => Ok(EngineConfig::default()),
        }
    }
}
