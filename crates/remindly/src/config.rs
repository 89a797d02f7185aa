//! Per-invocation context: the loaded config with CLI flag overrides.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

use remindly_config::Config;
use remindly_core::{IdentityStore, PollerConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
}

impl Context {
    /// Load the config file named by `--config` (or the platform default)
    /// and apply `--storage-dir`, `--timeout`, `--output` and `--color`.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = global
            .config
            .clone()
            .unwrap_or_else(remindly_config::config_path);
        let mut config = remindly_config::load_config_from(&config_path)?;

        if let Some(dir) = &global.storage_dir {
            config.storage_dir = Some(dir.clone());
        }
        if let Some(secs) = global.timeout {
            config.timeout = secs;
        }

        let format = global
            .output
            .unwrap_or_else(|| parse_or("defaults.output", &config.defaults.output, OutputFormat::Table));
        let color_mode = global
            .color
            .unwrap_or_else(|| parse_or("defaults.color", &config.defaults.color, ColorMode::Auto));

        Ok(Self {
            config,
            config_path,
            format,
            color: output::should_color(color_mode),
            quiet: global.quiet,
            yes: global.yes,
        })
    }

    pub fn store(&self) -> IdentityStore {
        IdentityStore::new(self.config.storage_dir())
    }

    /// Poller settings with the password resolved through the credential
    /// chain.
    pub fn poller_config(&self) -> Result<PollerConfig, CliError> {
        Ok(self.config.to_poller_config()?)
    }
}

fn parse_or<T: ValueEnum>(key: &str, raw: &str, fallback: T) -> T {
    T::from_str(raw, true).unwrap_or_else(|_| {
        warn!(key, value = raw, "unrecognized config value, using default");
        fallback
    })
}
