//! Config discovery.
//!
//! Lookup order, first hit wins:
//! 1. `--config PATH`
//! 2. `$SAUDIT_CONFIG`
//! 3. `<config dir>/sampleaudit/config.toml` (e.g. `~/.config/sampleaudit/config.toml`)
//! 4. built-in defaults
//!
//! An explicit path (1 or 2) must exist; the user file (3) is optional.

use std::fmt;
use std::path::{Path, PathBuf};

use sampleaudit_recon::ReconConfig;

use crate::CliError;

pub const CONFIG_ENV: &str = "SAUDIT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Env(p) => write!(f, "{} (${CONFIG_ENV})", p.display()),
            Self::UserFile(p) => write!(f, "{}", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: ReconConfig,
    pub source: ConfigSource,
}

impl Settings {
    /// Resolve from the process environment.
    pub fn resolve(flag: Option<&Path>) -> Result<Self, CliError> {
        let env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve_from(flag, env, user_config_path())
    }

    fn resolve_from(
        flag: Option<&Path>,
        env: Option<PathBuf>,
        user_file: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let source = if let Some(p) = flag {
            ConfigSource::Flag(p.to_path_buf())
        } else if let Some(p) = env {
            ConfigSource::Env(p)
        } else {
            match user_file {
                Some(p) if p.is_file() => ConfigSource::UserFile(p),
                _ => ConfigSource::Defaults,
            }
        };

        let config = match &source {
            ConfigSource::Flag(p) | ConfigSource::Env(p) | ConfigSource::UserFile(p) => load_config_file(p)?,
            ConfigSource::Defaults => ReconConfig::default(),
        };

        tracing::debug!("config from {source}");
        Ok(Self { config, source })
    }
}

/// Default per-user config location, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sampleaudit").join("config.toml"))
}

/// Parse and validate one config file.
pub fn load_config_file(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {e}", path.display())))
}
