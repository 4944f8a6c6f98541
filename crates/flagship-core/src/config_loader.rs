// SPDX-License-Identifier: MIT

//! TOML flag-file loading.
//!
//! Behind the `config-loader` feature (which implies `std`).  The loader
//! only parses; the consistency rules still run when the resulting
//! [`Config`] is handed to [`FeatureFlags::wrap`], so a flag file missing a
//! description fails at wrap time with the usual [`FlagError`], not here.
//!
//! # File format
//!
//! ```toml
//! [[flags]]
//! name = "checkout_v2"
//! description = "the redesigned checkout funnel"
//! enabled = true
//!
//! [[flags]]
//! name = "beta_search"
//! description = "search rewrite, per environment"
//! enabled = { dev = true, qa = false }
//!
//! [[flags]]
//! name = "really_cool_feature"
//! description = "activated via a process variable"
//! enabled = { dev = true }
//! environment_flag = "REALLY_COOL_FEATURE"
//!
//! [environments]
//! available = ["dev", "qa"]
//! current = "qa"
//! ```
//!
//! [`FeatureFlags::wrap`]: crate::registry::FeatureFlags::wrap
//! [`FlagError`]: crate::error::FlagError

// Only compile this module when the "config-loader" feature is enabled.
// "config-loader" implies "std", so std facilities are always available here.
#![cfg(feature = "config-loader")]

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::{Config, RegistryDoc};

// ---------------------------------------------------------------------------
// ConfigLoadError
// ---------------------------------------------------------------------------

/// Errors that can occur while reading or parsing a flag file.
///
/// Distinct from [`FlagError`](crate::error::FlagError): these cover the
/// loading glue only, never the consistency rules.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// The flag file could not be read.
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    TomlParse { source: toml::de::Error },
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::FileRead { path, source } => {
                write!(f, "failed to read flag file \"{path}\": {source}")
            }
            ConfigLoadError::TomlParse { source } => {
                write!(f, "failed to parse TOML flag file: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::FileRead { source, .. } => Some(source),
            ConfigLoadError::TomlParse { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load a [`Config`] from a TOML flag file.
///
/// Sources cannot be declared in a file; register them on the returned
/// builder before wrapping.
///
/// # Errors
///
/// Returns a [`ConfigLoadError`] if the file cannot be read or the TOML
/// does not match the [`RegistryDoc`] schema.
///
/// # Example
///
/// ```rust,no_run
/// use flagship_core::config_loader::load_config;
/// use flagship_core::registry::FeatureFlags;
///
/// let config = load_config("flags.toml").unwrap();
/// let features = FeatureFlags::wrap(config).unwrap();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigLoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    from_toml_str(&content)
}

/// Parse a [`Config`] from TOML text.
///
/// # Errors
///
/// Returns [`ConfigLoadError::TomlParse`] if the text does not match the
/// [`RegistryDoc`] schema.
pub fn from_toml_str(content: &str) -> Result<Config, ConfigLoadError> {
    let doc: RegistryDoc =
        toml::from_str(content).map_err(|source| ConfigLoadError::TomlParse { source })?;
    Ok(doc.into_config())
}
