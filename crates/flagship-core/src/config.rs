// SPDX-License-Identifier: MIT

//! Registry configuration.
//!
//! [`Config`] is the programmatic entry point: declare flags in order, add
//! an optional environments block, register sources, then hand the whole
//! thing to [`FeatureFlags::wrap`](crate::registry::FeatureFlags::wrap).
//!
//! [`RegistryDoc`] and [`FlagDecl`] are the serialisation-friendly
//! counterparts used by the TOML loader and the WASM bindings.  They are
//! distinct from `Config` so that file formats stay decoupled from the
//! engine's internal representation: a declaration structurally requires a
//! `name`, while `description` and `enabled` stay optional so that their
//! absence is reported by the consistency check, not by serde.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::source::Source;
use crate::types::{EnabledPolicy, Environments, Flag};

// ---------------------------------------------------------------------------
// Config (builder)
// ---------------------------------------------------------------------------

/// Everything a registry is wrapped from: flags in declaration order, an
/// optional environments block, and an ordered list of sources.
///
/// # Examples
///
/// ```rust
/// use flagship_core::config::Config;
/// use flagship_core::types::{Environments, Flag};
///
/// let config = Config::new()
///     .flag("checkout_v2", Flag::new("the redesigned checkout funnel").enabled(true))
///     .flag(
///         "beta_search",
///         Flag::new("search rewrite, per environment")
///             .per_environment([("dev", true), ("qa", false)]),
///     )
///     .environments(Environments::new(["dev", "qa"], "qa"));
/// ```
#[derive(Default)]
pub struct Config {
    pub(crate) flags: Vec<(String, Flag)>,
    pub(crate) environments: Option<Environments>,
    pub(crate) sources: Vec<Box<dyn Source>>,
}

impl Config {
    /// Start an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a flag.  Declaration order is preserved; it determines the
    /// consistency-check order and the [`state`] snapshot order.
    ///
    /// [`state`]: crate::registry::FeatureFlags::state
    pub fn flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        self.flags.push((name.into(), flag));
        self
    }

    /// Set the environments block.
    pub fn environments(mut self, environments: Environments) -> Self {
        self.environments = Some(environments);
        self
    }

    /// Register a source.  Sources are consulted in registration order.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("flags", &self.flags)
            .field("environments", &self.environments)
            .field("sources", &self.sources.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Serialisation DTOs
// ---------------------------------------------------------------------------

/// One flag declaration as it appears in a flag file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDecl {
    /// The registry key.  Required structurally.
    pub name: String,
    /// A few words on what the flag gates.
    #[serde(default)]
    pub description: Option<String>,
    /// Literal boolean or per-environment table.
    #[serde(default)]
    pub enabled: Option<EnabledPolicy>,
    /// Process environment variable consulted by the process-env source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_flag: Option<String>,
}

/// A whole declaration document: the shape of a TOML flag file or of the
/// JSON accepted by the WASM bindings.
///
/// ```toml
/// [[flags]]
/// name = "checkout_v2"
/// description = "the redesigned checkout funnel"
/// enabled = true
///
/// [[flags]]
/// name = "beta_search"
/// description = "search rewrite, per environment"
/// enabled = { dev = true, qa = false }
///
/// [environments]
/// available = ["dev", "qa"]
/// current = "qa"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDoc {
    /// Flag declarations, in file order.
    #[serde(default)]
    pub flags: Vec<FlagDecl>,
    /// Optional environments block.
    #[serde(default)]
    pub environments: Option<Environments>,
}

impl RegistryDoc {
    /// Convert the document into a [`Config`] (without sources; sources are
    /// code and are registered on the builder afterwards).
    pub fn into_config(self) -> Config {
        let mut config = Config::new();
        for decl in self.flags {
            let flag = Flag {
                name: None,
                description: decl.description,
                enabled: decl.enabled,
                environment_flag: decl.environment_flag,
            };
            config = config.flag(decl.name, flag);
        }
        if let Some(environments) = self.environments {
            config = config.environments(environments);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_preserves_declaration_order() {
        let doc: RegistryDoc = serde_json::from_str(
            r#"{
                "flags": [
                    {"name": "first", "description": "a", "enabled": true},
                    {"name": "second", "description": "b", "enabled": false}
                ]
            }"#,
        )
        .unwrap();

        let config = doc.into_config();
        assert_eq!(config.flags[0].0, "first");
        assert_eq!(config.flags[1].0, "second");
    }

    #[test]
    fn doc_tolerates_missing_policy_fields() {
        // The consistency check, not serde, reports these.
        let doc: RegistryDoc =
            serde_json::from_str(r#"{"flags": [{"name": "bare"}]}"#).unwrap();
        let config = doc.into_config();
        assert_eq!(config.flags[0].1.description, None);
        assert_eq!(config.flags[0].1.enabled, None);
    }
}
