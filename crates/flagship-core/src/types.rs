// SPDX-License-Identifier: MIT

//! Shared data types used across the flag engine.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so flag declarations can be loaded from TOML or
//! JSON and snapshots can cross the WASM boundary without conversion steps.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enablement policy
// ---------------------------------------------------------------------------

/// The declared enablement policy of a flag.
///
/// Either a fixed boolean or a mapping from environment name to boolean.
/// The union is `#[serde(untagged)]` so that `enabled = true` and
/// `enabled = { dev = true }` both deserialise directly from a flag file.
///
/// # Examples
///
/// ```rust
/// use flagship_core::types::EnabledPolicy;
///
/// let literal: EnabledPolicy = serde_json::from_str("true").unwrap();
/// assert_eq!(literal, EnabledPolicy::Literal(true));
///
/// let mapped: EnabledPolicy = serde_json::from_str(r#"{"dev": true}"#).unwrap();
/// assert!(matches!(mapped, EnabledPolicy::PerEnvironment(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnabledPolicy {
    /// A fixed boolean.  A literal is always the final answer for the flag:
    /// `Literal(false)` is never overridden by a source.
    Literal(bool),
    /// Environment name to boolean.  An environment missing from the map
    /// leaves the flag undetermined there, which falls through to sources.
    PerEnvironment(HashMap<String, bool>),
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// A single declared feature flag.
///
/// `description` and `enabled` are optional at construction so that their
/// absence can be reported by the wrap-time consistency check as a
/// configuration defect ([`FlagError::MissingDescription`] /
/// [`FlagError::MissingEnabled`]) rather than a parse failure.  A flag inside
/// a wrapped registry always has both.
///
/// [`FlagError::MissingDescription`]: crate::error::FlagError::MissingDescription
/// [`FlagError::MissingEnabled`]: crate::error::FlagError::MissingEnabled
///
/// # Examples
///
/// ```rust
/// use flagship_core::types::Flag;
///
/// let flag = Flag::new("the redesigned checkout funnel").enabled(true);
/// assert_eq!(flag.description.as_deref(), Some("the redesigned checkout funnel"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// The flag's registry key.  Stamped by the registry during wrap so that
    /// sources can identify the flag; not required at construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A few words on what the flag gates, for fellow engineers.
    #[serde(default)]
    pub description: Option<String>,

    /// The declared enablement policy.
    #[serde(default)]
    pub enabled: Option<EnabledPolicy>,

    /// Name of the process environment variable consulted by the
    /// process-env source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_flag: Option<String>,
}

impl Flag {
    /// Create a flag declaration with the given description and no policy.
    ///
    /// The consistency check rejects a flag left in this state; chain
    /// [`enabled`](Self::enabled) or [`per_environment`](Self::per_environment).
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: Some(description.into()),
            enabled: None,
            environment_flag: None,
        }
    }

    /// Pin the flag to a literal boolean.
    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = Some(EnabledPolicy::Literal(value));
        self
    }

    /// Give the flag a per-environment policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flagship_core::types::Flag;
    ///
    /// let flag = Flag::new("only on in development")
    ///     .per_environment([("dev", true), ("qa", false)]);
    /// ```
    pub fn per_environment<K, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, bool)>,
    {
        let map = entries
            .into_iter()
            .map(|(env, value)| (env.into(), value))
            .collect();
        self.enabled = Some(EnabledPolicy::PerEnvironment(map));
        self
    }

    /// Name the process environment variable that the process-env source
    /// should consult for this flag.
    pub fn environment_flag(mut self, variable: impl Into<String>) -> Self {
        self.environment_flag = Some(variable.into());
        self
    }

    /// The flag's name, or `""` before the registry has stamped it.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Environments
// ---------------------------------------------------------------------------

/// The environments block of a registry configuration.
///
/// Optional at the registry level: a registry with only literal flags needs
/// none.  A registry with any per-environment flag must have one, and every
/// environment a flag mentions must appear in `available`.
///
/// # Examples
///
/// ```rust
/// use flagship_core::types::Environments;
///
/// let environments = Environments::new(["dev", "qa"], "qa");
/// assert_eq!(environments.current, "qa");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environments {
    /// The environment names the application knows about.
    pub available: Vec<String>,
    /// The environment the process is currently running in.
    pub current: String,
}

impl Environments {
    /// Build an environments block from the available names and the current one.
    pub fn new<K, I>(available: I, current: impl Into<String>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            current: current.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots and override records
// ---------------------------------------------------------------------------

/// One row of a [`state`](crate::registry::FeatureFlags::state) snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagState {
    /// The flag's registry key.
    pub name: String,
    /// The resolved boolean at snapshot time (sources included).
    pub enabled: bool,
    /// The declared description.
    pub description: String,
}

/// A pending test-box override that has not been rolled back yet.
///
/// Records are appended in override order and replayed in that order by
/// `reset`, so a flag's final value is an explicit function of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// The overridden flag's name.
    pub flag: String,
    /// The resolved boolean captured immediately before the override.
    pub original_value: bool,
}
