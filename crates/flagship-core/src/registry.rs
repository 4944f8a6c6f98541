// SPDX-License-Identifier: MIT

//! The flag registry handle and the enablement resolver.
//!
//! [`FeatureFlags::wrap`] runs the consistency check over a [`Config`] and
//! returns the registry handle.  Every query and scoping operation routes
//! through the resolver, which evaluates in a fixed short-circuit order:
//!
//! 1. Literal policy — a `Literal(v)` flag returns `v`.  An explicit `false`
//!    is final: a flag pinned by a literal is fully determined by that
//!    literal and never falls through to sources.
//! 2. Per-environment policy — the current environment's entry, when one
//!    exists.  A missing entry (or a missing environments block) leaves the
//!    flag undetermined.
//! 3. Sources, in declaration order, first `true` wins.
//! 4. `false`.
//!
//! There is no configurable precedence and no locking: the handle is an
//! explicit owned value the caller threads through, and scoped mutation is
//! meant for the single-threaded "toggle around a call, then restore"
//! pattern.
//!
//! ## Quick start
//!
//! ```rust
//! use flagship_core::config::Config;
//! use flagship_core::registry::FeatureFlags;
//! use flagship_core::types::{Environments, Flag};
//!
//! let features = FeatureFlags::wrap(
//!     Config::new()
//!         .flag("checkout_v2", Flag::new("the redesigned checkout funnel").enabled(true))
//!         .flag(
//!             "beta_search",
//!             Flag::new("search rewrite").per_environment([("dev", true), ("qa", false)]),
//!         )
//!         .environments(Environments::new(["dev", "qa"], "qa")),
//! )?;
//!
//! assert!(features.is_enabled("checkout_v2")?);
//! assert!(!features.is_enabled("beta_search")?);
//! # Ok::<(), flagship_core::error::FlagError>(())
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;

use crate::config::Config;
use crate::error::FlagError;
use crate::source::Source;
use crate::types::{EnabledPolicy, Environments, Flag, FlagState};

/// The wrapped registry: the sole owner and mutator of flag state.
pub struct FeatureFlags {
    /// Flags in declaration order, names stamped.
    flags: Vec<Flag>,
    /// Flag name to position in `flags`.
    index: HashMap<String, usize>,
    environments: Option<Environments>,
    sources: Vec<Box<dyn Source>>,
}

impl FeatureFlags {
    /// Validate a configuration and wrap it into a registry handle.
    ///
    /// The consistency check walks flags in declaration order and stops at
    /// the first violation; on failure no registry is returned at all.
    ///
    /// # Errors
    ///
    /// * [`FlagError::MissingDescription`] — a flag has no description.
    /// * [`FlagError::MissingEnabled`] — a flag has no enabled policy.
    /// * [`FlagError::MissingEnvironmentConfig`] — a per-environment flag
    ///   exists but no environments block is configured.
    /// * [`FlagError::UnknownEnvironment`] — a per-environment flag mentions
    ///   an environment missing from `environments.available`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flagship_core::config::Config;
    /// use flagship_core::error::FlagError;
    /// use flagship_core::registry::FeatureFlags;
    /// use flagship_core::types::Flag;
    ///
    /// let config = Config::new().flag("undescribed", Flag::default().enabled(true));
    /// assert_eq!(
    ///     FeatureFlags::wrap(config).unwrap_err(),
    ///     FlagError::MissingDescription("undescribed".into()),
    /// );
    /// ```
    pub fn wrap(config: Config) -> Result<Self, FlagError> {
        check_consistency(&config.flags, config.environments.as_ref())?;

        let Config {
            flags,
            environments,
            sources,
        } = config;

        let mut stamped = Vec::with_capacity(flags.len());
        let mut index = HashMap::with_capacity(flags.len());
        for (name, mut flag) in flags {
            // Stamp the registry key into the flag so sources can identify
            // it.  Idempotent and cosmetic.
            flag.name = Some(name.clone());
            index.insert(name, stamped.len());
            stamped.push(flag);
        }

        Ok(Self {
            flags: stamped,
            index,
            environments,
            sources,
        })
    }

    /// Resolve a flag to its current boolean.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.  A
    /// panicking source is not caught.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flagship_core::config::Config;
    /// use flagship_core::registry::FeatureFlags;
    /// use flagship_core::types::Flag;
    ///
    /// let features = FeatureFlags::wrap(
    ///     Config::new().flag("dark_mode", Flag::new("dark theme").enabled(true)),
    /// )?;
    ///
    /// assert!(features.is_enabled("dark_mode")?);
    /// assert!(features.is_enabled("dork_mode").is_err());
    /// # Ok::<(), flagship_core::error::FlagError>(())
    /// ```
    pub fn is_enabled(&self, name: &str) -> Result<bool, FlagError> {
        let flag = self.get(name)?;
        Ok(self.resolve(flag))
    }

    /// Snapshot every flag's name, resolved value, and description.
    ///
    /// Rows appear in declaration order.  Resolution goes through the full
    /// resolver, sources included, so the snapshot reflects what callers of
    /// [`is_enabled`](Self::is_enabled) would see right now.
    pub fn state(&self) -> Vec<FlagState> {
        self.flags
            .iter()
            .map(|flag| FlagState {
                name: String::from(flag.name()),
                enabled: self.resolve(flag),
                description: flag.description.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// Look up a declared flag.
    pub(crate) fn get(&self, name: &str) -> Result<&Flag, FlagError> {
        self.index
            .get(name)
            .map(|position| &self.flags[*position])
            .ok_or_else(|| FlagError::UnknownFlag(String::from(name)))
    }

    /// Overwrite a flag's policy.  Only the scope manager calls this, and
    /// only ever with a `Literal` value.  Missing names are ignored; every
    /// caller has already resolved the flag through [`is_enabled`].
    ///
    /// [`is_enabled`]: Self::is_enabled
    pub(crate) fn force_policy(&mut self, name: &str, policy: EnabledPolicy) {
        if let Some(position) = self.index.get(name) {
            self.flags[*position].enabled = Some(policy);
        }
    }

    /// The fixed resolution order: literal or environment layer, then
    /// sources, then default false.
    fn resolve(&self, flag: &Flag) -> bool {
        if let Some(value) = self.hard_enabled(flag) {
            return value;
        }
        if self.sources.iter().any(|source| source.is_enabled(flag)) {
            return true;
        }
        false
    }

    /// The determined part of a flag's policy: a literal, or the current
    /// environment's entry.  `None` means undetermined, which is the only
    /// case that falls through to sources.
    fn hard_enabled(&self, flag: &Flag) -> Option<bool> {
        match &flag.enabled {
            Some(EnabledPolicy::Literal(value)) => Some(*value),
            Some(EnabledPolicy::PerEnvironment(map)) => {
                let environments = self.environments.as_ref()?;
                map.get(&environments.current).copied()
            }
            // Unreachable for a wrapped registry; treated as undetermined
            // to keep the resolver total.
            None => None,
        }
    }
}

impl fmt::Debug for FeatureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFlags")
            .field("flags", &self.flags)
            .field("environments", &self.environments)
            .field("sources", &self.sources.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Consistency check
// ---------------------------------------------------------------------------

/// Validate declared flags against the fixed rule set, in declaration
/// order, failing fast on the first violation.  A registry that passes is
/// guaranteed resolvable without further validation.
fn check_consistency(
    flags: &[(String, Flag)],
    environments: Option<&Environments>,
) -> Result<(), FlagError> {
    for (name, flag) in flags {
        if flag.description.is_none() {
            return Err(FlagError::MissingDescription(name.clone()));
        }

        let Some(policy) = &flag.enabled else {
            return Err(FlagError::MissingEnabled(name.clone()));
        };

        if let EnabledPolicy::PerEnvironment(map) = policy {
            let Some(environments) = environments else {
                return Err(FlagError::MissingEnvironmentConfig);
            };
            for environment in map.keys() {
                if !environments.available.contains(environment) {
                    return Err(FlagError::UnknownEnvironment {
                        flag: name.clone(),
                        environment: environment.clone(),
                        available: environments.available.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use alloc::vec;

    fn fixture() -> FeatureFlags {
        FeatureFlags::wrap(
            Config::new()
                .flag(
                    "dynamic_contact_form",
                    Flag::new("fills in contacts from the current account").enabled(true),
                )
                .flag(
                    "disabled_feature",
                    Flag::new("in progress, kept off").enabled(false),
                )
                .flag(
                    "cool_feature",
                    Flag::new("on in dev only").per_environment([("dev", true), ("qa", false)]),
                )
                .environments(Environments::new(["dev", "qa"], "qa")),
        )
        .unwrap()
    }

    #[test]
    fn literal_flags_resolve_to_their_value() {
        let features = fixture();
        assert!(features.is_enabled("dynamic_contact_form").unwrap());
        assert!(!features.is_enabled("disabled_feature").unwrap());
    }

    #[test]
    fn unknown_flags_are_reported_by_name() {
        let features = fixture();
        assert_eq!(
            features.is_enabled("unknown_feature").unwrap_err(),
            FlagError::UnknownFlag("unknown_feature".into()),
        );
    }

    #[test]
    fn per_environment_flags_follow_the_current_environment() {
        let features = fixture();
        // qa is configured false for cool_feature.
        assert!(!features.is_enabled("cool_feature").unwrap());

        let dev_features = FeatureFlags::wrap(
            Config::new()
                .flag(
                    "cool_feature",
                    Flag::new("on in dev only").per_environment([("dev", true), ("qa", false)]),
                )
                .environments(Environments::new(["dev", "qa"], "dev")),
        )
        .unwrap();
        assert!(dev_features.is_enabled("cool_feature").unwrap());
    }

    #[test]
    fn an_environment_false_does_not_fall_through_to_sources() {
        let features = FeatureFlags::wrap(
            Config::new()
                .flag(
                    "cool_feature",
                    Flag::new("off in qa").per_environment([("dev", true), ("qa", false)]),
                )
                .environments(Environments::new(["dev", "qa"], "qa"))
                .source(|_: &Flag| true),
        )
        .unwrap();

        // The qa entry exists and says false; the always-on source must not
        // be consulted.
        assert!(!features.is_enabled("cool_feature").unwrap());
    }

    #[test]
    fn a_literal_false_is_final_even_with_a_matching_source() {
        let features = FeatureFlags::wrap(
            Config::new()
                .flag("pinned_off", Flag::new("explicitly pinned off").enabled(false))
                .source(|flag: &Flag| flag.name() == "pinned_off"),
        )
        .unwrap();

        assert!(!features.is_enabled("pinned_off").unwrap());
    }

    #[test]
    fn undetermined_flags_consult_sources_in_order() {
        let naive_source = |flag: &Flag| flag.name() == "from_the_naive_source";

        struct ComplexSource;
        impl Source for ComplexSource {
            fn is_enabled(&self, flag: &Flag) -> bool {
                flag.name() == "from_the_complex_source"
            }
        }

        let features = FeatureFlags::wrap(
            Config::new()
                .flag(
                    "from_the_naive_source",
                    Flag::new("enabled by a plain predicate").per_environment([("dev", true)]),
                )
                .flag(
                    "from_the_complex_source",
                    Flag::new("enabled by a capability object")
                        .per_environment([("dev", true)]),
                )
                .environments(Environments::new(["dev", "qa"], "qa"))
                .source(naive_source)
                .source(ComplexSource),
        )
        .unwrap();

        // Neither flag has a qa entry, so both are undetermined and fall
        // through to the sources, which match by name.
        assert!(features.is_enabled("from_the_naive_source").unwrap());
        assert!(features.is_enabled("from_the_complex_source").unwrap());
    }

    #[test]
    fn undetermined_flags_default_to_false_without_sources() {
        let features = FeatureFlags::wrap(
            Config::new()
                .flag(
                    "undetermined",
                    Flag::new("no qa entry").per_environment([("dev", true)]),
                )
                .environments(Environments::new(["dev", "qa"], "qa")),
        )
        .unwrap();

        assert!(!features.is_enabled("undetermined").unwrap());
    }

    #[test]
    fn sources_see_the_stamped_name_and_metadata() {
        let features = FeatureFlags::wrap(
            Config::new()
                .flag(
                    "really_cool_feature",
                    Flag::new("activated externally")
                        .per_environment([("dev", true)])
                        .environment_flag("THIS_IS_THE_FLAG"),
                )
                .environments(Environments::new(["dev", "qa"], "qa"))
                .source(|flag: &Flag| {
                    flag.name() == "really_cool_feature"
                        && flag.environment_flag.as_deref() == Some("THIS_IS_THE_FLAG")
                }),
        )
        .unwrap();

        assert!(features.is_enabled("really_cool_feature").unwrap());
    }

    #[test]
    fn wrap_rejects_a_flag_without_a_description() {
        let config = Config::new().flag("has_no_description", Flag::default().enabled(true));
        assert_eq!(
            FeatureFlags::wrap(config).unwrap_err(),
            FlagError::MissingDescription("has_no_description".into()),
        );
    }

    #[test]
    fn wrap_rejects_a_flag_without_a_policy() {
        let config = Config::new().flag("is_it_enabled", Flag::new("really on?"));
        assert_eq!(
            FeatureFlags::wrap(config).unwrap_err(),
            FlagError::MissingEnabled("is_it_enabled".into()),
        );
    }

    #[test]
    fn wrap_rejects_per_environment_flags_without_an_environments_block() {
        let config = Config::new().flag(
            "anything",
            Flag::new("we do not know dev yet").per_environment([("dev", true)]),
        );
        assert_eq!(
            FeatureFlags::wrap(config).unwrap_err(),
            FlagError::MissingEnvironmentConfig,
        );
    }

    #[test]
    fn wrap_rejects_unknown_environment_names() {
        let config = Config::new()
            .flag(
                "anything",
                Flag::new("odd is not a known environment").per_environment([("odd", true)]),
            )
            .environments(Environments::new(["dev"], "dev"));
        assert_eq!(
            FeatureFlags::wrap(config).unwrap_err(),
            FlagError::UnknownEnvironment {
                flag: "anything".into(),
                environment: "odd".into(),
                available: vec!["dev".into()],
            },
        );
    }

    #[test]
    fn wrap_reports_the_first_violation_in_declaration_order() {
        let config = Config::new()
            .flag("first_broken", Flag::default().enabled(true))
            .flag("second_broken", Flag::new("described but no policy"));
        assert_eq!(
            FeatureFlags::wrap(config).unwrap_err(),
            FlagError::MissingDescription("first_broken".into()),
        );
    }

    #[test]
    fn state_reports_every_flag_with_resolved_values() {
        let features = fixture();
        let state = features.state();

        assert_eq!(state.len(), 3);
        assert_eq!(
            state[0],
            FlagState {
                name: "dynamic_contact_form".into(),
                enabled: true,
                description: "fills in contacts from the current account".into(),
            }
        );
        assert_eq!(state[1].name, "disabled_feature");
        assert!(!state[1].enabled);
        // cool_feature resolves through the qa entry.
        assert_eq!(state[2].name, "cool_feature");
        assert!(!state[2].enabled);
    }
}
