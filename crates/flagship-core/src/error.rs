// SPDX-License-Identifier: MIT

//! Error taxonomy for the flag engine.
//!
//! Configuration defects ([`MissingDescription`], [`MissingEnabled`],
//! [`MissingEnvironmentConfig`], [`UnknownEnvironment`]) are raised exactly
//! once, at wrap time, and abort the wrap entirely: no partially-validated
//! registry is ever returned.  [`UnknownFlag`] is raised at query time for
//! any operation referencing an undeclared flag name.  Source failures are
//! deliberately not represented here; a panicking source propagates to the
//! caller unwrapped, since a misbehaving source is an integration bug that
//! must not be masked as "disabled".
//!
//! [`MissingDescription`]: FlagError::MissingDescription
//! [`MissingEnabled`]: FlagError::MissingEnabled
//! [`MissingEnvironmentConfig`]: FlagError::MissingEnvironmentConfig
//! [`UnknownEnvironment`]: FlagError::UnknownEnvironment
//! [`UnknownFlag`]: FlagError::UnknownFlag

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Everything that can go wrong when wrapping or querying a flag registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// A declared flag has no `description`.
    MissingDescription(String),
    /// A declared flag has no `enabled` policy at all.
    MissingEnabled(String),
    /// A flag uses a per-environment policy but the configuration has no
    /// environments block.
    MissingEnvironmentConfig,
    /// A flag's per-environment policy mentions an environment that is not
    /// listed in `environments.available`.
    UnknownEnvironment {
        /// The offending flag.
        flag: String,
        /// The environment name the flag mentions.
        environment: String,
        /// The environments the configuration actually declares.
        available: Vec<String>,
    },
    /// A query referenced a flag name that was never declared.
    UnknownFlag(String),
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagError::MissingDescription(flag) => write!(
                f,
                "the feature flag '{flag}' has no 'description'; describe a flag in a \
                 few words so fellow engineers do not have to guess"
            ),
            FlagError::MissingEnabled(flag) => write!(
                f,
                "the feature flag '{flag}' has no 'enabled' policy; make the state of \
                 the flag explicit. If you rely on a source to enable it, declare it \
                 with an undetermined per-environment policy"
            ),
            FlagError::MissingEnvironmentConfig => write!(
                f,
                "you need to configure which environments are available to your \
                 application under environments.available so the registry can be \
                 checked for consistency"
            ),
            FlagError::UnknownEnvironment {
                flag,
                environment,
                available,
            } => write!(
                f,
                "the feature flag '{flag}' is configured for environment \
                 '{environment}' which is not listed in environments.available \
                 ({available:?}); check if this is a spelling mistake"
            ),
            FlagError::UnknownFlag(flag) => write!(
                f,
                "there is no feature named '{flag}'; check your flag configuration \
                 for a spelling mistake"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlagError {}
