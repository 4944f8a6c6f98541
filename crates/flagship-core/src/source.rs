// SPDX-License-Identifier: MIT

//! The source protocol: pluggable runtime enablement providers.
//!
//! A [`Source`] is consulted only when a flag's literal/environment layer is
//! undetermined (a per-environment policy with no entry for the current
//! environment).  Sources are evaluated in declaration order and the first
//! one to return `true` wins.
//!
//! The contract is deliberately small: a source inspects the flag (its name
//! and declared metadata) and returns a boolean.  It must return `false` for
//! flags it does not recognise rather than fail.  A source that panics is
//! not caught; that indicates a configuration or integration bug which must
//! surface at the `is_enabled` call site.
//!
//! # Implementing `Source`
//!
//! Any `Fn(&Flag) -> bool` closure is a source.  For providers that carry
//! state, implement the trait directly:
//!
//! ```rust
//! use flagship_core::source::Source;
//! use flagship_core::types::Flag;
//!
//! struct AllowList(Vec<String>);
//!
//! impl Source for AllowList {
//!     fn is_enabled(&self, flag: &Flag) -> bool {
//!         self.0.iter().any(|name| name == flag.name())
//!     }
//! }
//! ```

use crate::types::Flag;

/// A runtime enablement provider.
///
/// Implementations MUST be `Send + Sync` so a registry can be shared behind
/// [`SharedFeatureFlags`](crate::shared::SharedFeatureFlags).
pub trait Source: Send + Sync {
    /// Whether this source turns the given flag on.
    ///
    /// Must return `false` for flags the source does not recognise.
    fn is_enabled(&self, flag: &Flag) -> bool;
}

// Plain predicates are the other accepted source shape.  Adapting them here,
// at the trait boundary, keeps every call site monomorphic on `dyn Source`.
impl<F> Source for F
where
    F: Fn(&Flag) -> bool + Send + Sync,
{
    fn is_enabled(&self, flag: &Flag) -> bool {
        self(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sources() {
        let source = |flag: &Flag| flag.name() == "wanted";
        let mut flag = Flag::new("a flag");
        flag.name = Some("wanted".into());
        assert!(Source::is_enabled(&source, &flag));

        flag.name = Some("unwanted".into());
        assert!(!Source::is_enabled(&source, &flag));
    }
}
