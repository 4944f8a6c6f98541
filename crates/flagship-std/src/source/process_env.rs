// SPDX-License-Identifier: MIT

//! Flag activation through process environment variables.

use flagship_core::{Flag, Source};

/// A [`Source`] that enables flags from process environment variables.
///
/// A flag opts in by declaring an `environment_flag` naming the variable to
/// read.  The flag counts as enabled when that variable is set to `"1"` or
/// `"true"` (exactly, case-sensitive).  Any other value, an unset variable,
/// or a flag with no `environment_flag` all resolve to `false`, leaving the
/// decision to the remaining sources.
///
/// # Example
///
/// ```rust
/// use flagship_core::{Config, Environments, FeatureFlags, Flag};
/// use flagship_std::ProcessEnvSource;
///
/// std::env::set_var("HOLIDAY_BANNER", "1");
///
/// let features = FeatureFlags::wrap(
///     Config::new()
///         .flag(
///             "holiday_banner",
///             Flag::new("seasonal landing page banner")
///                 .per_environment([("dev", true)])
///                 .environment_flag("HOLIDAY_BANNER"),
///         )
///         .environments(Environments::new(["dev", "production"], "production"))
///         .source(ProcessEnvSource),
/// )
/// .unwrap();
///
/// assert!(features.is_enabled("holiday_banner").unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvSource;

impl Source for ProcessEnvSource {
    fn is_enabled(&self, flag: &Flag) -> bool {
        let Some(variable) = flag.environment_flag.as_deref() else {
            return false;
        };
        matches!(std::env::var(variable).as_deref(), Ok("1") | Ok("true"))
    }
}
