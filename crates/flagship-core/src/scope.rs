// SPDX-License-Identifier: MIT

//! Scoped overrides: the single-flag toggle and the multi-flag test box.
//!
//! Both helpers capture a flag's *resolved* boolean (through the full
//! resolver, sources included) before overriding, and both restore by
//! writing `Literal(captured)` back.  Restoration therefore collapses a
//! per-environment flag to a literal equal to whatever it resolved to at
//! entry.  Scoped overrides exist for tests; they need a deterministic
//! single-boolean rollback, not regeneration of the original map.
//!
//! The single-flag toggle restores automatically on every exit path,
//! including unwinding.  The test box never restores automatically: call
//! [`TestBox::reset`] explicitly.

use alloc::vec::Vec;

use crate::error::FlagError;
use crate::registry::FeatureFlags;
use crate::types::{ChangeRecord, EnabledPolicy, FlagState};

// ---------------------------------------------------------------------------
// Single-flag scoped toggle
// ---------------------------------------------------------------------------

/// Restores a flag's captured value when dropped, so the restore runs on
/// normal return and during unwinding alike.
struct RestoreGuard<'a> {
    flags: &'a mut FeatureFlags,
    name: &'a str,
    original: bool,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.flags
            .force_policy(self.name, EnabledPolicy::Literal(self.original));
    }
}

impl FeatureFlags {
    /// Pin `name` to `value` for the duration of `operation`, then restore
    /// the value the flag resolved to at entry.
    ///
    /// The operation receives a shared view of the registry so it can query
    /// flags while the override is in place.  Restoration is guaranteed: it
    /// runs on normal return and when `operation` panics, before the panic
    /// continues unwinding.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared; in that
    /// case `operation` is never invoked and nothing is mutated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flagship_core::config::Config;
    /// use flagship_core::registry::FeatureFlags;
    /// use flagship_core::types::Flag;
    ///
    /// let mut features = FeatureFlags::wrap(
    ///     Config::new().flag("slow_path", Flag::new("fallback behaviour").enabled(false)),
    /// )?;
    ///
    /// let seen = features.with_flag_set_to("slow_path", true, |features| {
    ///     features.is_enabled("slow_path").unwrap()
    /// })?;
    ///
    /// assert!(seen);
    /// assert!(!features.is_enabled("slow_path")?);
    /// # Ok::<(), flagship_core::error::FlagError>(())
    /// ```
    pub fn with_flag_set_to<T, F>(
        &mut self,
        name: &str,
        value: bool,
        operation: F,
    ) -> Result<T, FlagError>
    where
        F: FnOnce(&FeatureFlags) -> T,
    {
        let original = self.is_enabled(name)?;
        self.force_policy(name, EnabledPolicy::Literal(value));

        let guard = RestoreGuard {
            flags: self,
            name,
            original,
        };
        let result = operation(&*guard.flags);
        drop(guard);

        Ok(result)
    }

    /// Run `operation` with `name` enabled, restoring afterwards.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn enabling<T, F>(&mut self, name: &str, operation: F) -> Result<T, FlagError>
    where
        F: FnOnce(&FeatureFlags) -> T,
    {
        self.with_flag_set_to(name, true, operation)
    }

    /// Run `operation` with `name` disabled, restoring afterwards.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn disabling<T, F>(&mut self, name: &str, operation: F) -> Result<T, FlagError>
    where
        F: FnOnce(&FeatureFlags) -> T,
    {
        self.with_flag_set_to(name, false, operation)
    }

    /// Open a multi-flag override box with an empty change record.
    pub fn test_box(&mut self) -> TestBox<'_> {
        TestBox {
            flags: self,
            changed: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Multi-flag test box
// ---------------------------------------------------------------------------

/// A batch override/rollback helper for a whole test scenario.
///
/// `enable` and `disable` record the flag's resolved value and then pin it;
/// [`reset`](Self::reset) replays the records in recorded order and clears
/// them, making a second `reset` a no-op.  Overriding the same flag twice
/// keeps only the first record, so `reset` always returns the flag to its
/// pre-box value rather than compounding overrides.
///
/// The box holds the registry mutably, so queries during the scenario go
/// through the box's [`is_enabled`](Self::is_enabled) /
/// [`state`](Self::state) passthroughs.
///
/// # Examples
///
/// ```rust
/// use flagship_core::config::Config;
/// use flagship_core::registry::FeatureFlags;
/// use flagship_core::types::Flag;
///
/// let mut features = FeatureFlags::wrap(
///     Config::new()
///         .flag("a", Flag::new("off by default").enabled(false))
///         .flag("b", Flag::new("on by default").enabled(true)),
/// )?;
///
/// let mut box_ = features.test_box();
/// box_.enable("a")?;
/// box_.disable("b")?;
/// assert!(box_.is_enabled("a")?);
/// assert!(!box_.is_enabled("b")?);
///
/// box_.reset();
/// assert!(!features.is_enabled("a")?);
/// assert!(features.is_enabled("b")?);
/// # Ok::<(), flagship_core::error::FlagError>(())
/// ```
pub struct TestBox<'a> {
    flags: &'a mut FeatureFlags,
    changed: Vec<ChangeRecord>,
}

impl TestBox<'_> {
    /// Pin `name` on, recording its current resolved value for `reset`.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn enable(&mut self, name: &str) -> Result<(), FlagError> {
        self.set(name, true)
    }

    /// Pin `name` off, recording its current resolved value for `reset`.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn disable(&mut self, name: &str) -> Result<(), FlagError> {
        self.set(name, false)
    }

    /// Replay the change records in recorded order, restoring each flag to
    /// its captured value, then clear the records.
    pub fn reset(&mut self) {
        for record in self.changed.drain(..) {
            self.flags
                .force_policy(&record.flag, EnabledPolicy::Literal(record.original_value));
        }
    }

    /// Query a flag while the box holds the registry.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn is_enabled(&self, name: &str) -> Result<bool, FlagError> {
        self.flags.is_enabled(name)
    }

    /// Snapshot the registry while the box holds it.
    pub fn state(&self) -> Vec<FlagState> {
        self.flags.state()
    }

    /// The overrides recorded since the last `reset`.
    pub fn pending(&self) -> &[ChangeRecord] {
        &self.changed
    }

    fn set(&mut self, name: &str, value: bool) -> Result<(), FlagError> {
        let original = self.flags.is_enabled(name)?;
        // Keep only the earliest record per flag: a second override would
        // otherwise capture the already-overridden value and compound.
        if !self.changed.iter().any(|record| record.flag == name) {
            self.changed.push(ChangeRecord {
                flag: name.into(),
                original_value: original,
            });
        }
        self.flags.force_policy(name, EnabledPolicy::Literal(value));
        Ok(())
    }
}
