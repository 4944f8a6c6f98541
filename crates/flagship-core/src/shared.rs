// SPDX-License-Identifier: MIT

//! Shared registry handle with suspend-capable scoped toggles.
//!
//! This module is only compiled when the `async` feature flag is enabled:
//!
//! ```toml
//! [dependencies]
//! flagship-core = { version = "0.1", features = ["async"] }
//! ```
//!
//! # Design
//!
//! [`SharedFeatureFlags`] is a clonable handle around an
//! `Arc<Mutex<FeatureFlags>>`.  The lock is a synchronous [`std::sync::Mutex`]
//! and is never held across an await: queries lock briefly, and the scoped
//! toggles apply the override, release the lock, await the operation, and
//! restore through a drop guard.
//!
//! The guard is the whole point.  Restoration must run no matter how the
//! suspended operation completes — normal return, panic, or cancellation
//! (the future being dropped mid-await) — and `Drop` is the one place the
//! language guarantees that.  An async lock cannot be acquired inside
//! `Drop`, which is why the shared handle does not use one.
//!
//! # Example
//!
//! ```rust
//! use flagship_core::config::Config;
//! use flagship_core::shared::SharedFeatureFlags;
//! use flagship_core::types::Flag;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), flagship_core::error::FlagError> {
//! let features = SharedFeatureFlags::wrap(
//!     Config::new().flag("slow_path", Flag::new("fallback behaviour").enabled(false)),
//! )?;
//!
//! let inner = features.clone();
//! let seen = features
//!     .enabling("slow_path", || async move {
//!         inner.is_enabled("slow_path").unwrap()
//!     })
//!     .await?;
//!
//! assert!(seen);
//! assert!(!features.is_enabled("slow_path")?);
//! # Ok(())
//! # }
//! ```

#![cfg(feature = "async")]

use core::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::error::FlagError;
use crate::registry::FeatureFlags;
use crate::types::{ChangeRecord, EnabledPolicy, FlagState};

/// A clonable, thread-safe registry handle for asynchronous callers.
///
/// Clones share the same underlying registry; an override applied through
/// one clone is visible through all of them.
#[derive(Clone)]
pub struct SharedFeatureFlags {
    inner: Arc<Mutex<FeatureFlags>>,
}

impl SharedFeatureFlags {
    /// Validate a configuration and wrap it into a shared handle.
    ///
    /// # Errors
    ///
    /// The same wrap-time errors as [`FeatureFlags::wrap`].
    pub fn wrap(config: Config) -> Result<Self, FlagError> {
        Ok(Self::from_registry(FeatureFlags::wrap(config)?))
    }

    /// Share an already-wrapped registry.
    pub fn from_registry(registry: FeatureFlags) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Resolve a flag to its current boolean.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub fn is_enabled(&self, name: &str) -> Result<bool, FlagError> {
        self.lock().is_enabled(name)
    }

    /// Snapshot every flag's name, resolved value, and description.
    pub fn state(&self) -> Vec<FlagState> {
        self.lock().state()
    }

    /// Pin `name` to `value` for the duration of the awaited `operation`,
    /// then restore the value the flag resolved to at entry.
    ///
    /// Restoration is guaranteed on every completion path: normal return,
    /// panic, and cancellation of the in-flight future.  The flag always
    /// ends up at exactly its pre-scope resolved value.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared; in that
    /// case `operation` is never invoked and nothing is mutated.
    pub async fn with_flag_set_to<T, F, Fut>(
        &self,
        name: &str,
        value: bool,
        operation: F,
    ) -> Result<T, FlagError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let original = self.is_enabled(name)?;
        self.lock()
            .force_policy(name, EnabledPolicy::Literal(value));

        let _restore = RestoreOnDrop {
            inner: Arc::clone(&self.inner),
            name: String::from(name),
            original,
        };

        Ok(operation().await)
    }

    /// Run the awaited `operation` with `name` enabled, restoring afterwards.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub async fn enabling<T, F, Fut>(&self, name: &str, operation: F) -> Result<T, FlagError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.with_flag_set_to(name, true, operation).await
    }

    /// Run the awaited `operation` with `name` disabled, restoring afterwards.
    ///
    /// # Errors
    ///
    /// [`FlagError::UnknownFlag`] when `name` was never declared.
    pub async fn disabling<T, F, Fut>(&self, name: &str, operation: F) -> Result<T, FlagError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.with_flag_set_to(name, false, operation).await
    }

    /// Open a multi-flag override box backed by this handle.
    ///
    /// Unlike [`FeatureFlags::test_box`] the shared box does not borrow the
    /// registry, so queries can keep flowing through other clones while the
    /// box is open.
    pub fn test_box(&self) -> SharedTestBox {
        SharedTestBox {
            flags: self.clone(),
            changed: Vec::new(),
        }
    }

    /// Acquire the registry lock.  A poisoned lock only means another
    /// thread panicked while toggling; the flag map itself is still sound,
    /// and the restore guard must be able to run during unwinding, so the
    /// poison is stripped rather than propagated.
    fn lock(&self) -> MutexGuard<'_, FeatureFlags> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores a flag's captured value when dropped.
struct RestoreOnDrop {
    inner: Arc<Mutex<FeatureFlags>>,
    name: String,
    original: bool,
}

impl Drop for RestoreOnDrop {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .force_policy(&self.name, EnabledPolicy::Literal(self.original));
    }
}

/// The shared-handle counterpart of [`crate::scope::TestBox`].
///
/// Same contract: overrides are recorded with the value resolved at
/// override time, [`reset`](Self::reset) replays them in recorded order and
/// clears them, a flag overridden twice keeps only its earliest record, and
/// nothing resets automatically on drop.
pub struct SharedTestBox {
    flags: SharedFeatureFlags,
    changed: Vec<ChangeRecord>,
}

impl SharedTestBox {
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

    /// Replay the change records in recorded order, then clear them.
    pub fn reset(&mut self) {
        let mut registry = self.flags.lock();
        for record in self.changed.drain(..) {
            registry.force_policy(&record.flag, EnabledPolicy::Literal(record.original_value));
        }
    }

    fn set(&mut self, name: &str, value: bool) -> Result<(), FlagError> {
        let mut registry = self.flags.lock();
        let original = registry.is_enabled(name)?;
        if !self.changed.iter().any(|record| record.flag == name) {
            self.changed.push(ChangeRecord {
                flag: name.into(),
                original_value: original,
            });
        }
        registry.force_policy(name, EnabledPolicy::Literal(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::Flag;

    fn fixture() -> SharedFeatureFlags {
        SharedFeatureFlags::wrap(
            Config::new()
                .flag("enabled_feature", Flag::new("on by default").enabled(true))
                .flag("disabled_feature", Flag::new("off by default").enabled(false)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn enabling_toggles_around_an_async_operation() {
        let features = fixture();

        let inner = features.clone();
        let was_it_enabled = features
            .enabling("disabled_feature", || async move {
                inner.is_enabled("disabled_feature").unwrap()
            })
            .await
            .unwrap();

        assert!(was_it_enabled);
        assert!(!features.is_enabled("disabled_feature").unwrap());
    }

    #[tokio::test]
    async fn disabling_toggles_around_an_async_operation() {
        let features = fixture();

        let inner = features.clone();
        let was_it_enabled = features
            .disabling("enabled_feature", || async move {
                inner.is_enabled("enabled_feature").unwrap()
            })
            .await
            .unwrap();

        assert!(!was_it_enabled);
        assert!(features.is_enabled("enabled_feature").unwrap());
    }

    #[tokio::test]
    async fn restoration_happens_when_the_operation_resolves_to_an_error() {
        let features = fixture();

        let result: Result<Result<(), &str>, FlagError> = features
            .enabling("disabled_feature", || async { Err("downstream failure") })
            .await;

        assert_eq!(result.unwrap(), Err("downstream failure"));
        assert!(!features.is_enabled("disabled_feature").unwrap());
    }

    #[tokio::test]
    async fn restoration_happens_when_the_operation_panics() {
        let features = fixture();

        let scoped = features.clone();
        let task = tokio::spawn(async move {
            scoped
                .enabling("disabled_feature", || async {
                    panic!("this should bubble up");
                })
                .await
        });

        assert!(task.await.is_err());
        assert!(!features.is_enabled("disabled_feature").unwrap());
    }

    #[tokio::test]
    async fn restoration_happens_when_the_operation_is_cancelled() {
        let features = fixture();

        let scoped = features.clone();
        let task = tokio::spawn(async move {
            scoped
                .enabling("disabled_feature", || std::future::pending::<()>())
                .await
        });

        // Wait until the override is visibly in place, then cancel the task
        // while it is suspended.
        while !features.is_enabled("disabled_feature").unwrap() {
            tokio::task::yield_now().await;
        }
        task.abort();
        let _ = task.await;

        assert!(!features.is_enabled("disabled_feature").unwrap());
    }

    #[tokio::test]
    async fn scoping_an_unknown_flag_fails_without_mutating() {
        let features = fixture();

        let result = features
            .enabling("unknown_feature", || async {})
            .await;

        assert_eq!(
            result.unwrap_err(),
            FlagError::UnknownFlag("unknown_feature".into())
        );
    }

    #[tokio::test]
    async fn the_shared_test_box_overrides_and_resets() {
        let features = fixture();

        let mut box_ = features.test_box();
        box_.enable("disabled_feature").unwrap();
        box_.disable("enabled_feature").unwrap();

        // Other clones observe the overrides while the box is open.
        assert!(features.is_enabled("disabled_feature").unwrap());
        assert!(!features.is_enabled("enabled_feature").unwrap());

        box_.reset();

        assert!(!features.is_enabled("disabled_feature").unwrap());
        assert!(features.is_enabled("enabled_feature").unwrap());
    }
}
