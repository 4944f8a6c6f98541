// SPDX-License-Identifier: MIT

//! # flagship-core
//!
//! Core feature-flag registry and evaluation engine.
//!
//! This crate is `no_std`-compatible (requires `alloc`).  Enable the `std`
//! feature (on by default) to lift that restriction and gain access to
//! standard-library conveniences; the `async` and `config-loader` features
//! build on `std`.
//!
//! ## Architecture
//!
//! ```text
//! FeatureFlags (registry handle)
//!   ├── consistency check — validates declarations once, at wrap time
//!   ├── resolver          — literal → environment → sources → false
//!   ├── scoped toggles    — enabling / disabling with guaranteed restore
//!   └── test box          — batch overrides with explicit reset
//! SharedFeatureFlags ("async" feature)
//!   └── the same registry behind Arc<Mutex<_>>, with suspend-capable toggles
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use flagship_core::{Config, Environments, FeatureFlags, Flag};
//!
//! let mut features = FeatureFlags::wrap(
//!     Config::new()
//!         .flag("checkout_v2", Flag::new("the redesigned checkout funnel").enabled(true))
//!         .flag(
//!             "beta_search",
//!             Flag::new("search rewrite").per_environment([("dev", true), ("qa", false)]),
//!         )
//!         .environments(Environments::new(["dev", "qa"], "dev")),
//! )?;
//!
//! if features.is_enabled("checkout_v2")? {
//!     // take the new code path
//! }
//!
//! // Temporarily force a flag around a call, with guaranteed restore.
//! features.enabling("beta_search", |features| {
//!     assert!(features.is_enabled("beta_search").unwrap());
//! })?;
//! # Ok::<(), flagship_core::FlagError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod config_loader;
pub mod error;
pub mod registry;
pub mod scope;
pub mod shared;
pub mod source;
pub mod types;

// Re-export the most commonly used items at the crate root so consumers can
// write `use flagship_core::FeatureFlags;` instead of the fully qualified
// path.
pub use config::{Config, FlagDecl, RegistryDoc};
pub use error::FlagError;
pub use registry::FeatureFlags;
pub use scope::TestBox;
pub use source::Source;
pub use types::{ChangeRecord, EnabledPolicy, Environments, Flag, FlagState};

#[cfg(feature = "async")]
pub use shared::{SharedFeatureFlags, SharedTestBox};
