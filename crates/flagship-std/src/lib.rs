// SPDX-License-Identifier: MIT

//! # flagship-std
//!
//! `std`-only collaborators for `flagship-core`.
//!
//! This crate provides [`ProcessEnvSource`], a [`Source`] implementation
//! that turns flags on from process environment variables, and the
//! [`report`] module, which renders a `state()` snapshot as a text table.
//! Both live outside the core so that the engine itself stays `no_std`.
//!
//! ## Quick Start
//!
//! ```rust
//! use flagship_core::{Config, Environments, FeatureFlags, Flag};
//! use flagship_std::{report, ProcessEnvSource};
//!
//! let features = FeatureFlags::wrap(
//!     Config::new()
//!         .flag(
//!             "really_cool_feature",
//!             Flag::new("activated via a process variable")
//!                 .per_environment([("dev", true)])
//!                 .environment_flag("REALLY_COOL_FEATURE"),
//!         )
//!         .environments(Environments::new(["dev", "qa"], "qa"))
//!         .source(ProcessEnvSource),
//! )
//! .expect("flag configuration is consistent");
//!
//! println!("{}", report::summary(&features.state()));
//! ```
//!
//! [`Source`]: flagship_core::Source

pub mod report;
pub mod source;

pub use source::process_env::ProcessEnvSource;
