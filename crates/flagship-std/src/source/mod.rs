// SPDX-License-Identifier: MIT

//! Ready-made [`Source`](flagship_core::Source) implementations.

pub mod process_env;
