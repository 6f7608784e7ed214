// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `scriv` front end as a library.
//!
//! The binary is a thin wrapper over [`run::run_lifecycle`]. Embedders that
//! bring their own module loader call [`run::run_lifecycle_with`] instead;
//! plugin crates linked into the binary register their config modules with
//! [`scriv_plugin::submit_config_module!`].

pub mod list;
pub mod run;
