// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Scriv integration tests.
//!
//! Provides in-memory plugin fixtures and capture helpers so lifecycle
//! behaviour can be tested without installed distributions.
//!
//! # Components
//!
//! - [`PluginFixture`] - Builder for registrations plus their config modules
//! - [`CallLog`] - Shared record of which hook ran, in order
//! - [`SharedBuffer`] - Clonable writer for capturing host diagnostics

pub mod capture;
pub mod fixture;
pub mod recording;

pub use capture::SharedBuffer;
pub use fixture::{write_index_record, PluginFixture, TEST_GROUP};
pub use recording::{recording_hooks, Call, CallLog};
