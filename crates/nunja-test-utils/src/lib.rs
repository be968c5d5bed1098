// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Nunja integration tests.
//!
//! - [`MoldFixture`] - Temporary module tree with molds, usable as a module locator
//! - [`FixtureLocator`] - Locator resolving dotted modules under a fixture root

pub mod fixture;

pub use fixture::{FixtureLocator, MoldFixture};
