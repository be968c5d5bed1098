// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the seams of the registry.
//!
//! Module location and resource walking are host concerns; the registry only
//! depends on these traits so a host can plug in its own discovery. Consumers
//! (the rendering layer) depend on [`PathResolver`].

pub mod locator;
pub mod resolver;
pub mod walker;

pub use locator::ModuleLocator;
pub use resolver::PathResolver;
pub use walker::{NameFn, ResourceWalker};
