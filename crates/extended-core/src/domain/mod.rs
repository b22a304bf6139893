//! Domain entities for eXtended.
//!
//! This module contains pure definitions with no infrastructure dependencies.
//! The settings table is closed at build time: adding a setting means adding
//! an enum variant and a matching definition row, never registering one at
//! runtime.

/// The closed set of boolean settings and their immutable definitions.
///
/// See [`setting::Setting`] for the shipped set.
pub mod setting;
