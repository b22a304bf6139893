//! Application layer for eXtended settings.
//!
//! Code here orchestrates domain definitions against the store port.  It
//! depends on the `KeyValueStore` trait, never on SQLite or the file system,
//! so every use case runs against `MemoryStore` in tests.
//!
//! # Sub-modules
//!
//! - **`registry`** – Owns the current value of every setting, seeds defaults
//!   into the store at startup, toggles and persists values, and fans changes
//!   out to subscribed listeners.
//!
//! - **`settings_screen`** – Describes the settings screen as a flat list of
//!   typed items and maps clicked item identifiers to actions through one
//!   immutable dispatch table.

pub mod registry;
pub mod settings_screen;
