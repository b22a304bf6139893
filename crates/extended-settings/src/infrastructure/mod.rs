//! Infrastructure layer for eXtended settings.
//!
//! Contains the OS-facing adapters: the SQLite store, the TOML app config,
//! the process-wide settings facade and the host UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `extended_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod extended_config;
pub mod global;
pub mod storage;
pub mod ui_bridge;
