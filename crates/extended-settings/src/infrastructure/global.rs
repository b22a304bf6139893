//! Process-wide [`ExtendedConfig`] instance.
//!
//! Exactly one settings store may be constructed per process.  Hosts either
//! call [`init`] early with an explicit [`StorageConfig`], or let the first
//! [`instance`] call build it from the on-disk app config.
//!
//! # Construction guard (for beginners)
//!
//! Both entry points construct while holding `CONSTRUCTION`, and re-check
//! `INSTANCE` once they own it.  A thread that calls [`instance`] while
//! [`init`] is still opening the store therefore waits and then receives
//! the instance `init` published, instead of racing it.  Only a second
//! *completed* construction is rejected with [`InitError::AlreadyInitialized`].
//! A construction that fails publishes nothing, so the host may retry with
//! another config.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::warn;

use crate::infrastructure::extended_config::{ExtendedConfig, InitError};
use crate::infrastructure::storage::config::{load_config, StorageConfig};

static CONSTRUCTION: Mutex<()> = Mutex::new(());
static INSTANCE: OnceLock<ExtendedConfig> = OnceLock::new();

/// Constructs the process-wide instance from `storage`.
///
/// # Errors
///
/// - [`InitError::AlreadyInitialized`] if an instance was already
///   constructed, including by a concurrent [`instance`] call that won.
/// - Any error from [`ExtendedConfig::open`].
pub fn init(storage: &StorageConfig) -> Result<&'static ExtendedConfig, InitError> {
    let _guard = lock_construction();
    if INSTANCE.get().is_some() {
        return Err(InitError::AlreadyInitialized);
    }
    let config = ExtendedConfig::open(storage)?;
    Ok(INSTANCE.get_or_init(|| config))
}

/// Returns the process-wide instance, constructing it on first use from the
/// storage section of the platform app config.
///
/// Blocks while another thread is constructing the instance.
///
/// # Panics
///
/// Panics if the settings store cannot be constructed.  Nothing in the app
/// can run without it.
pub fn instance() -> &'static ExtendedConfig {
    if let Some(config) = INSTANCE.get() {
        return config;
    }

    let _guard = lock_construction();
    if let Some(config) = INSTANCE.get() {
        return config;
    }
    let storage = load_config().map(|cfg| cfg.storage).unwrap_or_else(|e| {
        warn!("Failed to load app config, using default storage location: {e}");
        StorageConfig::default()
    });
    match ExtendedConfig::open(&storage) {
        Ok(config) => INSTANCE.get_or_init(|| config),
        Err(e) => panic!("cannot initialize eXtended settings: {e}"),
    }
}

/// Returns the process-wide instance if it has been constructed.
pub fn get() -> Option<&'static ExtendedConfig> {
    INSTANCE.get()
}

// A panic in `instance` poisons the lock but leaves `INSTANCE` empty, which
// is a consistent state to retry from.
fn lock_construction() -> MutexGuard<'static, ()> {
    CONSTRUCTION.lock().unwrap_or_else(PoisonError::into_inner)
}
