//! Persisted schema version marker and one-shot upgrade steps.
//!
//! The store keeps its layout version under [`VERSION_KEY`].  On every open
//! the marker is compared with [`CURRENT_VERSION`]:
//!
//! ```text
//! stored > current   →  log "downgrading", write current
//! stored < current   →  run steps stored+1 ..= current, writing each version
//! stored == current  →  nothing to do
//! ```
//!
//! A missing or unreadable marker counts as version 0 (a brand-new store).

use std::time::Instant;

use extended_core::{KeyValueStore, StoreError, TypedStore, VERSION_KEY};
use tracing::{error, info};

/// Layout version written by this release.
pub const CURRENT_VERSION: i32 = 1;

/// Step `n` upgrades a store from version `n - 1` to `n`.
type UpgradeStep = fn(&dyn KeyValueStore) -> Result<(), StoreError>;

static UPGRADE_STEPS: [UpgradeStep; CURRENT_VERSION as usize] = [initial_layout];

/// Version 1 is the first layout; nothing to rewrite.
fn initial_layout(_store: &dyn KeyValueStore) -> Result<(), StoreError> {
    Ok(())
}

/// Brings the version marker in `store` up to [`CURRENT_VERSION`].
///
/// Returns the version that was stored before the call (0 for a new store).
///
/// # Errors
///
/// Returns the store's error if an upgrade step or a marker write fails.
/// Earlier steps stay applied; the next open resumes from the last written
/// version.
pub fn migrate(store: &dyn KeyValueStore) -> Result<i32, StoreError> {
    let started = Instant::now();
    let stored = store.get_int(VERSION_KEY, 0).max(0);

    if stored > CURRENT_VERSION {
        error!("Settings schema version {stored} is newer than {CURRENT_VERSION}, downgrading");
        store.put_int(VERSION_KEY, CURRENT_VERSION)?;
    } else {
        for version in (stored + 1)..=CURRENT_VERSION {
            info!("Upgrading settings schema {} -> {version}", version - 1);
            UPGRADE_STEPS[(version - 1) as usize](store)?;
            store.edit().put_int(VERSION_KEY, version).apply()?;
        }
    }

    info!(
        "Settings store ready in {}ms (schema version {CURRENT_VERSION})",
        started.elapsed().as_millis()
    );
    Ok(stored)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
