//! ExtendedConfig: the settings facade the rest of the app talks to.
//!
//! Opening one wires the whole stack together:
//!
//! ```text
//! StorageConfig ──► working dir ──► SqliteStore ──► schema::migrate ──► SettingsRegistry
//! ```
//!
//! Any failure along that chain is fatal for the caller: without a working
//! settings store nothing else in the app can start.  The process-wide
//! instance lives in [`crate::infrastructure::global`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use extended_core::{Edit, KeyValueStore, Setting, StoreError, TypedStore};
use thiserror::Error;
use tracing::info;

use crate::application::registry::{SettingsChangeListener, SettingsRegistry};
use crate::application::settings_screen::{ScreenMode, SettingsScreen};
use crate::infrastructure::storage::config::{ConfigError, StorageConfig};
use crate::infrastructure::storage::{schema, LoggingErrorHandler, SqliteStore, StoreErrorHandler};

/// Error type for bringing the settings store up.
#[derive(Debug, Error)]
pub enum InitError {
    /// The working directory could not be created.
    #[error("cannot create settings directory {path}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store could not be opened or its settings could not be loaded.
    #[error("settings store unavailable: {0}")]
    Store(#[source] StoreError),

    /// The schema version marker could not be brought up to date.
    #[error("settings schema migration failed: {0}")]
    Migration(#[source] StoreError),

    /// The storage location could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A second process-wide instance was requested.
    #[error("the settings store has already been initialized")]
    AlreadyInitialized,
}

/// Open settings store plus the live registry over it.
pub struct ExtendedConfig {
    working_dir: PathBuf,
    store: Arc<dyn KeyValueStore>,
    registry: SettingsRegistry,
}

impl ExtendedConfig {
    /// Opens the settings store described by `storage`, logging engine
    /// errors through [`LoggingErrorHandler`].
    ///
    /// Production code goes through [`crate::infrastructure::global::init`]
    /// or [`crate::infrastructure::global::instance`] instead.  Each facade
    /// keeps its own in-memory values, so two facades over one database do
    /// not see each other's toggles.  Direct construction is for tests and
    /// tools that own the database exclusively.
    ///
    /// # Errors
    ///
    /// See [`ExtendedConfig::open_with_handler`].
    pub fn open(storage: &StorageConfig) -> Result<Self, InitError> {
        Self::open_with_handler(storage, Arc::new(LoggingErrorHandler))
    }

    /// Opens the settings store described by `storage`, routing engine
    /// errors to `handler`.
    ///
    /// # Errors
    ///
    /// - [`InitError::Config`] if the working directory cannot be resolved.
    /// - [`InitError::WorkingDirectory`] if it cannot be created.
    /// - [`InitError::Store`] if the database cannot be opened or the
    ///   settings cannot be loaded.
    /// - [`InitError::Migration`] if the version marker cannot be written.
    pub fn open_with_handler(
        storage: &StorageConfig,
        handler: Arc<dyn StoreErrorHandler>,
    ) -> Result<Self, InitError> {
        let working_dir = storage.working_dir()?;
        std::fs::create_dir_all(&working_dir).map_err(|source| InitError::WorkingDirectory {
            path: working_dir.clone(),
            source,
        })?;

        let store = SqliteStore::open(&working_dir, &storage.db_name, handler)
            .map_err(InitError::Store)?;
        Self::with_store(working_dir, Arc::new(store))
    }

    /// Builds the facade over an already opened store.
    ///
    /// # Errors
    ///
    /// [`InitError::Migration`] or [`InitError::Store`], as for
    /// [`ExtendedConfig::open_with_handler`].
    pub fn with_store(
        working_dir: PathBuf,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, InitError> {
        schema::migrate(store.as_ref()).map_err(InitError::Migration)?;
        let registry = SettingsRegistry::initialize(store.clone()).map_err(InitError::Store)?;

        info!("Settings loaded from {}", working_dir.display());

        Ok(Self {
            working_dir,
            store,
            registry,
        })
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    pub fn get(&self, setting: Setting) -> bool {
        self.registry.get(setting)
    }

    /// Flips `setting` and returns the new value.
    pub fn toggle(&self, setting: Setting) -> bool {
        self.registry.toggle(setting)
    }

    pub fn add_listener<L>(&self, listener: &Arc<L>)
    where
        L: SettingsChangeListener + 'static,
    {
        self.registry.add_listener(listener);
    }

    pub fn remove_listener<L>(&self, listener: &Arc<L>)
    where
        L: SettingsChangeListener + ?Sized + 'static,
    {
        self.registry.remove_listener(listener);
    }

    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    /// Settings screen in `mode`, bound to this instance's registry.
    pub fn screen(&self, mode: ScreenMode) -> SettingsScreen<'_> {
        SettingsScreen::new(&self.registry, mode)
    }

    // ── Raw store access ──────────────────────────────────────────────────────

    /// The underlying store, with typed accessors via [`TypedStore`].
    ///
    /// Writing a setting's key here bypasses the registry: the in-memory
    /// value only picks it up on the next start.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Starts a batched edit on the underlying store.
    pub fn edit(&self) -> Edit<'_, dyn KeyValueStore> {
        self.store.edit()
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key)
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        self.store.contains(key)
    }

    /// Directory holding the database file.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl std::fmt::Debug for ExtendedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedConfig")
            .field("working_dir", &self.working_dir)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
