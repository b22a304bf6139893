//! SettingsRegistry: current values of every setting, persistence and change
//! notification.
//!
//! The registry is the single source of truth for setting values while the
//! process runs.  It reads the store exactly once, at construction; after that
//! every [`SettingsRegistry::get`] is an in-memory load and every
//! [`SettingsRegistry::toggle`] writes through to the store.
//!
//! # Startup (for beginners)
//!
//! ```text
//! for each setting in the definition table:
//!     key persisted?  ──yes──►  read it (default if unreadable)
//!          │
//!          no
//!          ▼
//!     queue "key = default" into one batched edit
//! apply the batch (one atomic write for all newly seeded keys)
//! ```
//!
//! A first run and an upgrade that ships a new setting take the same path:
//! whatever was never persisted is seeded with its default.
//!
//! # Listeners
//!
//! The registry does not keep listeners alive.  It stores `Weak` references,
//! so a listener that is dropped without unsubscribing is skipped on the next
//! toggle and pruned from the list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use extended_core::{KeyValueStore, Setting, SettingSet, StoreError, TypedStore};
use tracing::{debug, info, warn};

/// Receives a callback after a notifying setting has been toggled.
///
/// Callbacks run synchronously on the toggling thread, before `toggle`
/// returns.  Any `Fn(S, bool, bool) + Send + Sync` closure is a listener.
pub trait SettingsChangeListener<S: SettingSet = Setting>: Send + Sync {
    fn on_settings_changed(&self, setting: S, new_value: bool, old_value: bool);
}

impl<S, F> SettingsChangeListener<S> for F
where
    S: SettingSet,
    F: Fn(S, bool, bool) + Send + Sync + ?Sized,
{
    fn on_settings_changed(&self, setting: S, new_value: bool, old_value: bool) {
        self(setting, new_value, old_value)
    }
}

type ListenerRef<S> = Weak<dyn SettingsChangeListener<S>>;

/// In-memory value table for the setting set `S`, written through to a
/// [`KeyValueStore`].
pub struct SettingsRegistry<S: SettingSet = Setting> {
    store: Arc<dyn KeyValueStore>,
    /// Indexed by [`SettingSet::index`].
    values: Box<[AtomicBool]>,
    listeners: Mutex<Vec<ListenerRef<S>>>,
}

impl<S: SettingSet> SettingsRegistry<S> {
    /// Loads every setting from `store`, seeding defaults for keys that were
    /// never persisted.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a `contains` probe fails or if the
    /// batched seeding write fails.  Unreadable persisted values are not an
    /// error; they fall back to the default.
    pub fn initialize(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let mut values = Vec::with_capacity(S::ALL.len());
        let mut seeds = store.edit();

        for &setting in S::ALL {
            debug_assert_eq!(S::ALL[setting.index()], setting);
            let def = setting.def();
            let value = if store.contains(def.key)? {
                store.get_bool(def.key, def.default_value)
            } else {
                seeds = seeds.put_bool(def.key, def.default_value);
                def.default_value
            };
            values.push(AtomicBool::new(value));
        }

        if !seeds.is_empty() {
            info!("Seeding {} setting(s) with their defaults", seeds.len());
        }
        seeds.apply()?;

        Ok(Self {
            store,
            values: values.into_boxed_slice(),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Returns the current value of `setting`.
    pub fn get(&self, setting: S) -> bool {
        self.values[setting.index()].load(Ordering::Acquire)
    }

    /// Current value of every setting, in definition order.
    pub fn snapshot(&self) -> Vec<(S, bool)> {
        S::ALL.iter().map(|&s| (s, self.get(s))).collect()
    }

    /// Flips `setting`, persists the new value and, if the setting notifies,
    /// calls every live listener with `(setting, new, old)`.
    ///
    /// Returns the new value.  A failed persistence write is logged and the
    /// in-memory value keeps the new state.
    pub fn toggle(&self, setting: S) -> bool {
        let def = setting.def();
        let slot = &self.values[setting.index()];

        // Load and store are separate steps: two threads toggling the same
        // setting at once can lose an update.  Toggles come from one thread.
        let old_value = slot.load(Ordering::Acquire);
        let new_value = !old_value;
        slot.store(new_value, Ordering::Release);

        if let Err(e) = self.store.put_bool(def.key, new_value) {
            warn!("Failed to persist {} = {new_value}: {e}", def.key);
        }
        debug!("Toggled {} {old_value} -> {new_value}", def.key);

        if def.notify {
            self.notify(setting, new_value, old_value);
        }
        new_value
    }

    /// Subscribes `listener` to change notifications.
    ///
    /// Only a weak reference is kept; the caller owns the listener.
    /// Registering the same listener twice delivers every change twice.
    pub fn add_listener<L>(&self, listener: &Arc<L>)
    where
        L: SettingsChangeListener<S> + 'static,
    {
        let listener: Arc<dyn SettingsChangeListener<S>> = listener.clone();
        self.lock_listeners().push(Arc::downgrade(&listener));
    }

    /// Removes every registration of `listener`.  Unknown listeners are
    /// ignored.
    pub fn remove_listener<L>(&self, listener: &Arc<L>)
    where
        L: SettingsChangeListener<S> + ?Sized + 'static,
    {
        // Registrations are matched by allocation, ignoring vtables.
        let target = Arc::as_ptr(listener).cast::<()>();
        self.lock_listeners()
            .retain(|registered| registered.as_ptr().cast::<()>() != target);
    }

    /// Number of registrations whose listener is still alive.
    pub fn listener_count(&self) -> usize {
        self.lock_listeners()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    fn notify(&self, setting: S, new_value: bool, old_value: bool) {
        // Collect strong references first so callbacks run without the lock
        // held; a listener may subscribe or unsubscribe from its callback.
        let live: Vec<Arc<dyn SettingsChangeListener<S>>> = {
            let mut listeners = self.lock_listeners();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        for listener in live {
            listener.on_settings_changed(setting, new_value, old_value);
        }
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<ListenerRef<S>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: SettingSet> std::fmt::Debug for SettingsRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRegistry")
            .field("values", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{backend_error, MockStore};
    use extended_core::{EditOp, MemoryStore, SettingDef, StoredValue};
    use mockall::predicate::eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestSetting {
        Loud,
        Quiet,
        OnByDefault,
    }

    static TEST_DEFS: [SettingDef; 3] = [
        SettingDef {
            key: "loud",
            default_value: false,
            notify: true,
        },
        SettingDef {
            key: "quiet",
            default_value: false,
            notify: false,
        },
        SettingDef {
            key: "on_by_default",
            default_value: true,
            notify: true,
        },
    ];

    impl SettingSet for TestSetting {
        const ALL: &'static [Self] = &[Self::Loud, Self::Quiet, Self::OnByDefault];

        fn def(self) -> &'static SettingDef {
            &TEST_DEFS[self as usize]
        }

        fn index(self) -> usize {
            self as usize
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(TestSetting, bool, bool)>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<(TestSetting, bool, bool)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl SettingsChangeListener<TestSetting> for Recorder {
        fn on_settings_changed(&self, setting: TestSetting, new_value: bool, old_value: bool) {
            self.events
                .lock()
                .unwrap()
                .push((setting, new_value, old_value));
        }
    }

    fn registry_over(store: &Arc<MemoryStore>) -> SettingsRegistry<TestSetting> {
        SettingsRegistry::initialize(store.clone()).unwrap()
    }

    // ── Initialization ────────────────────────────────────────────────────────

    #[test]
    fn test_initialize_seeds_defaults_into_empty_store() {
        // Arrange
        let store = Arc::new(MemoryStore::new());

        // Act
        let registry = registry_over(&store);

        // Assert
        assert!(!registry.get(TestSetting::Loud));
        assert!(!registry.get(TestSetting::Quiet));
        assert!(registry.get(TestSetting::OnByDefault));
        assert_eq!(store.keys().unwrap(), vec!["loud", "on_by_default", "quiet"]);
        assert_eq!(store.try_get_bool("on_by_default"), Ok(Some(true)));
    }

    #[test]
    fn test_initialize_keeps_persisted_values() {
        // Arrange
        let store = Arc::new(MemoryStore::with_entries([
            ("loud", StoredValue::Bool(true)),
            ("on_by_default", StoredValue::Bool(false)),
        ]));

        // Act
        let registry = registry_over(&store);

        // Assert
        assert!(registry.get(TestSetting::Loud));
        assert!(!registry.get(TestSetting::OnByDefault));
        assert_eq!(store.try_get_bool("loud"), Ok(Some(true)));
        assert_eq!(store.try_get_bool("on_by_default"), Ok(Some(false)));
        // Only the missing key was seeded.
        assert_eq!(store.try_get_bool("quiet"), Ok(Some(false)));
    }

    #[test]
    fn test_initialize_falls_back_to_default_for_unreadable_value() {
        // Arrange
        let store = Arc::new(MemoryStore::with_entries([(
            "on_by_default",
            StoredValue::String("yes".to_string()),
        )]));

        // Act
        let registry = registry_over(&store);

        // Assert: default used, persisted value left alone
        assert!(registry.get(TestSetting::OnByDefault));
        assert_eq!(store.get_string("on_by_default", ""), "yes");
    }

    #[test]
    fn test_initialize_twice_is_idempotent() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let first = registry_over(&store);
        first.toggle(TestSetting::Quiet);
        drop(first);
        let before: Vec<_> = store
            .keys()
            .unwrap()
            .into_iter()
            .map(|k| (k.clone(), store.get(&k).unwrap()))
            .collect();

        // Act
        let second = registry_over(&store);

        // Assert
        assert!(second.get(TestSetting::Quiet));
        let after: Vec<_> = store
            .keys()
            .unwrap()
            .into_iter()
            .map(|k| (k.clone(), store.get(&k).unwrap()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_initialize_seeds_all_missing_keys_in_one_batch() {
        // Arrange
        let mut store = MockStore::new();
        store.expect_contains().returning(|_| Ok(false));
        store.expect_put().never();
        store
            .expect_apply()
            .with(eq(vec![
                EditOp::Put {
                    key: "loud".to_string(),
                    value: StoredValue::Bool(false),
                },
                EditOp::Put {
                    key: "quiet".to_string(),
                    value: StoredValue::Bool(false),
                },
                EditOp::Put {
                    key: "on_by_default".to_string(),
                    value: StoredValue::Bool(true),
                },
            ]))
            .times(1)
            .returning(|_| Ok(()));

        // Act
        let result = SettingsRegistry::<TestSetting>::initialize(Arc::new(store));

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_initialize_without_missing_keys_writes_nothing() {
        let mut store = MockStore::new();
        store.expect_contains().returning(|_| Ok(true));
        store
            .expect_get()
            .returning(|_| Ok(Some(StoredValue::Bool(true))));
        store.expect_apply().never();
        store.expect_put().never();

        let registry = SettingsRegistry::<TestSetting>::initialize(Arc::new(store)).unwrap();

        assert!(registry.get(TestSetting::Quiet));
    }

    #[test]
    fn test_initialize_fails_when_contains_fails() {
        // Arrange
        let mut store = MockStore::new();
        store.expect_contains().returning(|_| Err(backend_error()));

        // Act
        let result = SettingsRegistry::<TestSetting>::initialize(Arc::new(store));

        // Assert
        assert_eq!(result.unwrap_err(), backend_error());
    }

    #[test]
    fn test_initialize_fails_when_seeding_fails() {
        let mut store = MockStore::new();
        store.expect_contains().returning(|_| Ok(false));
        store.expect_apply().returning(|_| Err(backend_error()));

        let result = SettingsRegistry::<TestSetting>::initialize(Arc::new(store));

        assert!(result.is_err());
    }

    // ── Toggle ────────────────────────────────────────────────────────────────

    #[test]
    fn test_toggle_flips_and_persists() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);

        // Act
        let new_value = registry.toggle(TestSetting::Loud);

        // Assert
        assert!(new_value);
        assert!(registry.get(TestSetting::Loud));
        assert_eq!(store.try_get_bool("loud"), Ok(Some(true)));
    }

    #[test]
    fn test_toggle_twice_restores_original_value() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);

        registry.toggle(TestSetting::OnByDefault);
        let value = registry.toggle(TestSetting::OnByDefault);

        assert!(value);
        assert!(registry.get(TestSetting::OnByDefault));
        assert_eq!(store.try_get_bool("on_by_default"), Ok(Some(true)));
    }

    #[test]
    fn test_toggle_keeps_new_value_when_persist_fails() {
        // Arrange
        let mut store = MockStore::new();
        store.expect_contains().returning(|_| Ok(true));
        store
            .expect_get()
            .returning(|_| Ok(Some(StoredValue::Bool(false))));
        store
            .expect_put()
            .with(eq("loud"), eq(StoredValue::Bool(true)))
            .times(1)
            .returning(|_, _| Err(backend_error()));
        let registry = SettingsRegistry::<TestSetting>::initialize(Arc::new(store)).unwrap();
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(&recorder);

        // Act
        let new_value = registry.toggle(TestSetting::Loud);

        // Assert
        assert!(new_value);
        assert!(registry.get(TestSetting::Loud));
        assert_eq!(recorder.events(), vec![(TestSetting::Loud, true, false)]);
    }

    #[test]
    fn test_snapshot_lists_settings_in_definition_order() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        registry.toggle(TestSetting::Quiet);

        assert_eq!(
            registry.snapshot(),
            vec![
                (TestSetting::Loud, false),
                (TestSetting::Quiet, true),
                (TestSetting::OnByDefault, true),
            ]
        );
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    #[test]
    fn test_notifying_toggle_reaches_every_listener_once() {
        // Arrange
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        registry.add_listener(&a);
        registry.add_listener(&b);

        // Act
        registry.toggle(TestSetting::Loud);

        // Assert
        assert_eq!(a.events(), vec![(TestSetting::Loud, true, false)]);
        assert_eq!(b.events(), vec![(TestSetting::Loud, true, false)]);
    }

    #[test]
    fn test_silent_setting_does_not_notify() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(&store);
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(&recorder);

        // Act
        let new_value = registry.toggle(TestSetting::Quiet);

        // Assert: value changed and persisted, nobody told
        assert!(new_value);
        assert_eq!(store.try_get_bool("quiet"), Ok(Some(true)));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_duplicate_registration_notifies_twice() {
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(&recorder);
        registry.add_listener(&recorder);

        registry.toggle(TestSetting::OnByDefault);

        assert_eq!(
            recorder.events(),
            vec![
                (TestSetting::OnByDefault, false, true),
                (TestSetting::OnByDefault, false, true),
            ]
        );
    }

    #[test]
    fn test_removed_listener_is_not_invoked() {
        // Arrange
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let kept = Arc::new(Recorder::default());
        let removed = Arc::new(Recorder::default());
        registry.add_listener(&kept);
        registry.add_listener(&removed);
        registry.add_listener(&removed);

        // Act
        registry.remove_listener(&removed);
        registry.toggle(TestSetting::Loud);

        // Assert
        assert!(removed.events().is_empty());
        assert_eq!(kept.events().len(), 1);
        assert_eq!(registry.listener_count(), 1);
    }

    #[test]
    fn test_removing_unknown_listener_is_noop() {
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let registered = Arc::new(Recorder::default());
        let stranger = Arc::new(Recorder::default());
        registry.add_listener(&registered);

        registry.remove_listener(&stranger);

        assert_eq!(registry.listener_count(), 1);
    }

    #[test]
    fn test_dropped_listener_is_skipped_and_pruned() {
        // Arrange
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let kept = Arc::new(Recorder::default());
        let dropped = Arc::new(Recorder::default());
        registry.add_listener(&kept);
        registry.add_listener(&dropped);
        assert_eq!(registry.listener_count(), 2);

        // Act
        drop(dropped);
        registry.toggle(TestSetting::Loud);

        // Assert
        assert_eq!(registry.listener_count(), 1);
        assert_eq!(registry.lock_listeners().len(), 1);
        assert_eq!(kept.events().len(), 1);
    }

    #[test]
    fn test_closure_listener() {
        // Arrange
        let registry = registry_over(&Arc::new(MemoryStore::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = Arc::new(move |s: TestSetting, new: bool, old: bool| {
            sink.lock().unwrap().push((s, new, old));
        });
        registry.add_listener(&listener);

        // Act
        registry.toggle(TestSetting::Loud);
        registry.toggle(TestSetting::Loud);

        // Assert
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(TestSetting::Loud, true, false), (TestSetting::Loud, false, true)]
        );
    }

    #[test]
    fn test_listener_may_unsubscribe_during_callback() {
        // Arrange
        let registry = Arc::new(registry_over(&Arc::new(MemoryStore::new())));
        let calls = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<Arc<dyn Fn(TestSetting, bool, bool) + Send + Sync>>>> =
            Arc::new(Mutex::new(None));

        let weak_registry = Arc::downgrade(&registry);
        let counter = calls.clone();
        let own_slot = slot.clone();
        let listener = Arc::new(move |_: TestSetting, _: bool, _: bool| {
            *counter.lock().unwrap() += 1;
            if let (Some(registry), Some(me)) =
                (weak_registry.upgrade(), own_slot.lock().unwrap().clone())
            {
                registry.remove_listener(&me);
            }
        });
        registry.add_listener(&listener);
        let erased: Arc<dyn Fn(TestSetting, bool, bool) + Send + Sync> = listener.clone();
        *slot.lock().unwrap() = Some(erased);

        // Act
        registry.toggle(TestSetting::Loud);
        registry.toggle(TestSetting::Loud);

        // Assert
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(registry.listener_count(), 0);
    }
}
