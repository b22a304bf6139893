//! Setting definitions.
//!
//! A setting is a named boolean flag with a default and a per-setting
//! "notify on change" flag.  The definitions are an immutable table; the enum
//! is only an index into it.  Current values are owned by whoever holds the
//! value table (the settings registry), keyed by [`SettingSet::index`].

use std::fmt;
use std::hash::Hash;

/// Key reserved for the persisted schema version marker.
///
/// No setting may use it as its persistence key.
pub const VERSION_KEY: &str = "version";

/// Immutable definition of one boolean setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDef {
    /// Stable identifier, also used as the persistence key.
    pub key: &'static str,
    /// Value seeded into the store when the key has never been persisted.
    pub default_value: bool,
    /// Whether toggling this setting fans out to change listeners.
    ///
    /// Settings read lazily by their consumers leave this off so a toggle
    /// does not trigger refresh work nobody needs.
    pub notify: bool,
}

/// A closed enumeration of boolean settings backed by a definition table.
///
/// Implementors are plain `Copy` enums.  [`SettingSet::ALL`] lists every
/// member in table order and `ALL[s.index()] == s` must hold for every
/// member, so a registry can keep its values in a flat table.
pub trait SettingSet: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every member, in definition-table order.
    const ALL: &'static [Self];

    /// Returns the immutable definition row for this setting.
    fn def(self) -> &'static SettingDef;

    /// Position of this setting in [`SettingSet::ALL`].
    fn index(self) -> usize;

    /// Persistence key of this setting.
    fn key(self) -> &'static str {
        self.def().key
    }

    /// Looks a setting up by its persistence key.
    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }
}

/// Settings shipped with eXtended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Show numeric user and chat identifiers in profiles.
    ShowIds,
}

static DEFINITIONS: [SettingDef; 1] = [
    // General
    SettingDef {
        key: "show_ids",
        default_value: false,
        notify: true,
    },
];

impl SettingSet for Setting {
    const ALL: &'static [Self] = &[Setting::ShowIds];

    fn def(self) -> &'static SettingDef {
        &DEFINITIONS[self.index()]
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
