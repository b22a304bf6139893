//! Settings screen model: item lists per screen mode and click dispatch.
//!
//! The host UI renders whatever [`SettingsScreen::items`] returns, in order,
//! and forwards every row click to [`SettingsScreen::on_click`] with the row's
//! [`ViewId`].  Resource keys (titles, icons, links, descriptions) are plain
//! strings; resolving them to localized text and drawables is the host's job.
//!
//! # Screen tree
//!
//! ```text
//! Root ─┬─► General      (toggle rows)
//!       ├─► Appearance   (empty)
//!       ├─► Chats        (empty)
//!       ├─► Misc         (empty)
//!       └─► about links  (opened by the host, not a screen)
//! ```
//!
//! # Dispatch
//!
//! Every clickable id is listed exactly once in [`CLICK_ACTIONS`].  Ids that
//! are not in the table are ignored, so a stale host layout cannot trigger
//! anything unexpected.

use std::fmt;
use std::str::FromStr;

use extended_core::Setting;
use thiserror::Error;
use tracing::debug;

use crate::application::registry::SettingsRegistry;

// ── Identifiers ───────────────────────────────────────────────────────────────

/// Stable identifier of a clickable row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(&'static str);

impl ViewId {
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Resolves a host-supplied id string to a known row id.
    pub fn lookup(id: &str) -> Option<Self> {
        CLICK_ACTIONS
            .iter()
            .map(|(view_id, _)| *view_id)
            .find(|view_id| view_id.0 == id)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Row identifiers used by the settings screens.
pub mod ids {
    use super::ViewId;

    pub const GENERAL_SETTINGS: ViewId = ViewId("btn_generalSettings");
    pub const APPEARANCE_SETTINGS: ViewId = ViewId("btn_appearanceSettings");
    pub const CHATS_SETTINGS: ViewId = ViewId("btn_chatsSettings");
    pub const MISC_SETTINGS: ViewId = ViewId("btn_miscSettings");

    pub const EXTENDED_CHANNEL: ViewId = ViewId("btn_extendedChannel");
    pub const EXTENDED_CHAT: ViewId = ViewId("btn_extendedChat");
    pub const EXTENDED_SOURCES: ViewId = ViewId("btn_extendedSources");
    pub const EXTENDED_TRANSLATE: ViewId = ViewId("btn_extendedTranslate");

    pub const SHOW_USER_ID: ViewId = ViewId("btn_showUserId");
}

// ── Screen modes ──────────────────────────────────────────────────────────────

/// Which page of the settings tree is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenMode {
    #[default]
    Root,
    General,
    Appearance,
    Chats,
    Misc,
}

impl ScreenMode {
    pub const ALL: [ScreenMode; 5] = [
        Self::Root,
        Self::General,
        Self::Appearance,
        Self::Chats,
        Self::Misc,
    ];

    /// Resource key of the screen title.
    pub fn title_key(self) -> &'static str {
        match self {
            Self::Root => "ExtendedSettings",
            Self::General => "GeneralSettings",
            Self::Appearance => "AppearanceSettings",
            Self::Chats => "ChatsSettings",
            Self::Misc => "MiscSettings",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::General => "general",
            Self::Appearance => "appearance",
            Self::Chats => "chats",
            Self::Misc => "misc",
        }
    }
}

impl fmt::Display for ScreenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a screen mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown settings screen {0:?} (expected one of: root, general, appearance, chats, misc)")]
pub struct ParseModeError(pub String);

impl FromStr for ScreenMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

// ── List items ────────────────────────────────────────────────────────────────

/// Visual kind of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    EmptyOffsetSmall,
    Header,
    ShadowTop,
    ShadowBottom,
    Separator,
    /// Clickable row that opens a sub-screen or a link.
    Navigation,
    /// Clickable row with an on/off switch bound to a setting.
    Toggle,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyOffsetSmall => "empty_offset_small",
            Self::Header => "header",
            Self::ShadowTop => "shadow_top",
            Self::ShadowBottom => "shadow_bottom",
            Self::Separator => "separator",
            Self::Navigation => "navigation",
            Self::Toggle => "toggle",
        }
    }
}

/// One row of a settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    pub kind: ItemKind,
    pub id: Option<ViewId>,
    /// Icon resource key.
    pub icon: Option<&'static str>,
    /// Title resource key.
    pub title: Option<&'static str>,
}

impl ListItem {
    const fn decoration(kind: ItemKind) -> Self {
        Self {
            kind,
            id: None,
            icon: None,
            title: None,
        }
    }

    const fn header(title: &'static str) -> Self {
        Self {
            kind: ItemKind::Header,
            id: None,
            icon: None,
            title: Some(title),
        }
    }

    const fn navigation(id: ViewId, icon: &'static str, title: &'static str) -> Self {
        Self {
            kind: ItemKind::Navigation,
            id: Some(id),
            icon: Some(icon),
            title: Some(title),
        }
    }

    const fn toggle(id: ViewId, title: &'static str) -> Self {
        Self {
            kind: ItemKind::Toggle,
            id: Some(id),
            icon: None,
            title: Some(title),
        }
    }
}

const OFFSET: ListItem = ListItem::decoration(ItemKind::EmptyOffsetSmall);
const SHADOW_TOP: ListItem = ListItem::decoration(ItemKind::ShadowTop);
const SHADOW_BOTTOM: ListItem = ListItem::decoration(ItemKind::ShadowBottom);
const SEPARATOR: ListItem = ListItem::decoration(ItemKind::Separator);

/// Builds the row list for `mode`.
pub fn build_items(mode: ScreenMode) -> Vec<ListItem> {
    let mut items = vec![OFFSET];

    match mode {
        ScreenMode::Root => {
            items.extend([
                ListItem::header("Settings"),
                SHADOW_TOP,
                ListItem::navigation(ids::GENERAL_SETTINGS, "baseline_widgets_24", "GeneralSettings"),
                SEPARATOR,
                ListItem::navigation(ids::APPEARANCE_SETTINGS, "baseline_palette_24", "AppearanceSettings"),
                SEPARATOR,
                ListItem::navigation(ids::CHATS_SETTINGS, "baseline_chat_bubble_24", "ChatsSettings"),
                SEPARATOR,
                ListItem::navigation(ids::MISC_SETTINGS, "baseline_star_24", "MiscSettings"),
                SHADOW_BOTTOM,
            ]);
            items.extend([
                ListItem::header("AboutExtended"),
                SHADOW_TOP,
                ListItem::navigation(ids::EXTENDED_CHANNEL, "baseline_newspaper_24", "ExtendedChannel"),
                SEPARATOR,
                ListItem::navigation(ids::EXTENDED_CHAT, "baseline_forum_24", "ExtendedChat"),
                SEPARATOR,
                ListItem::navigation(ids::EXTENDED_SOURCES, "baseline_github_24", "ExtendedSources"),
                SEPARATOR,
                ListItem::navigation(ids::EXTENDED_TRANSLATE, "baseline_translate_24", "ExtendedTranslate"),
                SHADOW_BOTTOM,
            ]);
        }
        ScreenMode::General => {
            items.extend([
                ListItem::header("ProfilePreferences"),
                SHADOW_TOP,
                ListItem::toggle(ids::SHOW_USER_ID, "ShowUserId"),
                SHADOW_BOTTOM,
            ]);
        }
        // No settings on these pages yet.
        ScreenMode::Appearance | ScreenMode::Chats | ScreenMode::Misc => {}
    }

    items
}

// ── Click dispatch ────────────────────────────────────────────────────────────

/// What clicking a row does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Open a sub-screen.
    Navigate(ScreenMode),
    /// Open the URL stored under the `link` resource key.
    OpenLink {
        link: &'static str,
        instant_view: bool,
    },
    /// Flip a boolean setting.
    Toggle(Setting),
}

/// Immutable `ViewId → ClickAction` table.  Each id appears once.
pub static CLICK_ACTIONS: &[(ViewId, ClickAction)] = &[
    (ids::GENERAL_SETTINGS, ClickAction::Navigate(ScreenMode::General)),
    (ids::APPEARANCE_SETTINGS, ClickAction::Navigate(ScreenMode::Appearance)),
    (ids::CHATS_SETTINGS, ClickAction::Navigate(ScreenMode::Chats)),
    (ids::MISC_SETTINGS, ClickAction::Navigate(ScreenMode::Misc)),
    (
        ids::EXTENDED_CHANNEL,
        ClickAction::OpenLink {
            link: "ExtendedChannelLink",
            instant_view: true,
        },
    ),
    (
        ids::EXTENDED_CHAT,
        ClickAction::OpenLink {
            link: "ExtendedChatLink",
            instant_view: true,
        },
    ),
    (
        ids::EXTENDED_SOURCES,
        ClickAction::OpenLink {
            link: "ExtendedSourcesLink",
            instant_view: false,
        },
    ),
    (
        ids::EXTENDED_TRANSLATE,
        ClickAction::OpenLink {
            link: "ExtendedTranslateLink",
            instant_view: false,
        },
    ),
    (ids::SHOW_USER_ID, ClickAction::Toggle(Setting::ShowIds)),
];

/// Description resource keys rendered under the about-link rows.
static DESCRIPTIONS: &[(ViewId, &str)] = &[
    (ids::EXTENDED_CHANNEL, "ExtendedChannelDesc"),
    (ids::EXTENDED_CHAT, "ExtendedChatDesc"),
    (ids::EXTENDED_SOURCES, "ExtendedSourcesDesc"),
    (ids::EXTENDED_TRANSLATE, "ExtendedTranslateDesc"),
];

/// Looks up the action bound to `id`.
pub fn action_for(id: ViewId) -> Option<ClickAction> {
    CLICK_ACTIONS
        .iter()
        .find(|(view_id, _)| *view_id == id)
        .map(|(_, action)| *action)
}

/// Result of a click, for the host to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Push a new screen in `mode`.
    Navigate(ScreenMode),
    /// Open the link stored under the `link` resource key.
    OpenLink {
        link: &'static str,
        instant_view: bool,
    },
    /// The setting was toggled; the host refreshes the row with `value`.
    Toggled { setting: Setting, value: bool },
    /// The id is not bound to anything.
    Ignored,
}

// ── Screen ────────────────────────────────────────────────────────────────────

/// One settings page bound to the live registry.
pub struct SettingsScreen<'a> {
    registry: &'a SettingsRegistry,
    mode: ScreenMode,
}

impl<'a> SettingsScreen<'a> {
    pub fn new(registry: &'a SettingsRegistry, mode: ScreenMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> ScreenMode {
        self.mode
    }

    pub fn title_key(&self) -> &'static str {
        self.mode.title_key()
    }

    pub fn items(&self) -> Vec<ListItem> {
        build_items(self.mode)
    }

    /// Handles a click on the row identified by `id`.
    ///
    /// Toggle rows flip their setting immediately.  Navigation and links are
    /// returned to the host.  Unknown ids are ignored.
    pub fn on_click(&self, id: &str) -> ClickOutcome {
        let Some(action) = ViewId::lookup(id).and_then(action_for) else {
            debug!("Ignoring click on unbound row {id:?}");
            return ClickOutcome::Ignored;
        };

        match action {
            ClickAction::Navigate(mode) => ClickOutcome::Navigate(mode),
            ClickAction::OpenLink { link, instant_view } => {
                ClickOutcome::OpenLink { link, instant_view }
            }
            ClickAction::Toggle(setting) => ClickOutcome::Toggled {
                setting,
                value: self.registry.toggle(setting),
            },
        }
    }

    /// Switch state of a toggle row, or `None` if `id` is not a toggle row.
    pub fn toggle_state(&self, id: ViewId) -> Option<bool> {
        match action_for(id)? {
            ClickAction::Toggle(setting) => Some(self.registry.get(setting)),
            _ => None,
        }
    }

    /// Description resource key shown under a row, if it has one.
    pub fn description(&self, id: ViewId) -> Option<&'static str> {
        DESCRIPTIONS
            .iter()
            .find(|(view_id, _)| *view_id == id)
            .map(|(_, key)| *key)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
