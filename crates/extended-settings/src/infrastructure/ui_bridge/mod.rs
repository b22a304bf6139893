//! Host UI command bridge: exposes settings operations to the host UI.
//!
//! Every command takes the open [`ExtendedConfig`] and returns a
//! [`CommandResult`] that serialises to JSON.  The host (a native shell, a
//! web view, or the CLI's `--json` mode) never sees Rust enums or errors,
//! only plain DTOs.
//!
//! # Data Transfer Objects (DTOs)
//!
//! DTOs are flat `#[derive(Serialize, Deserialize)]` structs made of
//! strings, booleans and options.  Screen items carry resource keys, not
//! localized text; the host resolves them.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`, so
//! every response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.

use extended_core::{Setting, SettingSet};
use serde::{Deserialize, Serialize};

use crate::application::settings_screen::{ClickOutcome, ListItem, ScreenMode, SettingsScreen};
use crate::infrastructure::extended_config::ExtendedConfig;

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One setting with its current value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingDto {
    pub key: String,
    pub value: bool,
    pub default_value: bool,
    pub notify: bool,
}

impl SettingDto {
    fn new(setting: Setting, value: bool) -> Self {
        let def = setting.def();
        Self {
            key: def.key.to_string(),
            value,
            default_value: def.default_value,
            notify: def.notify,
        }
    }
}

/// One row of a settings screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItemDto {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description resource key shown under the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Switch state, for toggle rows only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl ListItemDto {
    fn from_item(screen: &SettingsScreen<'_>, item: &ListItem) -> Self {
        Self {
            kind: item.kind.as_str().to_string(),
            id: item.id.map(|id| id.as_str().to_string()),
            icon: item.icon.map(str::to_string),
            title: item.title.map(str::to_string),
            description: item
                .id
                .and_then(|id| screen.description(id))
                .map(str::to_string),
            checked: item.id.and_then(|id| screen.toggle_state(id)),
        }
    }
}

/// A full settings screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenDto {
    pub mode: String,
    pub title: String,
    pub items: Vec<ListItemDto>,
}

/// What the host should do after a row click.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickResultDto {
    Navigate { mode: String },
    OpenLink { link: String, instant_view: bool },
    Toggled { key: String, value: bool },
    Ignored,
}

impl From<ClickOutcome> for ClickResultDto {
    fn from(outcome: ClickOutcome) -> Self {
        match outcome {
            ClickOutcome::Navigate(mode) => Self::Navigate {
                mode: mode.to_string(),
            },
            ClickOutcome::OpenLink { link, instant_view } => Self::OpenLink {
                link: link.to_string(),
                instant_view,
            },
            ClickOutcome::Toggled { setting, value } => Self::Toggled {
                key: setting.key().to_string(),
                value,
            },
            ClickOutcome::Ignored => Self::Ignored,
        }
    }
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns every setting with its current value, in definition order.
pub fn get_settings(config: &ExtendedConfig) -> CommandResult<Vec<SettingDto>> {
    let dtos = config
        .registry()
        .snapshot()
        .into_iter()
        .map(|(setting, value)| SettingDto::new(setting, value))
        .collect();
    CommandResult::ok(dtos)
}

/// Returns one setting by its persistence key.
pub fn get_setting(config: &ExtendedConfig, key: &str) -> CommandResult<SettingDto> {
    match Setting::from_key(key) {
        Some(setting) => CommandResult::ok(SettingDto::new(setting, config.get(setting))),
        None => CommandResult::err(format!("unknown setting: {key}")),
    }
}

/// Flips one setting by its persistence key and returns its new state.
pub fn toggle_setting(config: &ExtendedConfig, key: &str) -> CommandResult<SettingDto> {
    match Setting::from_key(key) {
        Some(setting) => CommandResult::ok(SettingDto::new(setting, config.toggle(setting))),
        None => CommandResult::err(format!("unknown setting: {key}")),
    }
}

/// Describes the screen named `mode` (`"root"`, `"general"`, ...).
pub fn get_screen(config: &ExtendedConfig, mode: &str) -> CommandResult<ScreenDto> {
    let mode: ScreenMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => return CommandResult::err(format!("{e}")),
    };
    let screen = config.screen(mode);
    let items = screen
        .items()
        .iter()
        .map(|item| ListItemDto::from_item(&screen, item))
        .collect();

    CommandResult::ok(ScreenDto {
        mode: mode.to_string(),
        title: screen.title_key().to_string(),
        items,
    })
}

/// Handles a click on row `id` of the screen named `mode`.
pub fn click_item(config: &ExtendedConfig, mode: &str, id: &str) -> CommandResult<ClickResultDto> {
    let mode: ScreenMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => return CommandResult::err(format!("{e}")),
    };
    CommandResult::ok(config.screen(mode).on_click(id).into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
