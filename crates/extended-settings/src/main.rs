//! eXtended settings command-line host.
//!
//! Opens the process-wide settings store and runs one command against it.
//! It is both a debugging tool for the settings database and a reference
//! host for the UI bridge: `--json` prints exactly what a UI would receive.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- storage location + log level
//!  └─ global::init()         -- working dir, SQLite store, schema, registry
//!  └─ run(command)
//!       ├─ list / get / toggle  → ui_bridge setting commands
//!       └─ screen / click       → ui_bridge screen commands
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use extended_core::Setting;
use extended_settings::application::settings_screen::ScreenMode;
use extended_settings::infrastructure::extended_config::ExtendedConfig;
use extended_settings::infrastructure::global;
use extended_settings::infrastructure::storage::config::{load_config, AppConfig};
use extended_settings::infrastructure::ui_bridge::{self, CommandResult};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and change eXtended settings.
#[derive(Debug, Parser)]
#[command(name = "extended-settings", about = "Inspect and change eXtended settings", version)]
struct Cli {
    /// Base directory for the settings store.
    ///
    /// Overrides `storage.data_dir` from the config file.  The database lives
    /// in `<DATA_DIR>/<dir_name>/<db_name>`.
    #[arg(long, env = "EXTENDED_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print the UI bridge JSON response instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every setting with its current value.
    List,
    /// Print one setting.
    Get {
        /// Setting key, e.g. `show_ids`.
        key: String,
    },
    /// Flip one setting and print its new value.
    Toggle {
        /// Setting key, e.g. `show_ids`.
        key: String,
    },
    /// Describe a settings screen.
    Screen {
        /// Screen to describe: root, general, appearance, chats or misc.
        #[arg(long, default_value_t = ScreenMode::Root)]
        mode: ScreenMode,
    },
    /// Click a row of a settings screen.
    Click {
        /// Row identifier, e.g. `btn_showUserId`.
        id: String,
        /// Screen the row belongs to.
        #[arg(long, default_value_t = ScreenMode::Root)]
        mode: ScreenMode,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The config file decides the default log level, so it is read before
    // logging is up; a failure is reported once the subscriber exists.
    let (mut app_config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&app_config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(e) = config_error {
        warn!("Failed to load app config, using defaults: {e}");
    }
    if let Some(dir) = cli.data_dir {
        app_config.storage.data_dir = Some(dir);
    }

    let config = global::init(&app_config.storage).context("failed to open the settings store")?;
    info!("Settings store at {}", config.working_dir().display());

    let listener = Arc::new(|setting: Setting, new_value: bool, old_value: bool| {
        info!("{setting} changed: {old_value} -> {new_value}");
    });
    config.add_listener(&listener);

    run(config, cli.command, cli.json)
}

fn run(config: &ExtendedConfig, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::List => {
            let result = ui_bridge::get_settings(config);
            emit(result, json, |settings| {
                for s in settings {
                    println!("{} = {}", s.key, s.value);
                }
            })
        }
        Command::Get { key } => emit(ui_bridge::get_setting(config, &key), json, |s| {
            println!("{} = {}", s.key, s.value)
        }),
        Command::Toggle { key } => emit(ui_bridge::toggle_setting(config, &key), json, |s| {
            println!("{} = {}", s.key, s.value)
        }),
        Command::Screen { mode } => {
            emit(ui_bridge::get_screen(config, mode.as_str()), json, |screen| {
                println!("[{}] {}", screen.mode, screen.title);
                for item in screen.items {
                    let mut line = format!("  {:<18}", item.kind);
                    if let Some(id) = &item.id {
                        line.push_str(&format!(" {id}"));
                    }
                    if let Some(title) = &item.title {
                        line.push_str(&format!(" \"{title}\""));
                    }
                    if let Some(checked) = item.checked {
                        line.push_str(if checked { " [on]" } else { " [off]" });
                    }
                    if let Some(desc) = &item.description {
                        line.push_str(&format!(" ({desc})"));
                    }
                    println!("{}", line.trim_end());
                }
            })
        }
        Command::Click { id, mode } => {
            emit(ui_bridge::click_item(config, mode.as_str(), &id), json, |outcome| {
                println!("{outcome:?}")
            })
        }
    }
}

/// Prints a command result as JSON, or through `render` as text.
fn emit<T: Serialize>(
    result: CommandResult<T>,
    json: bool,
    render: impl FnOnce(T),
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match (result.data, result.error) {
        (Some(data), _) => {
            render(data);
            Ok(())
        }
        (None, Some(error)) => bail!(error),
        (None, None) => bail!("command returned no data"),
    }
}
