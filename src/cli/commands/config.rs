//! Config command - show or edit configuration

use crate::cache::Retention;
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{LockscopeError, LockscopeResult};
use crate::ui::{self, UiContext};

const VALID_KEYS: [&str; 4] = [
    "general.log_format",
    "assets.obj_dir",
    "assets.file_name",
    "cache.retention",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> LockscopeResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            apply_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> LockscopeResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> LockscopeResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Apply a dot-separated key to the config
fn apply_value(config: &mut Config, key: &str, value: &str) -> LockscopeResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(LockscopeError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },
        ["assets", "obj_dir"] => config.assets.obj_dir = non_empty(key, value)?,
        ["assets", "file_name"] => config.assets.file_name = non_empty(key, value)?,
        ["cache", "retention"] => config.cache.retention = parse_retention(value)?,
        _ => {
            return Err(LockscopeError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn non_empty(key: &str, value: &str) -> LockscopeResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LockscopeError::User(format!("{} cannot be empty", key)));
    }
    Ok(trimmed.to_string())
}

fn parse_retention(value: &str) -> LockscopeResult<Retention> {
    match value.to_lowercase().as_str() {
        "weak" => Ok(Retention::Weak),
        "pinned" => Ok(Retention::Pinned),
        _ => Err(LockscopeError::User(format!(
            "Invalid retention: {}. Use weak/pinned",
            value
        ))),
    }
}
