//! Configuration system for plancoach.
//!
//! Layers, lowest to highest precedence:
//!
//! 1. **Built-in defaults**: [`schema::PlancoachConfig::default()`]
//! 2. **User config**: `~/.plancoach/config.toml`
//! 3. **Project config**: `.plancoach.toml` in the current directory
//! 4. **Environment variables**: `PLANCOACH_*`
//!
//! File layers are merged key by key: a project file that only sets
//! `chat.send_history` keeps the user file's `backend.base_url`. Malformed
//! files are skipped so a typo never blocks a chat.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::PlancoachConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> PlancoachConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the built-in defaults, in order.
///
/// Missing or unparseable files are ignored. If the merged tree no longer
/// fits the schema (e.g. a string where a number belongs), the last layer
/// that did fit wins.
pub fn load_layers(paths: &[Option<PathBuf>]) -> PlancoachConfig {
    let mut config = PlancoachConfig::default();
    let Ok(mut merged) = toml::Value::try_from(&config) else {
        return config;
    };

    for path in paths.iter().flatten() {
        let Some(layer) = read_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        if let Ok(parsed) = candidate.clone().try_into::<PlancoachConfig>() {
            merged = candidate;
            config = parsed;
        }
    }

    config
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `overlay` onto `base`. Tables merge; everything else
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".plancoach").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".plancoach.toml"))
}

/// Path of the user config file, for display and `config init`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path of the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `PLANCOACH_*` overrides.
///
/// - `PLANCOACH_BACKEND_URL`: service base URL
/// - `PLANCOACH_TIMEOUT_MS`: request timeout
/// - `PLANCOACH_SESSION_COOKIE`: `Cookie` header value
/// - `PLANCOACH_SEND_HISTORY`: send recent turns (`1`/`true`/`yes`/`on`)
/// - `PLANCOACH_HISTORY_WINDOW`: number of turns sent
/// - `PLANCOACH_LOGGING`: activity log on/off
pub fn apply_env_overrides(config: &mut PlancoachConfig) {
    if let Ok(val) = std::env::var("PLANCOACH_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("PLANCOACH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("PLANCOACH_SESSION_COOKIE")
        && !val.is_empty()
    {
        config.backend.session_cookie = Some(val);
    }
    if let Ok(val) = std::env::var("PLANCOACH_SEND_HISTORY") {
        config.chat.send_history = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PLANCOACH_HISTORY_WINDOW")
        && let Ok(n) = val.parse::<usize>()
    {
        config.chat.history_window = n;
    }
    if let Ok(val) = std::env::var("PLANCOACH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// config init / set / reset / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.plancoach/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    write_config_file(&path, &PlancoachConfig::default_toml())?;
    Ok(path)
}

/// Reset the user config file to the annotated defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Set a dotted key (e.g. `chat.send_history`) in the user config file.
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)?;
    Ok(path)
}

/// Set a dotted key in the config file at `path`, creating it from the
/// defaults when absent. The result must still match the schema.
pub fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config as TOML")?
    } else {
        toml::Value::try_from(PlancoachConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<PlancoachConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    write_config_file(path, &output)
}

/// Set `section.leaf` in a TOML tree, keeping the type of any existing value.
fn set_toml_value(root: &mut toml::Value, key: &str, raw: &str) -> Result<()> {
    let Some((section, leaf)) = key.split_once('.') else {
        anyhow::bail!("config key must be 'section.name', got '{key}'");
    };

    let table = root
        .get_mut(section)
        .and_then(toml::Value::as_table_mut)
        .with_context(|| format!("unknown config section '{section}'"))?;

    let value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw)),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(
            raw.parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw}'"))?,
        ),
        _ => toml::Value::String(raw.to_string()),
    };

    table.insert(leaf.to_string(), value);
    Ok(())
}

fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// The effective configuration rendered as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
