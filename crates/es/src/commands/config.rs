//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/es/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the config file path.
const CONFIG_PATH_ENV: &str = "ES_CONFIG";

/// Keys accepted by `es config set`.
const SETTABLE_KEYS: [&str; 4] = ["parse.free_text", "parse.source", "output.color", "output.json"];

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# es - Expense search query inspector
#
# Config schema version (do not modify)
version = 1

# Parser defaults (overridden by command-line flags)
[parse]
# free_text = false         # Emit free-text terms as filters without a key
# source = "search"         # Source name shown in error locations

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)
# json = false              # Always print JSON
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Parser defaults.
    #[serde(default)]
    pub parse: ParseConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            parse: ParseConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Emit free-text terms as filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<bool>,

    /// Source name used in error locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Always output JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// Gets the config file path.
///
/// Resolution order: `ES_CONFIG`, then `$XDG_CONFIG_HOME/es/config.toml`,
/// then `~/.config/es/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("es").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("es").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    debug!(path = %path.display(), version = config.version, "loaded config");
    check_version(config)
}

/// Rejects files written by a newer `es` and stamps older ones with the
/// current version.
fn check_version(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to disk, creating the parent directory.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;
    ensure_parent_dir(&path)?;

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("[parse]");
            if let Some(free_text) = config.parse.free_text {
                println!("  free_text: {}", free_text);
            }
            if let Some(ref source) = config.parse.source {
                println!("  source: {}", source);
            }

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
            if let Some(json) = config.output.json {
                println!("  json: {}", json);
            }
        } else {
            println!("(No config file exists. Run 'es config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config init command.
///
/// Writes the commented default config. An existing file is kept unless
/// `force` is set.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {}. Use --force to overwrite",
            path.display()
        )));
    }

    ensure_parent_dir(&path)?;
    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key.split_once('.') {
        Some(("parse", "free_text")) => config.parse.free_text = Some(parse_bool(value)?),
        Some(("parse", "source")) => {
            config.parse.source = (!value.is_empty()).then(|| value.to_string());
        }
        Some(("output", "color")) => config.output.color = Some(parse_bool(value)?),
        Some(("output", "json")) => config.output.json = Some(parse_bool(value)?),
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                SETTABLE_KEYS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Points `ES_CONFIG` at a file inside a fresh temp dir.
    fn with_config_path() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        env::set_var(CONFIG_PATH_ENV, &path);
        (dir, path)
    }

    fn quiet_ctx() -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_bool_values() {
        for value in ["true", "True", "yes", "1", "on"] {
            assert!(parse_bool(value).unwrap(), "{}", value);
        }
        for value in ["false", "FALSE", "no", "0", "off"] {
            assert!(!parse_bool(value).unwrap(), "{}", value);
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.parse.free_text.is_none());
        assert!(config.parse.source.is_none());
        assert!(config.output.color.is_none());
        assert!(config.output.json.is_none());
    }

    #[test]
    fn test_default_config_text_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.parse.free_text.is_none());
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            version: CONFIG_VERSION,
            parse: ParseConfig {
                free_text: Some(true),
                source: Some("search".to_string()),
            },
            output: OutputConfig {
                color: Some(false),
                json: None,
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("[parse]"));
        assert!(toml_str.contains("free_text = true"));
        assert!(toml_str.contains("source = \"search\""));
        assert!(toml_str.contains("color = false"));
        assert!(!toml_str.contains("json"));
    }

    #[test]
    fn test_config_deserialization_partial() {
        let toml_str = r#"
[output]
json = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        // Missing version defaults to current version
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.output.json, Some(true));
        assert!(config.parse.free_text.is_none());
    }

    #[test]
    fn test_check_version_stamps_older_config() {
        let config = Config {
            version: 0,
            parse: ParseConfig {
                free_text: Some(true),
                source: None,
            },
            output: OutputConfig::default(),
        };
        let checked = check_version(config).unwrap();
        assert_eq!(checked.version, CONFIG_VERSION);
        assert_eq!(checked.parse.free_text, Some(true));
    }

    #[test]
    fn test_check_version_rejects_newer_config() {
        let config = Config {
            version: CONFIG_VERSION + 1,
            ..Config::default()
        };
        let err = check_version(config).unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();
        apply_setting(&mut config, "parse.free_text", "yes").unwrap();
        apply_setting(&mut config, "parse.source", "search").unwrap();
        apply_setting(&mut config, "output.color", "off").unwrap();
        apply_setting(&mut config, "output.json", "1").unwrap();
        assert_eq!(config.parse.free_text, Some(true));
        assert_eq!(config.parse.source.as_deref(), Some("search"));
        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.output.json, Some(true));

        apply_setting(&mut config, "parse.source", "").unwrap();
        assert!(config.parse.source.is_none());
    }

    #[test]
    fn test_apply_setting_rejects_unknown_key() {
        let mut config = Config::default();
        let err = apply_setting(&mut config, "output.date_format", "iso").unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
        assert!(err.to_string().contains("parse.free_text"));
        assert!(apply_setting(&mut config, "free_text", "true").is_err());
        assert!(apply_setting(&mut config, "output.color", "maybe").is_err());
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let (_dir, path) = with_config_path();
        assert_eq!(get_config_path().unwrap(), path);
        env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_config_path_xdg() {
        env::remove_var(CONFIG_PATH_ENV);
        let dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", dir.path());
        let path = get_config_path().unwrap();
        env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, dir.path().join("es").join("config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_missing_config_uses_defaults() {
        let (_dir, _path) = with_config_path();
        let config = load_config().unwrap();
        env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.parse.free_text.is_none());
    }

    #[test]
    #[serial]
    fn test_load_invalid_config_is_config_error() {
        let (_dir, path) = with_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "version = \"one\"").unwrap();
        let result = load_config();
        env::remove_var(CONFIG_PATH_ENV);
        assert!(matches!(result, Err(CommandError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_load_newer_config_is_config_error() {
        let (_dir, path) = with_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "version = 999\n").unwrap();
        let result = load_config();
        env::remove_var(CONFIG_PATH_ENV);
        assert!(matches!(result, Err(CommandError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_init_then_set_then_load() {
        let (_dir, path) = with_config_path();
        let ctx = quiet_ctx();

        execute_init(&ctx, false).unwrap();
        assert!(path.exists());
        assert!(execute_init(&ctx, false).is_err());
        execute_init(&ctx, true).unwrap();

        let opts = ConfigSetOptions {
            key: "parse.free_text".to_string(),
            value: "true".to_string(),
        };
        execute_set(&ctx, &opts).unwrap();

        let config = load_config().unwrap();
        env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(config.parse.free_text, Some(true));
    }
}
