//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (handled by clap)
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults (lowest priority)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cli::Args;
use crate::weather::Units;

pub const APP_NAME: &str = "wxday";

pub const CONFIG_ENV: &str = "WXDAY_CONFIG";

pub const CONFIG_FILE: &str = "wxday.toml";

/// Default refresh interval (10 minutes)
pub const DEFAULT_REFRESH_SECS: u64 = 600;

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    CurrentDir(PathBuf),
    XdgConfig(PathBuf),
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Places `filename` may live, in search order: the path named by
/// `env_var`, the current directory, the XDG config home and `/etc`.
fn candidates(env_var: &str, filename: &str) -> Vec<ConfigSource> {
    let mut found = Vec::with_capacity(4);
    if let Some(path) = env::var_os(env_var) {
        found.push(ConfigSource::Explicit(path.into()));
    }
    found.push(ConfigSource::CurrentDir(filename.into()));
    if let Some(home) = config_home() {
        found.push(ConfigSource::XdgConfig(home.join(APP_NAME).join(filename)));
    }
    found.push(ConfigSource::System(
        Path::new("/etc").join(APP_NAME).join(filename),
    ));
    found
}

/// `$XDG_CONFIG_HOME`, else `~/.config`.
fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// First existing config file among the candidates, or `Defaults`.
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    candidates(env_var, filename)
        .into_iter()
        .find(|source| source.path().is_some_and(|p| p.exists()))
        .unwrap_or(ConfigSource::Defaults)
}

/// Load and parse a TOML configuration file, or defaults when there is none.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    match source.path() {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: T = toml::from_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?;
            Ok(config)
        }
        None => Ok(T::default()),
    }
}

/// Contents of `wxday.toml`. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub feed: Option<PathBuf>,
    pub level: Option<String>,
    pub units: Option<Units>,
    pub refresh_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feed: Option<PathBuf>,
    pub level: LevelFilter,
    pub units: Units,
    pub refresh: Duration,
    pub log_file: Option<PathBuf>,
    pub once: bool,
    pub json: bool,
}

impl Settings {
    /// CLI args override file config, file config overrides defaults.
    pub fn resolve(args: Args, file: FileConfig) -> Self {
        let level = args
            .level
            .or(file.level)
            .or_else(|| env::var("RUST_LOG").ok());

        Settings {
            feed: args.feed.or(file.feed),
            level: parse_level(level.as_deref()),
            units: args.units.or(file.units).unwrap_or_default(),
            refresh: Duration::from_secs(
                args.refresh
                    .or(file.refresh_secs)
                    .unwrap_or(DEFAULT_REFRESH_SECS)
                    .max(1),
            ),
            log_file: args.log_file.or(file.log_file),
            once: args.once || args.json,
            json: args.json,
        }
    }
}

pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.map(str::to_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Parse the command line, find and load the config file, and merge the two.
pub fn get_settings(args: Args) -> anyhow::Result<(Settings, ConfigSource)> {
    let source = match args.config {
        Some(ref path) => ConfigSource::Explicit(path.clone()),
        None => find_config_file(CONFIG_ENV, CONFIG_FILE),
    };
    let file_config: FileConfig = load_config(&source)?;
    Ok((Settings::resolve(args, file_config), source))
}
