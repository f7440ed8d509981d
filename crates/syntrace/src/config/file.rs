use crate::config::{constants, LogFormat, LogSpanEvents};
use anyhow::Context;
use etcetera::BaseStrategy;
use serde::Deserialize;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use syntrace_core::defaults;

const DEFAULT_CONFIG_FILE: &str = "syntrace.toml";
const DEFAULT_HIDDEN_CONFIG_FILE: &str = ".syntrace.toml";

/// Read the config from the default location of user config for the platform.
///
/// Returns the parsed `Some(ConfigFile)` if the config file exists, `None` otherwise.
///
/// Syntrace will attempt to locate a `syntrace.toml` or `.syntrace.toml`
/// config file in one of the following locations:
///     - the current directory
///     - the user home directory
///     - the XDG config directory: `$XDG_CONFIG_HOME` or `~/.config`
///     - the XDG app config directory: `$XDG_CONFIG_HOME/syntrace` or `~/.config/syntrace`
///
/// Note that only the first config file found is used, no attempt is
/// made to merge the values from multiple files.
pub fn read_default_config_file() -> anyhow::Result<Option<ConfigFile>> {
    use etcetera::base_strategy as base;
    if let Some(file) = read_files("")? {
        Ok(Some(file))
    } else {
        let basedirs = base::choose_base_strategy()?;
        if let Some(file) = read_files(basedirs.home_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir().join("syntrace"))? {
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }
}

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let contents = fs::read_to_string(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("invalid config file: {}", path.as_ref().display()))
}

fn read_files<P: AsRef<Path>>(dir: P) -> anyhow::Result<Option<ConfigFile>> {
    if let Some(file) = read_file(dir.as_ref(), DEFAULT_CONFIG_FILE)? {
        Ok(Some(file))
    } else if let Some(file) = read_file(dir.as_ref(), DEFAULT_HIDDEN_CONFIG_FILE)? {
        Ok(Some(file))
    } else {
        Ok(None)
    }
}

fn read_file<P: AsRef<Path>>(dir: P, file: &str) -> anyhow::Result<Option<ConfigFile>> {
    let path = dir.as_ref().join(file);
    if path.exists() {
        Ok(Some(read_config_file(path)?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub trace: Option<ConfigTrace>,
    pub log: Option<ConfigLog>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            trace: Some(ConfigTrace::default()),
            log: Some(ConfigLog::default()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigTrace {
    pub max_hops: Option<u8>,
    pub port: Option<u16>,
    /// The probe timeout in milliseconds.
    pub timeout: Option<u64>,
    pub base_src_port: Option<u16>,
    pub source_address: Option<Ipv4Addr>,
    pub drop_privileges: Option<bool>,
}

impl Default for ConfigTrace {
    fn default() -> Self {
        Self {
            max_hops: Some(defaults::DEFAULT_MAX_HOPS),
            port: Some(defaults::DEFAULT_DEST_PORT),
            timeout: Some(defaults::DEFAULT_PROBE_TIMEOUT.as_millis() as u64),
            base_src_port: Some(defaults::DEFAULT_BASE_SRC_PORT),
            source_address: None,
            drop_privileges: Some(constants::DEFAULT_DROP_PRIVILEGES),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLog {
    pub verbose: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigLog {
    fn default() -> Self {
        Self {
            verbose: Some(constants::DEFAULT_VERBOSE),
            log_format: Some(constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}
