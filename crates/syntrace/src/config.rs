use anyhow::anyhow;
use clap::ValueEnum;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use syntrace_core::{defaults, MAX_TTL};
use syntrace_privilege::Privilege;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;
use file::{read_config_file, read_default_config_file, ConfigFile};

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Fully parsed and validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct SyntraceConfig {
    pub target: String,
    pub max_hops: u8,
    pub dest_port: u16,
    pub timeout: Duration,
    pub base_src_port: u16,
    pub source_addr: Option<Ipv4Addr>,
    pub drop_privileges: bool,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl SyntraceConfig {
    /// Layer the command line arguments over the config file and the defaults.
    pub fn from(args: Args, privilege: &Privilege) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            read_config_file(cfg)?
        } else if let Some(cfg) = read_default_config_file()? {
            cfg
        } else {
            ConfigFile::default()
        };
        Self::build_config(args, cfg_file, privilege)
    }

    fn build_config(
        args: Args,
        cfg_file: ConfigFile,
        privilege: &Privilege,
    ) -> anyhow::Result<Self> {
        let cfg_file_trace = cfg_file.trace.unwrap_or_default();
        let cfg_file_log = cfg_file.log.unwrap_or_default();
        let max_hops = cfg_layer(
            args.max_hops,
            cfg_file_trace.max_hops,
            defaults::DEFAULT_MAX_HOPS,
        );
        let dest_port = cfg_layer(
            args.port,
            cfg_file_trace.port,
            defaults::DEFAULT_DEST_PORT,
        );
        let timeout = cfg_layer(
            args.timeout.map(Duration::from_millis),
            cfg_file_trace.timeout.map(Duration::from_millis),
            defaults::DEFAULT_PROBE_TIMEOUT,
        );
        let base_src_port = cfg_layer(
            args.base_src_port,
            cfg_file_trace.base_src_port,
            defaults::DEFAULT_BASE_SRC_PORT,
        );
        let source_addr = cfg_layer_opt(args.source_address, cfg_file_trace.source_address);
        let drop_privileges = if args.no_drop_privileges {
            false
        } else {
            cfg_file_trace
                .drop_privileges
                .unwrap_or(constants::DEFAULT_DROP_PRIVILEGES)
        };
        let verbose = cfg_layer_bool_flag(
            args.verbose,
            cfg_file_log.verbose,
            constants::DEFAULT_VERBOSE,
        );
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_log.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_log.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_log.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        validate_privilege(privilege.has_privileges())?;
        validate_max_hops(max_hops)?;
        validate_timeout(timeout)?;
        validate_src_port(base_src_port, max_hops)?;
        Ok(Self {
            target: args.target,
            max_hops,
            dest_port,
            timeout,
            base_src_port,
            source_addr,
            drop_privileges,
            verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for SyntraceConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_hops: defaults::DEFAULT_MAX_HOPS,
            dest_port: defaults::DEFAULT_DEST_PORT,
            timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            base_src_port: defaults::DEFAULT_BASE_SRC_PORT,
            source_addr: None,
            drop_privileges: constants::DEFAULT_DROP_PRIVILEGES,
            verbose: constants::DEFAULT_VERBOSE,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

fn cfg_layer_opt<T>(fst: Option<T>, snd: Option<T>) -> Option<T> {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => Some(val),
        (None, None) => None,
    }
}

const fn cfg_layer_bool_flag(fst: bool, snd: Option<bool>, default: bool) -> bool {
    match (fst, snd) {
        (true, _) => true,
        (false, Some(val)) => val,
        (false, None) => default,
    }
}

/// Validate privileges.
///
/// Tracing requires raw sockets and so there is no unprivileged mode.
fn validate_privilege(has_privileges: bool) -> anyhow::Result<()> {
    if has_privileges {
        Ok(())
    } else {
        Err(anyhow!(
            "privileges are required (hint: run as root or grant the CAP_NET_RAW capability)"
        ))
    }
}

/// Validate `max_hops`.
fn validate_max_hops(max_hops: u8) -> anyhow::Result<()> {
    if (1..=MAX_TTL).contains(&max_hops) {
        Ok(())
    } else {
        Err(anyhow!(
            "max-hops ({max_hops}) must be between 1 and {MAX_TTL} inclusive"
        ))
    }
}

/// Validate the probe `timeout`.
fn validate_timeout(timeout: Duration) -> anyhow::Result<()> {
    if timeout.is_zero() {
        Err(anyhow!("timeout must be greater than zero"))
    } else {
        Ok(())
    }
}

/// Validate that the source port of the last hop fits in a port.
fn validate_src_port(base_src_port: u16, max_hops: u8) -> anyhow::Result<()> {
    if base_src_port.checked_add(u16::from(max_hops)).is_some() {
        Ok(())
    } else {
        Err(anyhow!(
            "base-src-port ({base_src_port}) plus max-hops ({max_hops}) must not exceed {}",
            u16::MAX
        ))
    }
}
