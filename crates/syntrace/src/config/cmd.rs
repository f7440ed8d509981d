use crate::config::{LogFormat, LogSpanEvents};
use clap::Parser;
use std::net::Ipv4Addr;

/// Trace the route to a host using TCP SYN probes
#[derive(Parser, Debug)]
#[command(name = "syntrace", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The hostname, URL or IPv4 address to trace
    pub target: String,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// The maximum number of hops to probe [default: 30]
    #[arg(short = 'm', long)]
    pub max_hops: Option<u8>,

    /// The destination TCP port [default: 80]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// How long to wait for a reply to each probe in milliseconds [default: 3500]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// The base source port, the probes of hop n are sent from this port plus n [default: 12345]
    #[arg(long)]
    pub base_src_port: Option<u16>,

    /// The source IP address [default: discovered]
    #[arg(short = 'a', long)]
    pub source_address: Option<Ipv4Addr>,

    /// Keep elevated privileges for the duration of the trace
    #[arg(long)]
    pub no_drop_privileges: bool,

    /// The debug log format [default: pretty]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: syntrace=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}
