use crate::config::{LogFormat, LogSpanEvents, SyntraceConfig};
use anyhow::Context;
use std::net::Ipv4Addr;
use syntrace_core::{Builder, TraceOutcome};
use syntrace_dns::{resolve_target, DnsResolver};
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the trace and print each hop to stdout as it completes.
pub fn run_syntrace(cfg: &SyntraceConfig) -> anyhow::Result<()> {
    configure_logging(cfg);
    let target = resolve_target(&DnsResolver, &cfg.target)
        .with_context(|| format!("failed to resolve target: {}", cfg.target))?;
    let tracer = Builder::new(target.addr)
        .source_addr(cfg.source_addr)
        .dest_port(cfg.dest_port)
        .base_src_port(cfg.base_src_port)
        .max_hops(cfg.max_hops)
        .probe_timeout(cfg.timeout)
        .drop_privileges(cfg.drop_privileges)
        .build()?;
    println!(
        "{}",
        header_line(&cfg.target, target.addr, cfg.max_hops, cfg.dest_port)
    );
    let outcome = tracer
        .run_with(|hop| println!("{hop}"))
        .with_context(|| format!("trace to {} failed", target.addr))?;
    match outcome {
        TraceOutcome::Reached(ttl) => tracing::debug!(%ttl, "destination reached"),
        TraceOutcome::NotReached => tracing::debug!("destination not reached"),
    }
    Ok(())
}

/// The line printed before the first hop, naming the target as it was given.
fn header_line(target: &str, addr: Ipv4Addr, max_hops: u8, dest_port: u16) -> String {
    format!("traceroute to {target} ({addr}), {max_hops} hops max, TCP SYN to port {dest_port}")
}

/// Configure the logging subscriber.
///
/// Logs are written to stderr and only when verbose logging is enabled.
fn configure_logging(cfg: &SyntraceConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(std::io::stderr)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(std::io::stderr)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(std::io::stderr)
                    .json()
                    .init();
            }
        }
    }
}
