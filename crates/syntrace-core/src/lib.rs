//! Syntrace - A TCP SYN traceroute library.
//!
//! This crate discovers the routers between the local host and a destination by sending crafted
//! `TCP` SYN probes with increasing time-to-live (ttl) values over raw `IPv4` sockets.
//!
//! Each router which drops a probe as its ttl expires replies with an `ICMP` `TimeExceeded`,
//! exposing its address.  The destination itself replies with a `TCP` `SYN+ACK` or `RST`, which
//! ends the trace.  Three probes are sent for each hop.
//!
//! # Example
//!
//! The following example builds and runs a tracer with default configuration
//! and prints out each hop as it completes:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use std::net::Ipv4Addr;
//! use syntrace_core::{Builder, TraceOutcome};
//!
//! let outcome = Builder::new(Ipv4Addr::new(93, 184, 216, 34))
//!     .dest_port(443)
//!     .build()?
//!     .run_with(|hop| println!("{hop}"))?;
//! if let TraceOutcome::Reached(ttl) = outcome {
//!     println!("reached after {ttl} hops");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Raw sockets require elevated privileges (`CAP_NET_RAW` on Linux).
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
//! - [`Tracer::trace`] - Run the tracer over a custom [`Network`].
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]
#![deny(unsafe_code)]

mod builder;
mod config;
mod constants;
mod error;
mod hop;
mod net;
mod strategy;
mod tracer;
mod types;

pub use builder::Builder;
pub use config::defaults;
pub use constants::{MAX_TTL, PROBES_PER_HOP};
pub use error::{Error, IoError, IoOperation, IoResult, Result};
pub use hop::{HopLayout, HopRecord, ProbeSample};
pub use net::Network;
pub use strategy::TraceOutcome;
pub use tracer::Tracer;
pub use types::{Port, TimeToLive};
