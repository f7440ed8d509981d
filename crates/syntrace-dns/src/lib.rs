//! Resolve a trace target to a single `IPv4` address.
//!
//! A target may be a literal `IPv4` address, a hostname or a URL.  URLs are
//! reduced to their host part before resolution, so `https://example.com/a/b`
//! resolves `example.com`.  When a hostname resolves to several `IPv4`
//! addresses the first one is used.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use syntrace_dns::{resolve_target, DnsResolver};
//!
//! let target = resolve_target(&DnsResolver, "https://example.com/index.html")?;
//! println!("{} resolved to {}", target.hostname, target.addr);
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod resolver;
mod target;

pub use resolver::{DnsResolver, Error, ResolvedIpAddrs, Resolver, Result};
pub use target::{normalize_target, resolve_target, ResolvedTarget};
