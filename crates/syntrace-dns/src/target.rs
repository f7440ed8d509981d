use crate::resolver::{Error, Resolver, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::instrument;

/// A trace target resolved to a single `IPv4` address.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedTarget {
    /// The target host, with any URL scheme and path removed.
    pub hostname: String,
    pub addr: Ipv4Addr,
}

/// Reduce a target to its host part.
///
/// Anything up to and including a `://` scheme separator is removed, as is
/// everything from the first `/` which follows.
#[must_use]
pub fn normalize_target(target: &str) -> &str {
    let host = target
        .find("://")
        .map_or(target, |idx| &target[idx + 3..]);
    host.find('/').map_or(host, |idx| &host[..idx])
}

/// Resolve a target to the first `IPv4` address it maps to.
///
/// Literal `IPv4` addresses are returned without a lookup.
#[instrument(skip(resolver), level = "trace")]
pub fn resolve_target<R: Resolver + ?Sized>(resolver: &R, target: &str) -> Result<ResolvedTarget> {
    let hostname = normalize_target(target);
    if let Ok(addr) = Ipv4Addr::from_str(hostname) {
        return Ok(ResolvedTarget {
            hostname: hostname.to_string(),
            addr,
        });
    }
    let ipv4_addrs = resolver
        .lookup(hostname)?
        .into_iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .collect::<Vec<_>>();
    match ipv4_addrs.as_slice() {
        [] => Err(Error::NoIpv4Address(hostname.to_string())),
        [addr] => Ok(ResolvedTarget {
            hostname: hostname.to_string(),
            addr: *addr,
        }),
        [addr, ..] => {
            tracing::warn!(
                hostname,
                count = ipv4_addrs.len(),
                %addr,
                "multiple IPv4 addresses resolved, using the first"
            );
            Ok(ResolvedTarget {
                hostname: hostname.to_string(),
                addr: *addr,
            })
        }
    }
}
