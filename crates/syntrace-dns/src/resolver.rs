use std::net::IpAddr;
use thiserror::Error;
use tracing::instrument;

/// A DNS resolver.
#[cfg_attr(test, mockall::automock)]
pub trait Resolver {
    /// Perform a blocking DNS hostname lookup and return the resolved IPv4 or IPv6 addresses.
    fn lookup(&self, hostname: &str) -> Result<ResolvedIpAddrs>;
}

/// A DNS resolver error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A DNS resolver error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("DNS lookup of {0} failed: {1}")]
    LookupFailed(String, Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("no IPv4 address found for {0}")]
    NoIpv4Address(String),
}

/// The output of a successful DNS lookup.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ResolvedIpAddrs(Vec<IpAddr>);

impl ResolvedIpAddrs {
    pub fn iter(&self) -> impl Iterator<Item = &'_ IpAddr> {
        self.0.iter()
    }
}

impl From<Vec<IpAddr>> for ResolvedIpAddrs {
    fn from(addrs: Vec<IpAddr>) -> Self {
        Self(addrs)
    }
}

impl IntoIterator for ResolvedIpAddrs {
    type Item = IpAddr;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A resolver backed by the system resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

impl Resolver for DnsResolver {
    #[instrument(skip(self), level = "trace")]
    fn lookup(&self, hostname: &str) -> Result<ResolvedIpAddrs> {
        dns_lookup::lookup_host(hostname)
            .map(ResolvedIpAddrs)
            .map_err(|err| Error::LookupFailed(hostname.to_string(), Box::new(err)))
    }
}
