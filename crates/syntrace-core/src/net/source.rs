use crate::error::{Error, Result};
use crate::net::socket::Socket;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::instrument;

/// Discover or validate a source address.
pub struct SourceAddr;

impl SourceAddr {
    /// Discover the local `Ipv4Addr` the kernel would route traffic to `discovery_addr` from.
    ///
    /// A UDP socket is connected, which sends nothing, and its local address is read back.
    #[instrument(level = "trace")]
    pub fn discover<S: Socket>(discovery_addr: SocketAddr) -> Result<Ipv4Addr> {
        Self::discover_inner::<S>(discovery_addr)
            .map_err(|err| Error::AddressDiscovery(Box::new(err)))
    }

    fn discover_inner<S: Socket>(discovery_addr: SocketAddr) -> Result<Ipv4Addr> {
        let mut socket = S::new_udp_dgram_socket_ipv4()?;
        socket.connect(discovery_addr)?;
        match socket.local_addr()?.map(|addr| addr.ip()) {
            Some(IpAddr::V4(addr)) => Ok(addr),
            _ => Err(Error::MissingAddr),
        }
    }

    /// Validate that we can bind to the source `Ipv4Addr`.
    #[instrument(level = "trace")]
    pub fn validate<S: Socket>(source_addr: Ipv4Addr) -> Result<Ipv4Addr> {
        let mut socket = S::new_udp_dgram_socket_ipv4()?;
        let sock_addr = SocketAddr::new(IpAddr::V4(source_addr), 0);
        match socket.bind(sock_addr) {
            Ok(()) => Ok(source_addr),
            Err(_) => Err(Error::InvalidSourceAddr(source_addr)),
        }
    }
}
