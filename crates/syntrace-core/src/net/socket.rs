use crate::error::IoResult as Result;
use std::net::SocketAddr;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a raw IPv4 socket for sending probes with a caller supplied IP header.
    fn new_raw_send_socket_ipv4() -> Result<Self>;
    /// Create a raw IPv4 socket for receiving ICMP replies.
    fn new_icmp_recv_socket_ipv4() -> Result<Self>;
    /// Create a raw IPv4 socket for receiving TCP replies.
    fn new_tcp_recv_socket_ipv4() -> Result<Self>;
    /// Create (non-raw) IPv4/UDP socket for local address discovery and validation.
    fn new_udp_dgram_socket_ipv4() -> Result<Self>;
    fn bind(&mut self, address: SocketAddr) -> Result<()>;
    fn connect(&mut self, address: SocketAddr) -> Result<()>;
    fn local_addr(&mut self) -> Result<Option<SocketAddr>>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> Result<()>;
    /// Wait for this socket and `other` to become readable.
    ///
    /// Returns which of the two sockets are readable, neither if the timeout elapsed first.
    fn select_readable(&mut self, other: &Self, timeout: Duration) -> Result<Readiness>;
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, Option<SocketAddr>)>;
}

/// The readiness of a pair of sockets returned by `Socket::select_readable`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Readiness {
    /// The socket `select_readable` was called on is readable.
    pub this: bool,
    /// The `other` socket is readable.
    pub other: bool,
}

impl Readiness {
    #[must_use]
    pub const fn any(self) -> bool {
        self.this || self.other
    }
}
