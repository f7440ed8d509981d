use crate::error::{Error, Result};
use crate::hop::ProbeSample;
use crate::net::common::ErrorMapper;
use crate::net::extract_tcp_flags;
use crate::net::socket::{Readiness, Socket};
use crate::net::Network;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::instrument;

/// The maximum size of the IP packet we read.
pub const MAX_PACKET_SIZE: usize = 1024;

/// A channel for sending probes and receiving `ICMP` and `TCP` replies.
///
/// The raw receive sockets see every `ICMP` and `TCP` datagram delivered to the host and replies
/// are not matched against the probe, so unrelated traffic arriving within the timeout is
/// attributed to the probe in flight.
pub struct Channel<S: Socket> {
    target_addr: Ipv4Addr,
    send_socket: S,
    icmp_socket: S,
    tcp_socket: S,
}

impl<S: Socket> Channel<S> {
    /// Create a `Channel`.
    ///
    /// All three sockets are raw and so this operation requires the `CAP_NET_RAW` capability on
    /// Linux.
    #[instrument(level = "trace")]
    pub fn connect(target_addr: Ipv4Addr) -> Result<Self> {
        let send_socket = S::new_raw_send_socket_ipv4().map_err(ErrorMapper::socket_creation)?;
        let icmp_socket = S::new_icmp_recv_socket_ipv4().map_err(ErrorMapper::socket_creation)?;
        let tcp_socket = S::new_tcp_recv_socket_ipv4().map_err(ErrorMapper::socket_creation)?;
        Ok(Self {
            target_addr,
            send_socket,
            icmp_socket,
            tcp_socket,
        })
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self, packet), level = "trace")]
    fn send_and_wait(&mut self, packet: &[u8], timeout: Duration) -> Result<ProbeSample> {
        let sent = Instant::now();
        self.send_socket
            .send_to(packet, SocketAddr::new(IpAddr::V4(self.target_addr), 0))
            .map_err(Error::ProbeFailed)?;
        let readiness = match self.icmp_socket.select_readable(&self.tcp_socket, timeout) {
            Ok(readiness) => readiness,
            Err(err) => {
                tracing::warn!(%err, "select failed, treating as a timeout");
                Readiness::default()
            }
        };
        if !readiness.any() {
            tracing::info!("Timeout occurred");
            return Ok(ProbeSample::timeout());
        }
        let mut sample = ProbeSample::timeout();
        if readiness.this {
            if let Some(icmp) = self.recv_icmp(sent)? {
                sample = icmp;
            }
        }
        if readiness.other {
            if let Some(tcp) = self.recv_tcp(sent)? {
                sample = tcp;
            }
        }
        Ok(sample)
    }
}

impl<S: Socket> Channel<S> {
    /// Read a datagram from the `ICMP` socket, the sender is the responding hop.
    fn recv_icmp(&mut self, sent: Instant) -> Result<Option<ProbeSample>> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let Some((_, addr)) = ErrorMapper::would_block(self.icmp_socket.recv_from(&mut buf))?
        else {
            return Ok(None);
        };
        let rtt = sent.elapsed();
        let addr = ipv4_addr(addr)?;
        tracing::debug!(%addr, ?rtt, "icmp reply");
        Ok(Some(ProbeSample::icmp(addr, rtt)))
    }

    /// Read a segment from the `TCP` socket and classify its flags.
    ///
    /// A segment too short to hold the `IPv4` and `TCP` headers is ignored.
    fn recv_tcp(&mut self, sent: Instant) -> Result<Option<ProbeSample>> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let Some((bytes_read, addr)) =
            ErrorMapper::would_block(self.tcp_socket.recv_from(&mut buf))?
        else {
            return Ok(None);
        };
        let rtt = sent.elapsed();
        let addr = ipv4_addr(addr)?;
        let flags = match extract_tcp_flags(&buf[..bytes_read]) {
            Ok(flags) => flags,
            Err(err) => {
                tracing::warn!(%addr, %err, "ignoring malformed tcp reply");
                return Ok(None);
            }
        };
        tracing::debug!(%addr, ?rtt, ?flags, "tcp reply");
        Ok(Some(ProbeSample::tcp(
            addr,
            rtt,
            flags.is_syn_ack(),
            flags.is_rst(),
        )))
    }
}

fn ipv4_addr(addr: Option<SocketAddr>) -> Result<Ipv4Addr> {
    match addr.map(|addr| addr.ip()) {
        Some(IpAddr::V4(addr)) => Ok(addr),
        _ => Err(Error::MissingAddr),
    }
}
