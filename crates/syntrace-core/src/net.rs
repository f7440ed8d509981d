use crate::error::Result;
use crate::hop::ProbeSample;
use std::time::Duration;

/// Common types and helper functions.
mod common;

/// IPv4 probe packets.
mod ipv4;

/// Platform specific network code.
mod platform;

/// A network socket.
mod socket;

/// A channel for sending probes and receiving replies.
pub mod channel;

/// Determine the source address.
pub mod source;

pub use ipv4::{extract_tcp_flags, make_probe_packet};

/// The platform specific socket type.
pub use platform::SocketImpl;

/// An abstraction over a network interface for tracing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send a probe `packet` and wait up to `timeout` for a reply.
    ///
    /// Returns a timed out `ProbeSample` if nothing was received in time.
    fn send_and_wait(&mut self, packet: &[u8], timeout: Duration) -> Result<ProbeSample>;
}
