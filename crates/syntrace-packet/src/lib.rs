//! Packet wire format parsing and building for TCP SYN tracing.
//!
//! The following headers are supported:
//! - `IPv4`
//! - `TCP`
//!
//! Headers are represented as plain structs holding host byte order values
//! which are explicitly encoded to, and decoded from, network byte order
//! (big-endian) at documented fixed offsets.
//!
//! # Example
//!
//! The following example builds a `TCP` SYN segment and fills in the
//! checksum using the `IPv4` pseudo-header:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use std::net::Ipv4Addr;
//! use syntrace_packet::checksum::tcp_ipv4_checksum;
//! use syntrace_packet::tcp::{TcpFlags, TcpHeader};
//!
//! let src = Ipv4Addr::new(10, 0, 0, 103);
//! let dest = Ipv4Addr::new(10, 0, 0, 1);
//! let mut tcp = TcpHeader {
//!     source: 12345,
//!     destination: 80,
//!     sequence: 1,
//!     flags: TcpFlags::SYN,
//!     window_size: 5840,
//!     ..TcpHeader::default()
//! };
//! let mut buf = [0_u8; TcpHeader::minimum_header_size()];
//! tcp.encode(&mut buf)?;
//! tcp.checksum = tcp_ipv4_checksum(&buf, src, dest);
//! tcp.encode(&mut buf)?;
//! assert_eq!(0, tcp_ipv4_checksum(&buf, src, dest));
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions, clippy::cast_possible_truncation)]
#![forbid(unsafe_code)]

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `IPv4` headers.
pub mod ipv4;

/// `TCP` headers.
pub mod tcp;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Tcp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Tcp => 6,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            6 => Self::Tcp,
            p => Self::Other(p),
        }
    }
}
