//! The Internet one's-complement checksum (RFC 1071).
//!
//! Callers zero the checksum field of a header before computing, so that
//! writing the result back into the header makes the header checksum to zero.

use crate::IpProtocol;
use std::net::Ipv4Addr;

/// The `IPv4` pseudo-header which prefixes a `TCP` segment for checksum purposes.
///
/// This structure is never transmitted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PseudoHeader {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub protocol: IpProtocol,
    pub length: u16,
}

impl PseudoHeader {
    /// The encoded size of the pseudo-header.
    pub const SIZE: usize = 12;

    /// Encode as `source(4) destination(4) reserved(1) protocol(1) length(2)`.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0_u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.source.octets());
        buf[4..8].copy_from_slice(&self.destination.octets());
        buf[9] = self.protocol.id();
        buf[10..12].copy_from_slice(&self.length.to_be_bytes());
        buf
    }
}

/// Calculate the Internet checksum of an arbitrary buffer.
///
/// An odd trailing byte is treated as the high byte of a zero padded word.
/// The checksum of an empty buffer is `0xFFFF`.
#[must_use]
pub fn checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_be_words(data))
}

/// Calculate the checksum for an `IPv4` header.
#[must_use]
pub fn ipv4_header_checksum(header: &[u8]) -> u16 {
    checksum(header)
}

/// Calculate the checksum for an `IPv4` `TCP` segment.
///
/// The result is identical to checksumming the encoded pseudo-header followed
/// by the segment, as the pseudo-header is an even number of bytes.
#[must_use]
pub fn tcp_ipv4_checksum(segment: &[u8], src_addr: Ipv4Addr, dest_addr: Ipv4Addr) -> u16 {
    let pseudo = PseudoHeader {
        source: src_addr,
        destination: dest_addr,
        protocol: IpProtocol::Tcp,
        length: segment.len() as u16,
    };
    let sum = sum_be_words(&pseudo.encode()) + sum_be_words(segment);
    finalize_checksum(sum)
}

fn sum_be_words(data: &[u8]) -> u32 {
    let words = data.chunks_exact(2);
    let trailing = words.remainder().first().map_or(0, |&b| u32::from(b) << 8);
    words
        .map(|word| u32::from(u16::from_be_bytes([word[0], word[1]])))
        .fold(trailing, u32::wrapping_add)
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}
