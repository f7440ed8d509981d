use crate::error::{Error, Result};
use crate::IpProtocol;
use std::net::Ipv4Addr;

const VERSION_OFFSET: usize = 0;
const IHL_OFFSET: usize = 0;
const TOS_OFFSET: usize = 1;
const TOTAL_LENGTH_OFFSET: usize = 2;
const IDENTIFICATION_OFFSET: usize = 4;
const FLAGS_AND_FRAGMENT_OFFSET_OFFSET: usize = 6;
const TIME_TO_LIVE_OFFSET: usize = 8;
const PROTOCOL_OFFSET: usize = 9;
const CHECKSUM_OFFSET: usize = 10;
const SOURCE_OFFSET: usize = 12;
const DESTINATION_OFFSET: usize = 16;

/// Represents an `IPv4` header without options.
///
/// All fields are held in host byte order and converted to network byte order
/// by [`Ipv4Header::encode`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Ipv4Header {
    pub version: u8,
    /// The header length in 32-bit words.
    pub header_length: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags_and_fragment_offset: u16,
    pub ttl: u8,
    pub protocol: IpProtocol,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Default for Ipv4Header {
    fn default() -> Self {
        Self {
            version: 4,
            header_length: 5,
            tos: 0,
            total_length: 0,
            identification: 0,
            flags_and_fragment_offset: 0,
            ttl: 0,
            protocol: IpProtocol::Tcp,
            checksum: 0,
            source: Ipv4Addr::UNSPECIFIED,
            destination: Ipv4Addr::UNSPECIFIED,
        }
    }
}

impl Ipv4Header {
    #[must_use]
    pub const fn minimum_header_size() -> usize {
        20
    }

    /// Encode this header into the first 20 bytes of `buf`.
    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        check_len(buf.len())?;
        buf[VERSION_OFFSET] = ((self.version & 0xf) << 4) | (self.header_length & 0xf);
        buf[TOS_OFFSET] = self.tos;
        put_u16(buf, TOTAL_LENGTH_OFFSET, self.total_length);
        put_u16(buf, IDENTIFICATION_OFFSET, self.identification);
        put_u16(
            buf,
            FLAGS_AND_FRAGMENT_OFFSET_OFFSET,
            self.flags_and_fragment_offset,
        );
        buf[TIME_TO_LIVE_OFFSET] = self.ttl;
        buf[PROTOCOL_OFFSET] = self.protocol.id();
        put_u16(buf, CHECKSUM_OFFSET, self.checksum);
        buf[SOURCE_OFFSET..SOURCE_OFFSET + 4].copy_from_slice(&self.source.octets());
        buf[DESTINATION_OFFSET..DESTINATION_OFFSET + 4]
            .copy_from_slice(&self.destination.octets());
        Ok(())
    }

    /// Decode a header from the first 20 bytes of `buf`.
    ///
    /// Any options are not decoded, use [`Ipv4Header::payload`] to skip them.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf.len())?;
        let header_length = buf[IHL_OFFSET] & 0xf;
        if usize::from(header_length) * 4 < Self::minimum_header_size() {
            return Err(Error::InvalidHeaderLength(
                String::from("Ipv4Header"),
                usize::from(header_length) * 4,
            ));
        }
        Ok(Self {
            version: (buf[VERSION_OFFSET] & 0xf0) >> 4,
            header_length,
            tos: buf[TOS_OFFSET],
            total_length: get_u16(buf, TOTAL_LENGTH_OFFSET),
            identification: get_u16(buf, IDENTIFICATION_OFFSET),
            flags_and_fragment_offset: get_u16(buf, FLAGS_AND_FRAGMENT_OFFSET_OFFSET),
            ttl: buf[TIME_TO_LIVE_OFFSET],
            protocol: IpProtocol::from(buf[PROTOCOL_OFFSET]),
            checksum: get_u16(buf, CHECKSUM_OFFSET),
            source: Ipv4Addr::from(get_octets(buf, SOURCE_OFFSET)),
            destination: Ipv4Addr::from(get_octets(buf, DESTINATION_OFFSET)),
        })
    }

    /// The header length in bytes, including any options.
    #[must_use]
    pub const fn header_len(&self) -> usize {
        self.header_length as usize * 4
    }

    /// The bytes of `packet` which follow this header and its options.
    ///
    /// Returns an empty slice if the declared header length exceeds the packet.
    #[must_use]
    pub fn payload<'a>(&self, packet: &'a [u8]) -> &'a [u8] {
        packet.get(self.header_len()..).unwrap_or_default()
    }
}

fn check_len(len: usize) -> Result<()> {
    if len >= Ipv4Header::minimum_header_size() {
        Ok(())
    } else {
        Err(Error::InsufficientPacketBuffer(
            String::from("Ipv4Header"),
            Ipv4Header::minimum_header_size(),
            len,
        ))
    }
}

fn put_u16(buf: &mut [u8], offset: usize, val: u16) {
    buf[offset..offset + 2].copy_from_slice(&val.to_be_bytes());
}

const fn get_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

const fn get_octets(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn header() -> Ipv4Header {
        Ipv4Header {
            total_length: 40,
            identification: 54321,
            ttl: 1,
            source: Ipv4Addr::new(192, 168, 1, 10),
            destination: Ipv4Addr::new(93, 184, 216, 34),
            ..Ipv4Header::default()
        }
    }

    #[test]
    fn test_encode() {
        let mut buf = [0_u8; Ipv4Header::minimum_header_size()];
        header().encode(&mut buf).unwrap();
        assert_eq!(
            hex!("45 00 00 28 d4 31 00 00 01 06 00 00 c0 a8 01 0a 5d b8 d8 22"),
            buf
        );
    }

    #[test]
    fn test_version_and_header_length() {
        let mut buf = [0_u8; Ipv4Header::minimum_header_size()];
        let ipv4 = Ipv4Header {
            version: 15,
            header_length: 15,
            ..header()
        };
        ipv4.encode(&mut buf).unwrap();
        assert_eq!([0xFF], buf[..1]);
    }

    #[test]
    fn test_flags() {
        let mut buf = [0_u8; Ipv4Header::minimum_header_size()];
        // The Don't Fragment (DF) bit set:
        let ipv4 = Ipv4Header {
            flags_and_fragment_offset: 0x4000,
            ..header()
        };
        ipv4.encode(&mut buf).unwrap();
        assert_eq!([0x40, 0x00], buf[6..=7]);
    }

    #[test]
    fn test_decode() {
        let buf = hex!("45 00 00 28 d4 31 00 00 01 06 ee 11 c0 a8 01 0a 5d b8 d8 22");
        let ipv4 = Ipv4Header::decode(&buf).unwrap();
        assert_eq!(4, ipv4.version);
        assert_eq!(5, ipv4.header_length);
        assert_eq!(20, ipv4.header_len());
        assert_eq!(0, ipv4.tos);
        assert_eq!(40, ipv4.total_length);
        assert_eq!(54321, ipv4.identification);
        assert_eq!(0, ipv4.flags_and_fragment_offset);
        assert_eq!(1, ipv4.ttl);
        assert_eq!(IpProtocol::Tcp, ipv4.protocol);
        assert_eq!(0xee11, ipv4.checksum);
        assert_eq!(Ipv4Addr::new(192, 168, 1, 10), ipv4.source);
        assert_eq!(Ipv4Addr::new(93, 184, 216, 34), ipv4.destination);
    }

    #[test]
    fn test_payload_skips_options() {
        let buf = hex!(
            "
            46 00 00 20 00 00 00 00 40 06 00 00 0a 00 00 01 0a 00 00 02
            01 01 01 00
            aa bb cc dd
            "
        );
        let ipv4 = Ipv4Header::decode(&buf).unwrap();
        assert_eq!(24, ipv4.header_len());
        assert_eq!(&hex!("aa bb cc dd"), ipv4.payload(&buf));
    }

    #[test]
    fn test_payload_truncated() {
        let buf = hex!("4f 00 00 14 00 00 00 00 40 06 00 00 0a 00 00 01 0a 00 00 02");
        let ipv4 = Ipv4Header::decode(&buf).unwrap();
        assert!(ipv4.payload(&buf).is_empty());
    }

    #[test]
    fn test_invalid_header_length() {
        let buf = hex!("44 00 00 14 00 00 00 00 40 06 00 00 0a 00 00 01 0a 00 00 02");
        let err = Ipv4Header::decode(&buf).unwrap_err();
        assert_eq!(
            Error::InvalidHeaderLength(String::from("Ipv4Header"), 16),
            err
        );
    }

    #[test]
    fn test_insufficient_buffer() {
        let mut buf = [0_u8; 19];
        let err = header().encode(&mut buf).unwrap_err();
        assert_eq!(
            Error::InsufficientPacketBuffer(String::from("Ipv4Header"), 20, 19),
            err
        );
        assert!(Ipv4Header::decode(&buf).is_err());
    }
}
