use crate::error::{Error, Result};
use bitflags::bitflags;

const SOURCE_PORT_OFFSET: usize = 0;
const DESTINATION_PORT_OFFSET: usize = 2;
const SEQUENCE_OFFSET: usize = 4;
const ACKNOWLEDGEMENT_OFFSET: usize = 8;
const DATA_OFFSET_AND_FLAGS_OFFSET: usize = 12;
const WINDOW_SIZE_OFFSET: usize = 14;
const CHECKSUM_OFFSET: usize = 16;
const URGENT_POINTER_OFFSET: usize = 18;

bitflags! {
    /// The nine `TCP` control bits.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TcpFlags: u16 {
        const FIN = 0x001;
        const SYN = 0x002;
        const RST = 0x004;
        const PSH = 0x008;
        const ACK = 0x010;
        const URG = 0x020;
        const ECE = 0x040;
        const CWR = 0x080;
        const NS = 0x100;
    }
}

impl TcpFlags {
    /// Is this a `SYN+ACK` (connection accepted) segment?
    #[must_use]
    pub const fn is_syn_ack(self) -> bool {
        self.contains(Self::SYN.union(Self::ACK))
    }

    /// Is this a `RST` (connection refused) segment?
    #[must_use]
    pub const fn is_rst(self) -> bool {
        self.contains(Self::RST)
    }
}

/// Represents a `TCP` header without options.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TcpHeader {
    pub source: u16,
    pub destination: u16,
    pub sequence: u32,
    pub acknowledgement: u32,
    /// The header length in 32-bit words.
    pub data_offset: u8,
    pub flags: TcpFlags,
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
}

impl Default for TcpHeader {
    fn default() -> Self {
        Self {
            source: 0,
            destination: 0,
            sequence: 0,
            acknowledgement: 0,
            data_offset: 5,
            flags: TcpFlags::empty(),
            window_size: 0,
            checksum: 0,
            urgent_pointer: 0,
        }
    }
}

impl TcpHeader {
    #[must_use]
    pub const fn minimum_header_size() -> usize {
        20
    }

    /// Encode this header into the first 20 bytes of `buf`.
    ///
    /// The reserved bits are always written as zero.
    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        check_len(buf.len())?;
        put_u16(buf, SOURCE_PORT_OFFSET, self.source);
        put_u16(buf, DESTINATION_PORT_OFFSET, self.destination);
        put_u32(buf, SEQUENCE_OFFSET, self.sequence);
        put_u32(buf, ACKNOWLEDGEMENT_OFFSET, self.acknowledgement);
        let offset_and_flags = (u16::from(self.data_offset & 0xf) << 12) | self.flags.bits();
        put_u16(buf, DATA_OFFSET_AND_FLAGS_OFFSET, offset_and_flags);
        put_u16(buf, WINDOW_SIZE_OFFSET, self.window_size);
        put_u16(buf, CHECKSUM_OFFSET, self.checksum);
        put_u16(buf, URGENT_POINTER_OFFSET, self.urgent_pointer);
        Ok(())
    }

    /// Decode a header from the first 20 bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf.len())?;
        let offset_and_flags = get_u16(buf, DATA_OFFSET_AND_FLAGS_OFFSET);
        Ok(Self {
            source: get_u16(buf, SOURCE_PORT_OFFSET),
            destination: get_u16(buf, DESTINATION_PORT_OFFSET),
            sequence: get_u32(buf, SEQUENCE_OFFSET),
            acknowledgement: get_u32(buf, ACKNOWLEDGEMENT_OFFSET),
            data_offset: (offset_and_flags >> 12) as u8,
            flags: TcpFlags::from_bits_truncate(offset_and_flags),
            window_size: get_u16(buf, WINDOW_SIZE_OFFSET),
            checksum: get_u16(buf, CHECKSUM_OFFSET),
            urgent_pointer: get_u16(buf, URGENT_POINTER_OFFSET),
        })
    }
}

fn check_len(len: usize) -> Result<()> {
    if len >= TcpHeader::minimum_header_size() {
        Ok(())
    } else {
        Err(Error::InsufficientPacketBuffer(
            String::from("TcpHeader"),
            TcpHeader::minimum_header_size(),
            len,
        ))
    }
}

fn put_u16(buf: &mut [u8], offset: usize, val: u16) {
    buf[offset..offset + 2].copy_from_slice(&val.to_be_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, val: u32) {
    buf[offset..offset + 4].copy_from_slice(&val.to_be_bytes());
}

const fn get_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

const fn get_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use test_case::test_case;

    #[test]
    fn test_encode_syn() {
        let tcp = TcpHeader {
            source: 12346,
            destination: 80,
            sequence: 1,
            flags: TcpFlags::SYN,
            window_size: 5840,
            ..TcpHeader::default()
        };
        let mut buf = [0_u8; TcpHeader::minimum_header_size()];
        tcp.encode(&mut buf).unwrap();
        assert_eq!(
            hex!("30 3a 00 50 00 00 00 01 00 00 00 00 50 02 16 d0 00 00 00 00"),
            buf
        );
    }

    #[test]
    fn test_data_offset_and_flags() {
        let tcp = TcpHeader {
            data_offset: 15,
            flags: TcpFlags::all(),
            ..TcpHeader::default()
        };
        let mut buf = [0_u8; TcpHeader::minimum_header_size()];
        tcp.encode(&mut buf).unwrap();
        assert_eq!([0xF1, 0xFF], buf[12..=13]);
    }

    #[test]
    fn test_decode_syn_ack() {
        let buf = hex!("00 50 80 ea 00 00 00 00 95 9d 2e c7 50 12 ff ff 55 cc 00 00");
        let tcp = TcpHeader::decode(&buf).unwrap();
        assert_eq!(80, tcp.source);
        assert_eq!(33002, tcp.destination);
        assert_eq!(0, tcp.sequence);
        assert_eq!(0x959d_2ec7, tcp.acknowledgement);
        assert_eq!(5, tcp.data_offset);
        assert_eq!(TcpFlags::SYN | TcpFlags::ACK, tcp.flags);
        assert_eq!(0xffff, tcp.window_size);
        assert_eq!(0x55cc, tcp.checksum);
        assert_eq!(0, tcp.urgent_pointer);
        assert!(tcp.flags.is_syn_ack());
        assert!(!tcp.flags.is_rst());
    }

    #[test]
    fn test_decode_ignores_reserved_bits() {
        let buf = hex!("00 50 30 39 00 00 00 00 00 00 00 01 5e 14 00 00 00 00 00 00");
        let tcp = TcpHeader::decode(&buf).unwrap();
        assert_eq!(5, tcp.data_offset);
        assert_eq!(TcpFlags::RST | TcpFlags::ACK, tcp.flags);
    }

    #[test_case(TcpFlags::SYN, false, false)]
    #[test_case(TcpFlags::ACK, false, false)]
    #[test_case(TcpFlags::SYN | TcpFlags::ACK, true, false)]
    #[test_case(TcpFlags::RST, false, true)]
    #[test_case(TcpFlags::RST | TcpFlags::ACK, false, true)]
    fn test_flag_classification(flags: TcpFlags, syn_ack: bool, rst: bool) {
        assert_eq!(syn_ack, flags.is_syn_ack());
        assert_eq!(rst, flags.is_rst());
    }

    #[test]
    fn test_insufficient_buffer() {
        let err = TcpHeader::decode(&[0_u8; 8]).unwrap_err();
        assert_eq!(
            Error::InsufficientPacketBuffer(String::from("TcpHeader"), 20, 8),
            err
        );
    }
}
