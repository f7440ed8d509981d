use crate::constants::{PROBE_IDENTIFICATION, PROBE_PACKET_SIZE, PROBE_WINDOW_SIZE};
use crate::error::Result;
use crate::types::{Port, TimeToLive};
use std::net::Ipv4Addr;
use syntrace_packet::checksum::{ipv4_header_checksum, tcp_ipv4_checksum};
use syntrace_packet::ipv4::Ipv4Header;
use syntrace_packet::tcp::{TcpFlags, TcpHeader};
use syntrace_packet::IpProtocol;
use tracing::instrument;

const IP_HEADER_SIZE: usize = Ipv4Header::minimum_header_size();

/// Build a complete `IPv4` + `TCP` SYN probe with both checksums filled in.
///
/// The `ttl` only affects the `IPv4` header, the `TCP` segment depends on the ports and `sequence`.
///
/// The `TCP` header is checksummed with the `IPv4` pseudo-header, the `IPv4` header on its own.
#[instrument(level = "trace")]
pub fn make_probe_packet(
    src_addr: Ipv4Addr,
    dest_addr: Ipv4Addr,
    src_port: Port,
    dest_port: Port,
    ttl: TimeToLive,
    sequence: u32,
) -> Result<[u8; PROBE_PACKET_SIZE]> {
    let mut buf = [0_u8; PROBE_PACKET_SIZE];
    let (ip_buf, tcp_buf) = buf.split_at_mut(IP_HEADER_SIZE);
    let mut ip = Ipv4Header {
        total_length: PROBE_PACKET_SIZE as u16,
        identification: PROBE_IDENTIFICATION,
        ttl: ttl.0,
        protocol: IpProtocol::Tcp,
        source: src_addr,
        destination: dest_addr,
        ..Ipv4Header::default()
    };
    ip.encode(ip_buf)?;
    ip.checksum = ipv4_header_checksum(ip_buf);
    ip.encode(ip_buf)?;
    let mut tcp = TcpHeader {
        source: src_port.0,
        destination: dest_port.0,
        sequence,
        flags: TcpFlags::SYN,
        window_size: PROBE_WINDOW_SIZE,
        ..TcpHeader::default()
    };
    tcp.encode(tcp_buf)?;
    tcp.checksum = tcp_ipv4_checksum(tcp_buf, src_addr, dest_addr);
    tcp.encode(tcp_buf)?;
    Ok(buf)
}

/// Extract the `TCP` flags from a packet read from a raw `TCP` socket.
///
/// The packet starts with the `IPv4` header, which may carry options.
pub fn extract_tcp_flags(packet: &[u8]) -> Result<TcpFlags> {
    let ip = Ipv4Header::decode(packet)?;
    let tcp = TcpHeader::decode(ip.payload(packet))?;
    Ok(tcp.flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use hex_literal::hex;

    const SRC: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    const DEST: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

    #[test]
    fn test_make_probe_packet() -> anyhow::Result<()> {
        let expected = hex!(
            "
            45 00 00 28 d4 31 00 00 01 06 ee 11 c0 a8 01 0a
            5d b8 d8 22 30 3a 00 50 00 00 00 01 00 00 00 00
            50 02 16 d0 70 fa 00 00
            "
        );
        let packet = make_probe_packet(SRC, DEST, Port(12346), Port(80), TimeToLive(1), 1)?;
        assert_eq!(expected, packet);
        Ok(())
    }

    #[test]
    fn test_checksums_verify() -> anyhow::Result<()> {
        let packet = make_probe_packet(SRC, DEST, Port(12375), Port(443), TimeToLive(30), 30)?;
        assert_eq!(0, ipv4_header_checksum(&packet[..IP_HEADER_SIZE]));
        assert_eq!(0, tcp_ipv4_checksum(&packet[IP_HEADER_SIZE..], SRC, DEST));
        Ok(())
    }

    #[test]
    fn test_ttl_only_changes_ip_header() -> anyhow::Result<()> {
        let first = make_probe_packet(SRC, DEST, Port(12346), Port(80), TimeToLive(1), 1)?;
        let second = make_probe_packet(SRC, DEST, Port(12346), Port(80), TimeToLive(2), 1)?;
        assert_eq!(first[IP_HEADER_SIZE..], second[IP_HEADER_SIZE..]);
        let changed = (0..PROBE_PACKET_SIZE)
            .filter(|&i| first[i] != second[i])
            .collect::<Vec<_>>();
        // the ttl byte and the ip header checksum
        assert!(changed.iter().all(|i| [8, 10, 11].contains(i)));
        assert!(changed.contains(&8));
        let expected_ip = hex!("45 00 00 28 d4 31 00 00 02 06 ed 11 c0 a8 01 0a 5d b8 d8 22");
        assert_eq!(expected_ip, second[..IP_HEADER_SIZE]);
        Ok(())
    }

    #[test]
    fn test_sequence_only_changes_tcp_segment() -> anyhow::Result<()> {
        let first = make_probe_packet(SRC, DEST, Port(12346), Port(80), TimeToLive(2), 1)?;
        let second = make_probe_packet(SRC, DEST, Port(12346), Port(80), TimeToLive(2), 2)?;
        assert_eq!(first[..IP_HEADER_SIZE], second[..IP_HEADER_SIZE]);
        let tcp = TcpHeader::decode(&second[IP_HEADER_SIZE..])?;
        assert_eq!(2, tcp.sequence);
        assert_eq!(TcpFlags::SYN, tcp.flags);
        assert_eq!(0, tcp_ipv4_checksum(&second[IP_HEADER_SIZE..], SRC, DEST));
        Ok(())
    }

    #[test]
    fn test_extract_syn_ack() -> anyhow::Result<()> {
        let packet = hex!(
            "
            45 00 00 28 00 00 40 00 38 06 00 00 5d b8 d8 22
            c0 a8 01 0a 00 50 30 3a 12 34 56 78 00 00 00 02
            50 12 ff ff 00 00 00 00
            "
        );
        let flags = extract_tcp_flags(&packet)?;
        assert!(flags.is_syn_ack());
        assert!(!flags.is_rst());
        Ok(())
    }

    #[test]
    fn test_extract_rst_with_ip_options() -> anyhow::Result<()> {
        let packet = hex!(
            "
            46 00 00 2c 00 00 40 00 38 06 00 00 5d b8 d8 22
            c0 a8 01 0a 01 01 01 01 00 50 30 3a 00 00 00 00
            00 00 00 02 50 14 00 00 00 00 00 00
            "
        );
        let flags = extract_tcp_flags(&packet)?;
        assert!(flags.is_rst());
        assert!(!flags.is_syn_ack());
        Ok(())
    }

    #[test]
    fn test_extract_truncated() {
        let packet = hex!("45 00 00 28 00 00 40 00 38 06 00 00 5d b8 d8 22 c0 a8 01 0a 00 50");
        let err = extract_tcp_flags(&packet).unwrap_err();
        assert!(matches!(err, Error::PacketError(_)));
    }
}
