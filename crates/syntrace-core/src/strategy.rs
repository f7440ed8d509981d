use crate::config::StrategyConfig;
use crate::constants::PROBES_PER_HOP;
use crate::error::{Error, Result};
use crate::hop::{HopRecord, ProbeSample};
use crate::net::{make_probe_packet, Network};
use crate::types::TimeToLive;
use std::net::Ipv4Addr;
use tracing::instrument;

/// The result of a complete trace.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TraceOutcome {
    /// The destination answered at the given hop.
    Reached(TimeToLive),
    /// Every hop up to the maximum was probed without reaching the destination.
    NotReached,
}

/// Trace a path to a target, one hop at a time.
#[derive(Debug, Clone)]
pub struct Strategy<F> {
    config: StrategyConfig,
    publish: F,
}

impl<F: FnMut(&HopRecord)> Strategy<F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: &StrategyConfig, publish: F) -> Self {
        tracing::debug!(?config);
        Self {
            config: *config,
            publish,
        }
    }

    /// Probe each hop in turn and publish a `HopRecord` for each.
    ///
    /// Stops after the first hop at which the destination is reached, or after `max_hops`.
    #[instrument(skip(self, network), level = "trace")]
    pub fn run<N: Network>(mut self, network: &mut N, source_addr: Ipv4Addr) -> Result<TraceOutcome> {
        for ttl in (1..=self.config.max_hops.0).map(TimeToLive) {
            let hop = self.probe_hop(network, source_addr, ttl)?;
            (self.publish)(&hop);
            if hop.reached_destination() {
                tracing::debug!(%ttl, "destination reached");
                return Ok(TraceOutcome::Reached(ttl));
            }
        }
        Ok(TraceOutcome::NotReached)
    }

    /// Send the same probe packet three times and collect one sample per send.
    fn probe_hop<N: Network>(
        &self,
        network: &mut N,
        source_addr: Ipv4Addr,
        ttl: TimeToLive,
    ) -> Result<HopRecord> {
        let src_port = self.config.base_src_port.for_hop(ttl).ok_or_else(|| {
            Error::BadConfig(format!(
                "base_src_port {} + ttl {ttl} exceeds the maximum port",
                self.config.base_src_port
            ))
        })?;
        let packet = make_probe_packet(
            source_addr,
            self.config.target_addr,
            src_port,
            self.config.dest_port,
            ttl,
            u32::from(ttl.0),
        )?;
        tracing::debug!(%ttl, %src_port, "dispatching probes");
        let mut samples = [ProbeSample::timeout(); PROBES_PER_HOP];
        for sample in &mut samples {
            *sample = network.send_and_wait(&packet, self.config.probe_timeout)?;
        }
        Ok(HopRecord::new(ttl, samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use crate::net::{extract_tcp_flags, MockNetwork};
    use crate::types::Port;
    use std::io;
    use std::time::Duration;

    const SRC: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    const TARGET: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 1);
    const RTT: Duration = Duration::from_millis(12);

    fn cfg(max_hops: u8) -> StrategyConfig {
        StrategyConfig {
            target_addr: TARGET,
            max_hops: TimeToLive(max_hops),
            ..Default::default()
        }
    }

    /// The ttl is the 9th byte of the `IPv4` header.
    fn ttl_of(packet: &[u8]) -> u8 {
        packet[8]
    }

    #[test]
    fn test_reached_destination() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network
            .expect_send_and_wait()
            .times(9)
            .returning(|packet, _| match ttl_of(packet) {
                1 => Ok(ProbeSample::icmp(Ipv4Addr::new(10, 0, 0, 1), RTT)),
                2 => Ok(ProbeSample::icmp(Ipv4Addr::new(10, 0, 0, 2), RTT)),
                _ => Ok(ProbeSample::tcp(TARGET, RTT, true, false)),
            });
        let mut hops = vec![];
        let outcome = Strategy::new(&cfg(30), |hop: &HopRecord| hops.push(*hop))
            .run(&mut network, SRC)?;
        assert_eq!(TraceOutcome::Reached(TimeToLive(3)), outcome);
        assert_eq!(3, hops.len());
        assert!(hops[2].reached_destination());
        Ok(())
    }

    #[test]
    fn test_tcp_reply_without_terminal_flag_continues() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network
            .expect_send_and_wait()
            .times(6)
            .returning(|_, _| Ok(ProbeSample::tcp(TARGET, RTT, false, false)));
        let outcome = Strategy::new(&cfg(2), |_: &HopRecord| ()).run(&mut network, SRC)?;
        assert_eq!(TraceOutcome::NotReached, outcome);
        Ok(())
    }

    #[test]
    fn test_single_syn_ack_in_agreeing_hop_stops() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        let mut sent = 0;
        network.expect_send_and_wait().times(3).returning(move |_, _| {
            sent += 1;
            Ok(ProbeSample::tcp(TARGET, RTT, sent == 2, false))
        });
        let mut hops = vec![];
        let outcome = Strategy::new(&cfg(30), |hop: &HopRecord| hops.push(*hop))
            .run(&mut network, SRC)?;
        assert_eq!(TraceOutcome::Reached(TimeToLive(1)), outcome);
        assert_eq!(1, hops.len());
        let terminal = hops[0]
            .samples()
            .iter()
            .filter(|sample| sample.is_terminal())
            .count();
        assert_eq!(1, terminal);
        Ok(())
    }

    #[test]
    fn test_max_hops_one()-> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network
            .expect_send_and_wait()
            .times(3)
            .returning(|_, _| Ok(ProbeSample::timeout()));
        let mut count = 0;
        let outcome =
            Strategy::new(&cfg(1), |_: &HopRecord| count += 1).run(&mut network, SRC)?;
        assert_eq!(TraceOutcome::NotReached, outcome);
        assert_eq!(1, count);
        Ok(())
    }

    #[test]
    fn test_partial_timeout_at_destination_does_not_stop() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        let mut sent = 0;
        network.expect_send_and_wait().times(6).returning(move |_, _| {
            sent += 1;
            if sent == 3 {
                Ok(ProbeSample::timeout())
            } else {
                Ok(ProbeSample::tcp(TARGET, RTT, true, false))
            }
        });
        let outcome = Strategy::new(&cfg(2), |_: &HopRecord| ()).run(&mut network, SRC)?;
        assert_eq!(TraceOutcome::Reached(TimeToLive(2)), outcome);
        Ok(())
    }

    #[test]
    fn test_probe_packet_per_hop() -> anyhow::Result<()> {
        let config = StrategyConfig {
            dest_port: Port(443),
            base_src_port: Port(40000),
            ..cfg(2)
        };
        let mut network = MockNetwork::new();
        network
            .expect_send_and_wait()
            .times(6)
            .returning(move |packet, timeout| {
                assert_eq!(40, packet.len());
                assert_eq!(config.probe_timeout, timeout);
                let ttl = ttl_of(packet);
                // source port, destination port then sequence number
                assert_eq!(40000 + u16::from(ttl), u16::from_be_bytes([packet[20], packet[21]]));
                assert_eq!(443, u16::from_be_bytes([packet[22], packet[23]]));
                assert_eq!(
                    u32::from(ttl),
                    u32::from_be_bytes([packet[24], packet[25], packet[26], packet[27]])
                );
                assert!(extract_tcp_flags(packet).is_ok());
                Ok(ProbeSample::timeout())
            });
        Strategy::new(&config, |_: &HopRecord| ()).run(&mut network, SRC)?;
        Ok(())
    }

    #[test]
    fn test_probe_failed_aborts() {
        let mut network = MockNetwork::new();
        network.expect_send_and_wait().times(1).returning(|_, _| {
            Err(Error::ProbeFailed(IoError::SendTo(
                io::Error::from(io::ErrorKind::Other),
                std::net::SocketAddr::new(std::net::IpAddr::V4(TARGET), 0),
            )))
        });
        let err = Strategy::new(&cfg(30), |_: &HopRecord| ())
            .run(&mut network, SRC)
            .unwrap_err();
        assert!(matches!(err, Error::ProbeFailed(_)));
    }

    #[test]
    fn test_source_port_overflow() {
        let config = StrategyConfig {
            base_src_port: Port(u16::MAX),
            ..cfg(1)
        };
        let mut network = MockNetwork::new();
        network.expect_send_and_wait().never();
        let err = Strategy::new(&config, |_: &HopRecord| ())
            .run(&mut network, SRC)
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }
}
