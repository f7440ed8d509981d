use crate::types::{Port, TimeToLive};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
    use std::time::Duration;

    /// The default value for `max-hops`.
    pub const DEFAULT_MAX_HOPS: u8 = 30;

    /// The default value for `port`.
    pub const DEFAULT_DEST_PORT: u16 = 80;

    /// The default value for `timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3500);

    /// The default value for `base-src-port`.
    ///
    /// The probes of each hop are sent from this port plus the hop number.
    pub const DEFAULT_BASE_SRC_PORT: u16 = 12345;

    /// The default value for `drop-privileges`.
    pub const DEFAULT_DROP_PRIVILEGES: bool = false;

    /// The address used to discover the local outbound address.
    ///
    /// No packets are sent to this address.
    pub const DEFAULT_DISCOVERY_ADDR: SocketAddr =
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 80));
}

/// The configuration of the hop by hop trace.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StrategyConfig {
    pub target_addr: Ipv4Addr,
    pub dest_port: Port,
    pub base_src_port: Port,
    pub max_hops: TimeToLive,
    pub probe_timeout: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
            dest_port: Port(defaults::DEFAULT_DEST_PORT),
            base_src_port: Port(defaults::DEFAULT_BASE_SRC_PORT),
            max_hops: TimeToLive(defaults::DEFAULT_MAX_HOPS),
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }
}
