use crate::config::{defaults, StrategyConfig};
use crate::error::{Error, Result};
use crate::types::{Port, TimeToLive};
use crate::{Tracer, MAX_TTL};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Build a tracer.
///
/// This is a convenience builder to simplify the creation of a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::net::Ipv4Addr;
/// use std::time::Duration;
/// use syntrace_core::Builder;
///
/// let tracer = Builder::new(Ipv4Addr::new(93, 184, 216, 34))
///     .dest_port(443)
///     .max_hops(20)
///     .probe_timeout(Duration::from_secs(2))
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Tracer`] - A TCP SYN traceroute implementation.
#[derive(Debug)]
pub struct Builder {
    source_addr: Option<Ipv4Addr>,
    target_addr: Ipv4Addr,
    dest_port: Port,
    base_src_port: Port,
    max_hops: TimeToLive,
    probe_timeout: Duration,
    drop_privileges: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            source_addr: None,
            target_addr: StrategyConfig::default().target_addr,
            dest_port: StrategyConfig::default().dest_port,
            base_src_port: StrategyConfig::default().base_src_port,
            max_hops: StrategyConfig::default().max_hops,
            probe_timeout: StrategyConfig::default().probe_timeout,
            drop_privileges: defaults::DEFAULT_DROP_PRIVILEGES,
        }
    }
}

impl Builder {
    /// Build a tracer builder for a given target.
    #[must_use]
    pub fn new(target_addr: Ipv4Addr) -> Self {
        Self {
            target_addr,
            ..Default::default()
        }
    }

    /// Set the source address.
    ///
    /// If not set then the source address will be discovered from the routing table.
    #[must_use]
    pub fn source_addr(self, source_addr: Option<Ipv4Addr>) -> Self {
        Self {
            source_addr,
            ..self
        }
    }

    /// Set the destination `TCP` port.
    #[must_use]
    pub fn dest_port(self, dest_port: u16) -> Self {
        Self {
            dest_port: Port(dest_port),
            ..self
        }
    }

    /// Set the base source port.
    ///
    /// The probes for hop `n` are sent from `base_src_port + n`.
    #[must_use]
    pub fn base_src_port(self, base_src_port: u16) -> Self {
        Self {
            base_src_port: Port(base_src_port),
            ..self
        }
    }

    /// Set the maximum number of hops to probe.
    #[must_use]
    pub fn max_hops(self, max_hops: u8) -> Self {
        Self {
            max_hops: TimeToLive(max_hops),
            ..self
        }
    }

    /// Set how long to wait for a reply to each probe.
    #[must_use]
    pub fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// Drop privileges once the raw sockets have been opened.
    #[must_use]
    pub fn drop_privileges(self, drop_privileges: bool) -> Self {
        Self {
            drop_privileges,
            ..self
        }
    }

    /// Build the `Tracer`.
    pub fn build(self) -> Result<Tracer> {
        if self.max_hops.0 == 0 || self.max_hops.0 > MAX_TTL {
            return Err(Error::BadConfig(format!(
                "max_hops {} must be in the range 1..={MAX_TTL}",
                self.max_hops.0
            )));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::BadConfig(String::from(
                "probe_timeout must be greater than zero",
            )));
        }
        if self.base_src_port.for_hop(self.max_hops).is_none() {
            return Err(Error::BadConfig(format!(
                "base_src_port {} + max_hops {} exceeds the maximum port",
                self.base_src_port, self.max_hops
            )));
        }
        Ok(Tracer::new(
            self.source_addr,
            self.target_addr,
            self.dest_port,
            self.base_src_port,
            self.max_hops,
            self.probe_timeout,
            self.drop_privileges,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const TARGET_ADDR: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
    const SOURCE_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    #[test]
    fn test_builder_minimal() -> anyhow::Result<()> {
        let tracer = Builder::new(TARGET_ADDR).build()?;
        assert_eq!(TARGET_ADDR, tracer.target_addr());
        assert_eq!(None, tracer.source_addr());
        assert_eq!(Port(defaults::DEFAULT_DEST_PORT), tracer.dest_port());
        assert_eq!(Port(defaults::DEFAULT_BASE_SRC_PORT), tracer.base_src_port());
        assert_eq!(TimeToLive(defaults::DEFAULT_MAX_HOPS), tracer.max_hops());
        assert_eq!(defaults::DEFAULT_PROBE_TIMEOUT, tracer.probe_timeout());
        assert_eq!(defaults::DEFAULT_DROP_PRIVILEGES, tracer.drop_privileges());
        Ok(())
    }

    #[test]
    fn test_builder_full() -> anyhow::Result<()> {
        let tracer = Builder::new(TARGET_ADDR)
            .source_addr(Some(SOURCE_ADDR))
            .dest_port(443)
            .base_src_port(40000)
            .max_hops(64)
            .probe_timeout(Duration::from_millis(500))
            .drop_privileges(true)
            .build()?;
        assert_eq!(TARGET_ADDR, tracer.target_addr());
        assert_eq!(Some(SOURCE_ADDR), tracer.source_addr());
        assert_eq!(Port(443), tracer.dest_port());
        assert_eq!(Port(40000), tracer.base_src_port());
        assert_eq!(TimeToLive(64), tracer.max_hops());
        assert_eq!(Duration::from_millis(500), tracer.probe_timeout());
        assert!(tracer.drop_privileges());
        Ok(())
    }

    #[test_case(0; "zero")]
    #[test_case(255; "above max ttl")]
    fn test_invalid_max_hops(max_hops: u8) {
        let res = Builder::new(TARGET_ADDR).max_hops(max_hops).build();
        assert!(matches!(res, Err(Error::BadConfig(_))));
    }

    #[test_case(1; "min")]
    #[test_case(254; "max")]
    fn test_valid_max_hops(max_hops: u8) {
        let res = Builder::new(TARGET_ADDR).max_hops(max_hops).build();
        assert!(res.is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let res = Builder::new(TARGET_ADDR)
            .probe_timeout(Duration::ZERO)
            .build();
        assert!(matches!(res, Err(Error::BadConfig(_))));
    }

    #[test]
    fn test_src_port_overflow() {
        let res = Builder::new(TARGET_ADDR)
            .base_src_port(65500)
            .max_hops(36)
            .build();
        assert!(matches!(res, Err(Error::BadConfig(_))));
        let res = Builder::new(TARGET_ADDR)
            .base_src_port(65500)
            .max_hops(35)
            .build();
        assert!(res.is_ok());
    }
}
