use crate::config::{defaults, StrategyConfig};
use crate::error::Result;
use crate::hop::HopRecord;
use crate::net::channel::Channel;
use crate::net::source::SourceAddr;
use crate::net::{Network, SocketImpl};
use crate::strategy::{Strategy, TraceOutcome};
use crate::types::{Port, TimeToLive};
use std::net::Ipv4Addr;
use std::time::Duration;
use syntrace_privilege::Privilege;
use tracing::instrument;

/// A TCP SYN traceroute.
///
/// Use the [`crate::Builder`] type to create a [`Tracer`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tracer {
    source_addr: Option<Ipv4Addr>,
    target_addr: Ipv4Addr,
    dest_port: Port,
    base_src_port: Port,
    max_hops: TimeToLive,
    probe_timeout: Duration,
    drop_privileges: bool,
}

impl Tracer {
    #[must_use]
    pub(crate) const fn new(
        source_addr: Option<Ipv4Addr>,
        target_addr: Ipv4Addr,
        dest_port: Port,
        base_src_port: Port,
        max_hops: TimeToLive,
        probe_timeout: Duration,
        drop_privileges: bool,
    ) -> Self {
        Self {
            source_addr,
            target_addr,
            dest_port,
            base_src_port,
            max_hops,
            probe_timeout,
            drop_privileges,
        }
    }

    /// Run the [`Tracer`].
    ///
    /// This method blocks until the destination is reached, `max_hops` hops have been probed or
    /// the trace fails.
    ///
    /// # See Also
    ///
    /// - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
    pub fn run(&self) -> Result<TraceOutcome> {
        self.run_with(|_| ())
    }

    /// Run the [`Tracer`] with a custom hop handler.
    ///
    /// The handler is called once for each hop, in order, as soon as all probes for that hop have
    /// completed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use std::net::Ipv4Addr;
    /// use syntrace_core::Builder;
    ///
    /// let tracer = Builder::new(Ipv4Addr::new(93, 184, 216, 34)).build()?;
    /// tracer.run_with(|hop| println!("{hop}"))?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, level = "trace")]
    pub fn run_with<F: FnMut(&HopRecord)>(&self, func: F) -> Result<TraceOutcome> {
        // if we are given a source address, validate it otherwise
        // discover it from the routing table.
        let source_addr = match self.source_addr {
            None => SourceAddr::discover::<SocketImpl>(defaults::DEFAULT_DISCOVERY_ADDR)?,
            Some(addr) => SourceAddr::validate::<SocketImpl>(addr)?,
        };
        tracing::debug!(%source_addr, target_addr = %self.target_addr);
        let mut channel = Channel::<SocketImpl>::connect(self.target_addr)?;
        if self.drop_privileges {
            Privilege::drop_privileges()?;
        }
        self.trace(&mut channel, source_addr, func)
    }

    /// Trace over a given [`Network`] from a known source address.
    ///
    /// This is the hop by hop loop of [`Tracer::run_with`] without the socket setup, which allows
    /// a trace to be driven over any [`Network`] implementation.
    #[instrument(skip(self, network, func), level = "trace")]
    pub fn trace<N: Network, F: FnMut(&HopRecord)>(
        &self,
        network: &mut N,
        source_addr: Ipv4Addr,
        func: F,
    ) -> Result<TraceOutcome> {
        let outcome = Strategy::new(&self.make_strategy_config(), func).run(network, source_addr)?;
        tracing::debug!(?outcome);
        Ok(outcome)
    }

    #[must_use]
    pub const fn source_addr(&self) -> Option<Ipv4Addr> {
        self.source_addr
    }

    #[must_use]
    pub const fn target_addr(&self) -> Ipv4Addr {
        self.target_addr
    }

    #[must_use]
    pub const fn dest_port(&self) -> Port {
        self.dest_port
    }

    #[must_use]
    pub const fn base_src_port(&self) -> Port {
        self.base_src_port
    }

    #[must_use]
    pub const fn max_hops(&self) -> TimeToLive {
        self.max_hops
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    #[must_use]
    pub const fn drop_privileges(&self) -> bool {
        self.drop_privileges
    }

    const fn make_strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            target_addr: self.target_addr,
            dest_port: self.dest_port,
            base_src_port: self.base_src_port,
            max_hops: self.max_hops,
            probe_timeout: self.probe_timeout,
        }
    }
}
