use crate::constants::PROBES_PER_HOP;
use crate::types::TimeToLive;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::time::Duration;

/// The outcome of a single probe.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ProbeSample {
    addr: Option<Ipv4Addr>,
    rtt: Option<Duration>,
    syn_ack: bool,
    rst: bool,
}

impl ProbeSample {
    /// A probe which received no reply before the timeout.
    #[must_use]
    pub const fn timeout() -> Self {
        Self {
            addr: None,
            rtt: None,
            syn_ack: false,
            rst: false,
        }
    }

    /// A probe answered by an `ICMP` datagram, typically a `TimeExceeded` from a router.
    #[must_use]
    pub const fn icmp(addr: Ipv4Addr, rtt: Duration) -> Self {
        Self {
            addr: Some(addr),
            rtt: Some(rtt),
            syn_ack: false,
            rst: false,
        }
    }

    /// A probe answered by a `TCP` segment.
    #[must_use]
    pub const fn tcp(addr: Ipv4Addr, rtt: Duration, syn_ack: bool, rst: bool) -> Self {
        Self {
            addr: Some(addr),
            rtt: Some(rtt),
            syn_ack,
            rst,
        }
    }

    /// The address of the responding host, `None` if the probe timed out.
    #[must_use]
    pub const fn addr(&self) -> Option<Ipv4Addr> {
        self.addr
    }

    /// The round trip time, `None` if the probe timed out.
    #[must_use]
    pub const fn rtt(&self) -> Option<Duration> {
        self.rtt
    }

    /// Was the probe answered with a `SYN+ACK`?
    #[must_use]
    pub const fn is_syn_ack(&self) -> bool {
        self.syn_ack
    }

    /// Was the probe answered with a `RST`?
    #[must_use]
    pub const fn is_rst(&self) -> bool {
        self.rst
    }

    /// Did the destination itself answer this probe?
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.syn_ack || self.rst
    }

    /// Do two samples share a responding address?
    ///
    /// A timed out sample shares an address with nothing, not even another timed out sample.
    #[must_use]
    pub fn same_addr(&self, other: &Self) -> bool {
        matches!((self.addr, other.addr), (Some(a), Some(b)) if a == b)
    }
}

/// How the three samples of a hop group by responding address.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HopLayout {
    /// All three samples share an address.
    AllSame,
    /// The first and second samples share an address, the third differs.
    FirstSecond,
    /// The first and third samples share an address, the second differs.
    FirstThird,
    /// The second and third samples share an address, the first differs.
    SecondThird,
    /// No two samples share an address.
    AllDistinct,
}

/// The three probe samples of a single hop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HopRecord {
    ttl: TimeToLive,
    samples: [ProbeSample; PROBES_PER_HOP],
}

impl HopRecord {
    #[must_use]
    pub const fn new(ttl: TimeToLive, samples: [ProbeSample; PROBES_PER_HOP]) -> Self {
        Self { ttl, samples }
    }

    #[must_use]
    pub const fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    #[must_use]
    pub const fn samples(&self) -> &[ProbeSample; PROBES_PER_HOP] {
        &self.samples
    }

    /// Classify the samples by which pairs share an address.
    #[must_use]
    pub fn layout(&self) -> HopLayout {
        let [first, second, third] = &self.samples;
        match (
            first.same_addr(second),
            first.same_addr(third),
            second.same_addr(third),
        ) {
            (true, true, _) => HopLayout::AllSame,
            (true, false, _) => HopLayout::FirstSecond,
            (false, true, _) => HopLayout::FirstThird,
            (false, false, true) => HopLayout::SecondThird,
            (false, false, false) => HopLayout::AllDistinct,
        }
    }

    /// Has the trace reached the destination at this hop?
    ///
    /// All three samples must share an address and at least one must carry a `SYN+ACK` or `RST`.
    /// A destination which answers two probes while the third times out is therefore not
    /// considered reached.
    #[must_use]
    pub fn reached_destination(&self) -> bool {
        self.layout() == HopLayout::AllSame && self.samples.iter().any(ProbeSample::is_terminal)
    }

    /// The samples grouped by address, in the order the groups are rendered.
    fn groups(&self) -> Vec<Vec<&ProbeSample>> {
        let [first, second, third] = &self.samples;
        match self.layout() {
            HopLayout::AllSame => vec![vec![first, second, third]],
            HopLayout::FirstSecond => vec![vec![first, second], vec![third]],
            HopLayout::FirstThird => vec![vec![first, third], vec![second]],
            HopLayout::SecondThird => vec![vec![first], vec![second, third]],
            HopLayout::AllDistinct => vec![vec![first], vec![second], vec![third]],
        }
    }
}

impl Display for HopRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:2}  ", self.ttl.0)?;
        // a single shared address lists its round trip times one space apart
        let rtt_sep = if self.layout() == HopLayout::AllSame {
            " "
        } else {
            "  "
        };
        for (i, group) in self.groups().into_iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            fmt_group(f, &group, rtt_sep)?;
        }
        Ok(())
    }
}

/// Render a group of samples sharing an address as `(addr)  rtt ms{rtt_sep}rtt ms`.
///
/// Groups only ever hold more than one sample when the samples replied, a timed out sample is
/// rendered as `*`.
fn fmt_group(f: &mut Formatter<'_>, group: &[&ProbeSample], rtt_sep: &str) -> std::fmt::Result {
    let Some(addr) = group.first().and_then(|sample| sample.addr()) else {
        return write!(f, "*");
    };
    write!(f, "({addr})")?;
    for (i, sample) in group.iter().enumerate() {
        let sep = if i == 0 { "  " } else { rtt_sep };
        match sample.rtt() {
            Some(rtt) => write!(f, "{sep}{:.3} ms", rtt.as_secs_f64() * 1000_f64)?,
            None => write!(f, "{sep}*")?,
        }
    }
    Ok(())
}
