use derive_more::Display;

/// `TimeToLive` (ttl) newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Display)]
pub struct TimeToLive(pub u8);

/// Port newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Display)]
pub struct Port(pub u16);

impl Port {
    /// The source port for the probes of a given hop.
    ///
    /// Returns `None` if the result does not fit in a port.
    #[must_use]
    pub fn for_hop(self, ttl: TimeToLive) -> Option<Self> {
        self.0.checked_add(u16::from(ttl.0)).map(Self)
    }
}
