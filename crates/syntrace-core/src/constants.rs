/// The maximum time-to-live value allowed.
///
/// The IP `ttl` is an u8 (0..255) but since a `ttl` of zero isn't useful we only allow 254 distinct
/// hops (1..255).
pub const MAX_TTL: u8 = 254;

/// The number of probes sent for each hop.
pub const PROBES_PER_HOP: usize = 3;

/// The size of a probe packet, an `IPv4` header followed by a `TCP` header, neither with options.
pub const PROBE_PACKET_SIZE: usize = 40;

/// The `IPv4` identification used for every probe.
pub const PROBE_IDENTIFICATION: u16 = 54321;

/// The `TCP` window size advertised by every probe.
pub const PROBE_WINDOW_SIZE: u16 = 5840;
