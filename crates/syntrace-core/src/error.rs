use std::fmt::{Display, Formatter};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("invalid packet: {0}")]
    PacketError(#[from] syntrace_packet::error::Error),
    #[error("failed to discover local address: {0}")]
    AddressDiscovery(Box<Error>),
    #[error("source IP address {0} could not be bound")]
    InvalidSourceAddr(Ipv4Addr),
    #[error("failed to create raw socket: {0}")]
    SocketCreation(IoError),
    #[error("raw sockets require elevated privileges: {0}")]
    PrivilegeRequired(IoError),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Probe failed to send: {0}")]
    ProbeFailed(IoError),
    #[error("missing address from socket call")]
    MissingAddr,
    #[error("privilege error: {0}")]
    PrivilegeError(#[from] syntrace_privilege::Error),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Connect error for {1}: {0}")]
    Connect(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// Get the underlying error kind.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Bind(e, _) | Self::Connect(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => {
                e.kind()
            }
        }
    }
}

/// Io operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetHeaderIncluded,
    Select,
    RecvFrom,
    LocalAddr,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetHeaderIncluded => write!(f, "set header included"),
            Self::Select => write!(f, "select"),
            Self::RecvFrom => write!(f, "recv from"),
            Self::LocalAddr => write!(f, "local addr"),
        }
    }
}
