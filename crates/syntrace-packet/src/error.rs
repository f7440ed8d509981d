use thiserror::Error;

/// A packet error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A packet error.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error {
    /// Attempting to encode or decode a header with an insufficient buffer size.
    #[error("insufficient buffer for {0} header, minimum={1}, provided={2}")]
    InsufficientPacketBuffer(String, usize, usize),
    /// The header declares a length that is smaller than the fixed header.
    #[error("invalid {0} header length: {1}")]
    InvalidHeaderLength(String, usize),
}
