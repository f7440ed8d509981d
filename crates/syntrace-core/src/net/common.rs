use crate::error::{Error, IoError};
use std::io;

/// Utility methods to map errors.
pub struct ErrorMapper;

impl ErrorMapper {
    /// Convert a failure to create a raw socket to [`Error::PrivilegeRequired`] if it was refused
    /// for lack of privileges, or [`Error::SocketCreation`] otherwise.
    #[must_use]
    pub fn socket_creation(err: IoError) -> Error {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Error::PrivilegeRequired(err),
            _ => Error::SocketCreation(err),
        }
    }

    /// Convert [`io::ErrorKind::WouldBlock`] to `Ok(None)`.
    pub fn would_block<T>(result: Result<T, IoError>) -> crate::error::Result<Option<T>> {
        match result {
            Ok(val) => Ok(Some(val)),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(Error::IoError(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoOperation;

    #[test]
    fn test_socket_creation_permission_denied() {
        let io_err = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = ErrorMapper::socket_creation(IoError::Other(io_err, IoOperation::NewSocket));
        assert!(matches!(err, Error::PrivilegeRequired(_)));
    }

    #[test]
    fn test_socket_creation_other() {
        let io_err = io::Error::from(io::ErrorKind::Other);
        let err = ErrorMapper::socket_creation(IoError::Other(io_err, IoOperation::NewSocket));
        assert!(matches!(err, Error::SocketCreation(_)));
    }

    #[test]
    fn test_would_block() {
        let io_err = io::Error::from(io::ErrorKind::WouldBlock);
        let res: Result<usize, _> = Err(IoError::Other(io_err, IoOperation::RecvFrom));
        assert!(matches!(ErrorMapper::would_block(res), Ok(None)));
    }

    #[test]
    fn test_not_would_block() {
        let io_err = io::Error::from(io::ErrorKind::ConnectionReset);
        let res: Result<usize, _> = Err(IoError::Other(io_err, IoOperation::RecvFrom));
        assert!(matches!(
            ErrorMapper::would_block(res),
            Err(Error::IoError(_))
        ));
    }

    #[test]
    fn test_would_block_ok() {
        assert!(matches!(ErrorMapper::would_block(Ok(7)), Ok(Some(7))));
    }
}
