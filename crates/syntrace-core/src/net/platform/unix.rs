use crate::error::{IoError, IoOperation, IoResult};
use crate::net::socket::{Readiness, Socket};
use itertools::Itertools;
use nix::{
    sys::select::FdSet,
    libc::{suseconds_t, time_t},
    sys::time::TimeVal,
    Error,
};
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io;
use std::net::SocketAddr;
use std::os::fd::AsFd;
use std::time::Duration;
use tracing::instrument;

/// A network socket.
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new(domain: Domain, ty: Type, protocol: Protocol) -> IoResult<Self> {
        Ok(Self {
            inner: socket2::Socket::new(domain, ty, Some(protocol))
                .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?,
        })
    }

    fn new_raw_ipv4(protocol: Protocol) -> IoResult<Self> {
        Self::new(Domain::IPV4, Type::RAW, protocol)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> IoResult<()> {
        self.inner
            .set_nonblocking(nonblocking)
            .map_err(|err| IoError::Other(err, IoOperation::SetNonBlocking))
    }

    fn set_header_included(&self, included: bool) -> IoResult<()> {
        self.inner
            .set_header_included_v4(included)
            .map_err(|err| IoError::Other(err, IoOperation::SetHeaderIncluded))
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_raw_send_socket_ipv4() -> IoResult<Self> {
        let socket = Self::new_raw_ipv4(Protocol::from(nix::libc::IPPROTO_RAW))?;
        socket.set_nonblocking(true)?;
        socket.set_header_included(true)?;
        Ok(socket)
    }
    #[instrument(level = "trace")]
    fn new_icmp_recv_socket_ipv4() -> IoResult<Self> {
        let socket = Self::new_raw_ipv4(Protocol::ICMPV4)?;
        socket.set_nonblocking(true)?;
        Ok(socket)
    }
    #[instrument(level = "trace")]
    fn new_tcp_recv_socket_ipv4() -> IoResult<Self> {
        let socket = Self::new_raw_ipv4(Protocol::TCP)?;
        socket.set_nonblocking(true)?;
        Ok(socket)
    }
    #[instrument(level = "trace")]
    fn new_udp_dgram_socket_ipv4() -> IoResult<Self> {
        Self::new(Domain::IPV4, Type::DGRAM, Protocol::UDP)
    }
    #[instrument(skip(self), level = "trace")]
    fn bind(&mut self, address: SocketAddr) -> IoResult<()> {
        self.inner
            .bind(&SockAddr::from(address))
            .map_err(|err| IoError::Bind(err, address))
    }
    #[instrument(skip(self), level = "trace")]
    fn connect(&mut self, address: SocketAddr) -> IoResult<()> {
        tracing::trace!(?address);
        self.inner
            .connect(&SockAddr::from(address))
            .map_err(|err| IoError::Connect(err, address))
    }
    #[instrument(skip(self), level = "trace")]
    fn local_addr(&mut self) -> IoResult<Option<SocketAddr>> {
        let addr = self
            .inner
            .local_addr()
            .map_err(|err| IoError::Other(err, IoOperation::LocalAddr))?
            .as_socket();
        tracing::trace!(?addr);
        Ok(addr)
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
        tracing::trace!(buf = format!("{:02x?}", buf.iter().format(" ")), ?addr);
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))?;
        Ok(())
    }
    #[instrument(skip(self, other), level = "trace")]
    fn select_readable(&mut self, other: &Self, timeout: Duration) -> IoResult<Readiness> {
        let this_fd = self.inner.as_fd();
        let other_fd = other.inner.as_fd();
        let mut read = FdSet::new();
        read.insert(this_fd);
        read.insert(other_fd);
        let selected = nix::sys::select::select(
            None,
            Some(&mut read),
            None,
            None,
            Some(&mut select_timeout(timeout)),
        );
        match selected {
            Ok(0) | Err(Error::EINTR) => Ok(Readiness::default()),
            Ok(_) => Ok(Readiness {
                this: read.contains(this_fd),
                other: read.contains(other_fd),
            }),
            Err(err) => Err(IoError::Other(
                std::io::Error::from(err),
                IoOperation::Select,
            )),
        }
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn recv_from(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<SocketAddr>)> {
        let (bytes_read, addr) = self
            .inner
            .recv_from_into_buf(buf)
            .map_err(|err| IoError::Other(err, IoOperation::RecvFrom))?;
        tracing::trace!(
            buf = format!("{:02x?}", buf[..bytes_read].iter().format(" ")),
            bytes_read,
            ?addr
        );
        Ok((bytes_read, addr))
    }
}

/// Convert a timeout to a `TimeVal` without losing sub-millisecond precision.
fn select_timeout(timeout: Duration) -> TimeVal {
    let secs = time_t::try_from(timeout.as_secs()).unwrap_or(time_t::MAX);
    let micros = suseconds_t::try_from(timeout.subsec_micros()).unwrap_or_default();
    TimeVal::new(secs, micros)
}

/// An extension trait to allow `recv_from` method which writes to a `&mut [u8]`.
///
/// This is required for `socket2::Socket` which [does not currently provide] this method.
///
/// [does not currently provide]: https://github.com/rust-lang/socket2/issues/223
trait RecvFrom {
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)>;
}

impl RecvFrom for socket2::Socket {
    // Safety: the `recv` implementation promises not to write uninitialised
    // bytes to the `buf`fer, so this casting is safe.
    #![allow(unsafe_code)]
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)> {
        let buf =
            unsafe { &mut *(std::ptr::from_mut::<[u8]>(buf) as *mut [std::mem::MaybeUninit<u8>]) };
        self.recv_from(buf)
            .map(|(size, addr)| (size, addr.as_socket()))
    }
}
