use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// A datagram transport connected to a single peer.
///
/// Operations are non-blocking; an implementor with nothing to
/// yield from [`Transport::recv`] returns [`nb::Error::WouldBlock`],
/// and the caller is responsible for polling against a clock.
pub trait Transport {
  /// The error yielded by socket operations
  type Error: core::fmt::Debug;

  /// Send a datagram to the peer
  fn send(&self, dgram: &[u8]) -> nb::Result<(), Self::Error>;

  /// Receive a datagram from the peer into `buf`,
  /// yielding the number of bytes written.
  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;
}

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// A [`UdpSocket`] that has been [`UdpSocket::connect`]ed and set non-blocking
impl Transport for UdpSocket {
  type Error = io::Error;

  fn send(&self, dgram: &[u8]) -> nb::Result<(), Self::Error> {
    UdpSocket::send(self, dgram).map(|_| ()).map_err(io_to_nb)
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
    UdpSocket::recv(self, buf).map_err(io_to_nb)
  }
}

/// Open a non-blocking UDP socket on an ephemeral port
/// and connect it to `addr`.
pub fn dial(addr: SocketAddr) -> io::Result<UdpSocket> {
  let local = match addr {
    | SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
    | SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
  };

  let sock = UdpSocket::bind(local)?;
  sock.connect(addr)?;
  sock.set_nonblocking(true)?;
  Ok(sock)
}
