use std::collections::{BTreeMap, HashSet};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use coapblock_msg::{Block,
                    CodeKind,
                    ContentFormat,
                    Message,
                    OptNumber,
                    Szx,
                    TryFromBytes,
                    TryIntoBytes,
                    Type};

use crate::code;
use crate::logging::msg_summary;

/// Representations the server can hand out, by path
#[derive(Debug, Clone, PartialEq)]
pub struct Resources {
  by_path: BTreeMap<String, (ContentFormat, Vec<u8>)>,
  fallback: (ContentFormat, Vec<u8>),
}

impl Resources {
  /// No resources; every path gets the default JSON body
  pub fn new() -> Self {
    Self { by_path: BTreeMap::new(),
           fallback: (ContentFormat::Json, crate::data::DEFAULT_BODY.to_vec()) }
  }

  /// Serve `body` at `path` (leading and trailing `/` are ignored)
  pub fn with(mut self, path: impl AsRef<str>, format: ContentFormat, body: Vec<u8>) -> Self {
    self.by_path
        .insert(path.as_ref().trim_matches('/').to_string(), (format, body));
    self
  }

  /// The representation at `path`, or the fallback
  pub fn get(&self, path: &str) -> (ContentFormat, &[u8]) {
    let (format, body) = self.by_path
                             .get(path.trim_matches('/'))
                             .unwrap_or(&self.fallback);
    (*format, body.as_slice())
  }
}

impl Default for Resources {
  /// The firmware image at `/fw`
  fn default() -> Self {
    Self::new().with("fw", ContentFormat::OctetStream, crate::data::firmware())
  }
}

/// Build the response to a request, or `None` if the message
/// should be dropped without a reply.
///
/// `szx` is the largest block size the server will send;
/// clients asking for smaller blocks get smaller blocks.
pub fn respond(resources: &Resources, szx: Szx, req: &Message) -> Option<Message> {
  match (req.ty, req.code.kind()) {
    | (Type::Ack | Type::Reset, _) => return None,
    | (_, CodeKind::Empty) => return Some(Message::new(Type::Reset, req.code, req.id, req.token)),
    | (_, CodeKind::Response) => return None,
    | (_, CodeKind::Request) => (),
  }

  if req.code != code::GET {
    return Some(req.ack(code::METHOD_NOT_ALLOWED));
  }

  let path = match req.path() {
    | Ok(p) => p,
    | Err(_) => return Some(req.ack(code::BAD_OPTION)),
  };

  let (format, body) = resources.get(&path);

  let (offset, szx) = match req.block2() {
    | None => (0, szx),
    | Some(Ok(asked)) => (asked.offset(), szx.min(asked.szx())),
    | Some(Err(_)) => return Some(req.ack(code::BAD_OPTION)),
  };

  let mut rep = req.ack(code::CONTENT);
  rep.set_content_format(format);

  if body.len() <= szx.size() && offset == 0 {
    rep.payload.0 = body.to_vec();
    return Some(rep);
  }

  if offset >= body.len() {
    return Some(req.ack(code::BAD_OPTION));
  }

  let end = body.len().min(offset + szx.size());
  let num = (offset / szx.size()) as u32;

  rep.set_block2(Block::new(num, end < body.len(), szx));
  if num == 0 {
    rep.set_uint(OptNumber::SIZE2, body.len() as u32);
  }
  rep.payload.0 = body[offset..end].to_vec();

  Some(rep)
}

/// Runtime config for the test server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
  /// Largest block size to send.
  ///
  /// Defaults to 128 bytes.
  /// ```
  /// use coapblock::msg::Szx;
  /// use coapblock::server::ServerConfig;
  ///
  /// assert_eq!(ServerConfig::default().szx, Szx::S128);
  /// ```
  pub szx: Szx,
  /// How often the serve loop checks whether it was asked to stop.
  ///
  /// Defaults to 100 milliseconds.
  pub poll_interval: Duration,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { szx: Szx::S128,
           poll_interval: Duration::from_millis(100) }
  }
}

/// A blocking CoAP server that serves [`Resources`] blockwise
#[derive(Debug)]
pub struct Server {
  sock: UdpSocket,
  resources: Resources,
  config: ServerConfig,
  clients: HashSet<SocketAddr>,
}

impl Server {
  /// Bind to `addr` (port 0 picks a free port), serving [`Resources::default`]
  pub fn try_new(addr: impl ToSocketAddrs, config: ServerConfig) -> io::Result<Self> {
    let sock = UdpSocket::bind(addr)?;
    sock.set_read_timeout(Some(config.poll_interval))?;

    Ok(Self { sock,
              resources: Resources::default(),
              config,
              clients: HashSet::new() })
  }

  /// Replace the resources being served
  pub fn with_resources(mut self, resources: Resources) -> Self {
    self.resources = resources;
    self
  }

  /// The address the server is listening on
  pub fn local_addr(&self) -> io::Result<SocketAddr> {
    self.sock.local_addr()
  }

  /// Wait up to [`ServerConfig::poll_interval`] for a datagram and answer it
  pub fn poll(&mut self) -> io::Result<()> {
    let mut buf = [0u8; 2048];

    let (n, addr) = match self.sock.recv_from(&mut buf) {
      | Ok(ok) => ok,
      | Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
        return Ok(())
      },
      | Err(e) => return Err(e),
    };

    if self.clients.insert(addr) {
      log::info!("new client {}", addr);
    }

    let req = match Message::try_from_bytes(&buf[..n]) {
      | Ok(req) => req,
      | Err(e) => {
        log::warn!("dropping {} byte datagram from {}: {}", n, addr, e);
        return Ok(());
      },
    };
    log::trace!("{} --> {}", addr, msg_summary(&req));

    let rep = match respond(&self.resources, self.config.szx, &req) {
      | Some(rep) => rep,
      | None => return Ok(()),
    };
    log::trace!("{} <-- {}", addr, msg_summary(&rep));

    match rep.try_into_bytes::<Vec<u8>>() {
      | Ok(bytes) => self.sock.send_to(&bytes, addr).map(|_| ()),
      | Err(e) => {
        log::error!("failed to serialize response to {}: {}", addr, e);
        Ok(())
      },
    }
  }

  /// Serve until `stop` is set
  pub fn run(&mut self, stop: &AtomicBool) -> io::Result<()> {
    log::info!("serving on {}", self.local_addr()?);

    while !stop.load(Ordering::Relaxed) {
      self.poll()?;
    }

    Ok(())
  }

  /// Serve on a background thread
  pub fn spawn(mut self) -> io::Result<Handle> {
    let addr = self.local_addr()?;
    let stop = Arc::new(AtomicBool::new(false));
    let stop_ = stop.clone();
    let thread = std::thread::spawn(move || self.run(&stop_));

    Ok(Handle { addr, stop, thread })
  }
}

/// A [`Server`] running on a background thread
#[derive(Debug)]
pub struct Handle {
  addr: SocketAddr,
  stop: Arc<AtomicBool>,
  thread: JoinHandle<io::Result<()>>,
}

impl Handle {
  /// The address the server is listening on
  pub fn addr(&self) -> SocketAddr {
    self.addr
  }

  /// Stop the server and wait for its thread to exit
  pub fn shutdown(self) -> io::Result<()> {
    self.stop.store(true, Ordering::Relaxed);
    self.thread
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "server thread panicked"))?
  }
}

#[cfg(test)]
mod tests {
  use coapblock_msg::{Code, Id, Token};

  use super::*;

  fn get(path: &str, block: Option<Block>) -> Message {
    let mut req = Message::new(Type::Con, code::GET, Id(12), Token::from_bytes([3; 8]));
    req.set_path(path);
    if let Some(b) = block {
      req.set_block2(b);
    }
    req
  }

  fn resources() -> Resources {
    Resources::new().with("/fw", ContentFormat::OctetStream, (0..=255u8).cycle().take(300).collect())
  }

  #[test]
  fn small_bodies_are_not_blockwise() {
    let rep = respond(&resources(), Szx::S128, &get("nothing/here", None)).unwrap();

    assert_eq!(rep.ty, Type::Ack);
    assert_eq!(rep.code, code::CONTENT);
    assert_eq!(rep.id, Id(12));
    assert_eq!(rep.token, Token::from_bytes([3; 8]));
    assert_eq!(rep.content_format(), Some(ContentFormat::Json));
    assert_eq!(rep.block2(), None);
    assert_eq!(rep.payload.0, b"{'value':'foo'}".to_vec());
  }

  #[test]
  fn first_block_carries_size2() {
    let rep = respond(&resources(), Szx::S128, &get("fw", None)).unwrap();
    let block = rep.block2().unwrap().unwrap();

    assert_eq!((block.num(), block.more(), block.szx()), (0, true, Szx::S128));
    assert_eq!(rep.get_uint(OptNumber::SIZE2), Some(Ok(300)));
    assert_eq!(rep.content_format(), Some(ContentFormat::OctetStream));
    assert_eq!(rep.payload.0.len(), 128);
  }

  #[test]
  fn block_size_is_the_smaller_of_both() {
    let rep = respond(&resources(), Szx::S128, &get("fw", Some(Block::new(0, false, Szx::S1024)))).unwrap();
    assert_eq!(rep.block2().unwrap().unwrap().szx(), Szx::S128);

    let rep = respond(&resources(), Szx::S128, &get("fw", Some(Block::new(3, false, Szx::S32)))).unwrap();
    let block = rep.block2().unwrap().unwrap();
    assert_eq!((block.num(), block.szx()), (3, Szx::S32));
    assert_eq!(rep.get(OptNumber::SIZE2), None);
    assert_eq!(rep.payload.0, (96..128u8).collect::<Vec<_>>());
  }

  #[test]
  fn last_block_is_short() {
    let rep = respond(&resources(), Szx::S128, &get("fw", Some(Block::new(2, false, Szx::S128)))).unwrap();
    let block = rep.block2().unwrap().unwrap();

    assert!(!block.more());
    assert_eq!(rep.payload.0.len(), 300 - 256);
  }

  #[test]
  fn block_past_the_end_is_bad_option() {
    let rep = respond(&resources(), Szx::S128, &get("fw", Some(Block::new(3, false, Szx::S128)))).unwrap();
    assert_eq!(rep.code, code::BAD_OPTION);
    assert!(rep.payload.0.is_empty());
  }

  #[test]
  fn only_get_is_allowed() {
    let mut req = get("fw", None);
    req.code = Code::new(0, 2);
    assert_eq!(respond(&resources(), Szx::S128, &req).unwrap().code,
               code::METHOD_NOT_ALLOWED);
  }

  #[test]
  fn ping_gets_reset() {
    let req = Message::new(Type::Con, Code::new(0, 0), Id(5), Token::default());
    let rep = respond(&resources(), Szx::S128, &req).unwrap();
    assert_eq!((rep.ty, rep.id), (Type::Reset, Id(5)));
  }

  #[test]
  fn acks_are_ignored() {
    let req = Message::new(Type::Ack, code::CONTENT, Id(5), Token::default());
    assert_eq!(respond(&resources(), Szx::S128, &req), None);
  }

  #[test]
  fn serves_over_udp_until_shutdown() {
    let server = Server::try_new("127.0.0.1:0", ServerConfig::default()).unwrap()
                                                                       .with_resources(resources());
    let handle = server.spawn().unwrap();

    let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
    sock.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    sock.send_to(&[0xFF], handle.addr()).unwrap();

    let req: Vec<u8> = get("fw", None).try_into_bytes().unwrap();
    sock.send_to(&req, handle.addr()).unwrap();

    let mut buf = [0u8; 2048];
    let (n, _) = sock.recv_from(&mut buf).unwrap();
    let rep = Message::try_from_bytes(&buf[..n]).unwrap();
    assert_eq!(rep.payload.0, (0..128u8).collect::<Vec<_>>());

    handle.shutdown().unwrap();
  }
}
