#![allow(dead_code)]

use ::core::cell::{Cell, RefCell};
use ::std::collections::VecDeque;
use ::std::rc::Rc;

use coapblock_msg::{Block, Message, TryFromBytes, TryIntoBytes};
use embedded_time::rate::Fraction;
use embedded_time::Instant;

use crate::net::Transport;

/// A clock whose time only moves when told to.
///
/// Clones share the same time, so a test can hold one
/// and hand another to whatever is under test.
#[derive(Debug, Clone, Default)]
pub struct ClockMock(Rc<Cell<u64>>);

impl ClockMock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&self, ms: u64) {
    self.0.set(ms);
  }

  pub fn advance(&self, ms: u64) {
    self.0.set(self.0.get() + ms);
  }

  pub fn get(&self) -> u64 {
    self.0.get()
  }
}

impl embedded_time::Clock for ClockMock {
  type T = u64;

  // milliseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000);

  fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
    Ok(Instant::new(self.0.get()))
  }
}

/// What the mocked peer does with a request
#[derive(Debug)]
pub enum Reply {
  /// Respond with this message
  Msg(Message),
  /// Respond with these raw bytes
  Dgram(Vec<u8>),
  /// Swallow the request
  Nothing,
  /// Fail the send
  SendFails,
}

/// A piggybacked 2.05 response to `req`
pub fn content(req: &Message, payload: &[u8], block2: Option<Block>) -> Message {
  let mut rep = req.ack(crate::code::CONTENT);
  rep.payload.0 = payload.to_vec();
  if let Some(block) = block2 {
    rep.set_block2(block);
  }
  rep
}

type Responder = Box<dyn FnMut(&Message) -> Reply>;

/// A mocked transport connected to a scripted peer.
///
/// Every datagram sent is parsed, recorded, and handed to the
/// responder; whatever the responder replies with is queued for `recv`.
///
/// While nothing is queued, `recv` yields `WouldBlock` and moves the
/// clock forward by `poll_advance_ms`, so timeouts elapse without sleeping.
pub struct PeerMock {
  clock: ClockMock,
  poll_advance_ms: u64,
  respond: RefCell<Responder>,
  inbox: RefCell<VecDeque<Vec<u8>>>,
  sent: Rc<RefCell<Vec<Message>>>,
}

impl core::fmt::Debug for PeerMock {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PeerMock")
     .field("clock", &self.clock)
     .field("inbox", &self.inbox)
     .field("sent", &self.sent)
     .finish()
  }
}

impl PeerMock {
  pub fn new(clock: &ClockMock, respond: impl FnMut(&Message) -> Reply + 'static) -> Self {
    Self { clock: clock.clone(),
           poll_advance_ms: 1_000,
           respond: RefCell::new(Box::new(respond)),
           inbox: Default::default(),
           sent: Default::default() }
  }

  /// Handle to the requests this peer receives, readable
  /// after the transport has been moved away
  pub fn sent(&self) -> Rc<RefCell<Vec<Message>>> {
    self.sent.clone()
  }
}

impl Transport for PeerMock {
  type Error = ();

  fn send(&self, dgram: &[u8]) -> nb::Result<(), Self::Error> {
    let req = Message::try_from_bytes(dgram).unwrap();
    self.sent.borrow_mut().push(req.clone());

    let reply = (&mut *self.respond.borrow_mut())(&req);

    match reply {
      | Reply::Msg(rep) => self.inbox
                               .borrow_mut()
                               .push_back(rep.try_into_bytes().unwrap()),
      | Reply::Dgram(bytes) => self.inbox.borrow_mut().push_back(bytes),
      | Reply::Nothing => (),
      | Reply::SendFails => return Err(nb::Error::Other(())),
    }

    Ok(())
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
    match self.inbox.borrow_mut().pop_front() {
      | Some(dgram) => {
        buf[..dgram.len()].copy_from_slice(&dgram);
        Ok(dgram.len())
      },
      | None => {
        self.clock.advance(self.poll_advance_ms);
        Err(nb::Error::WouldBlock)
      },
    }
  }
}
