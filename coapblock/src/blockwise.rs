use coapblock_msg::{Block, Id, Message, Szx, Token, TryFromBytes, TryIntoBytes, Type};

use crate::config::{Config, Rotation};
use crate::error::{Error, What, When};
use crate::logging::msg_summary;
use crate::net::Transport;
use crate::time::{self, Clock, Millis};
use crate::token::TokenSource;

/// Where a [`Session`] is in its request / response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  /// Ready to send the request for the next block
  Idle,
  /// A request has been sent and we're waiting on the response
  AwaitingResponse {
    /// Block that was asked for
    num: u32,
    /// Token the response must echo
    token: Token,
  },
  /// The last block has been received
  Done,
  /// The transfer failed, see the accompanying [`Error`]
  Failed,
}

/// Bookkeeping for one blockwise GET
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
  /// Resource path
  pub path: String,
  /// Number of the next block to ask for
  pub num: u32,
  /// Block size to ask for; follows whatever the server last reported
  pub szx: Szx,
  /// Message ID of the next request
  pub id: Id,
  /// Every payload byte received so far
  pub payload: Vec<u8>,
  /// Milliseconds since the clock's epoch after which
  /// no new exchange may start
  pub deadline: u64,
  /// Token drawn for the first exchange, reused by the rest
  /// when rotating [`Rotation::PerTransfer`]
  pub pinned_token: Option<Token>,
  #[allow(missing_docs)]
  pub state: State,
}

impl Session {
  /// Start a transfer of `path`, asking for the first block with `szx`
  pub fn new(path: impl AsRef<str>, szx: Szx, deadline: u64) -> Self {
    let path = match path.as_ref() {
      | "" => "/".to_string(),
      | p => p.to_string(),
    };

    Self { path,
           num: 0,
           szx,
           id: Id(1),
           payload: Vec::new(),
           deadline,
           pinned_token: None,
           state: State::Idle }
  }

  /// Build the confirmable GET for the current block
  pub fn request(&self, token: Token, config: &Config) -> Message {
    let mut req = Message::new(Type::Con, crate::code::GET, self.id, token);
    req.set_path(&self.path);
    req.set_block2(Block::new(self.num, false, self.szx));

    if let Some(f) = config.accept {
      req.set_accept(f);
    }

    req
  }
}

/// What to do after an exchange succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
  Continue,
  Done,
}

/// A blockwise GET over a connected [`Transport`].
///
/// Every exchange is a confirmable GET answered by exactly one datagram.
/// Its token is drawn from the [`TokenSource`] per [`Config::rotation`]:
/// for every exchange, or once per transfer and then reused. There are no
/// retransmissions; a lost request or response fails the transfer once
/// [`Config::exchange_timeout`] elapses.
///
/// ```no_run
/// use coapblock::blockwise::Transfer;
/// use coapblock::config::Config;
/// use coapblock::time::StdClock;
/// use coapblock::token::Random;
/// use embedded_time::duration::Milliseconds;
///
/// let sock = coapblock::net::dial("127.0.0.1:5683".parse().unwrap()).unwrap();
/// let body = Transfer::new(sock, StdClock::new(), Random::from_entropy(), Config::default())
///              .get("/fw", Milliseconds(30_000))
///              .unwrap();
/// ```
#[derive(Debug)]
pub struct Transfer<T, C, S> {
  sock: T,
  clock: C,
  tokens: S,
  config: Config,
}

impl<T, C, S> Transfer<T, C, S>
  where T: Transport,
        C: Clock,
        S: TokenSource
{
  #[allow(missing_docs)]
  pub fn new(sock: T, clock: C, tokens: S, config: Config) -> Self {
    Self { sock,
           clock,
           tokens,
           config }
  }

  /// Fetch `path`, giving up if the transfer is still going once
  /// `timeout` has elapsed.
  ///
  /// The transport is dropped when this returns.
  pub fn get(mut self, path: &str, timeout: Millis) -> Result<Vec<u8>, Error<T::Error>> {
    let start = time::now(&self.clock).map_err(|_| {
                                         When::Exchange { num: 0,
                                                          id: Id(1),
                                                          token: Token::default() }.what(What::ClockError)
                                       })?;

    let mut session = Session::new(path,
                                   self.config.initial_szx,
                                   start.0.saturating_add(timeout.0));
    self.run(&mut session)?;
    Ok(session.payload)
  }

  /// Drive `session` until it is [`State::Done`] or [`State::Failed`]
  pub fn run(&mut self, session: &mut Session) -> Result<(), Error<T::Error>> {
    loop {
      match self.exchange(session) {
        | Ok(Next::Continue) => continue,
        | Ok(Next::Done) => {
          session.state = State::Done;
          log::info!("fetched {} ({} bytes in {} blocks)",
                     session.path,
                     session.payload.len(),
                     session.num + 1);
          break Ok(());
        },
        | Err(e) => {
          session.state = State::Failed;
          log::warn!("transfer of {} failed: {}", session.path, e);
          break Err(e);
        },
      }
    }
  }

  fn now(&self, when: When) -> Result<u64, Error<T::Error>> {
    time::now(&self.clock).map(|ms| ms.0)
                          .map_err(|_| when.what(What::ClockError))
  }

  fn exchange(&mut self, session: &mut Session) -> Result<Next, Error<T::Error>> {
    let when = When::Exchange { num: session.num,
                                id: session.id,
                                token: Token::default() };

    if self.now(when)? >= session.deadline {
      return Err(when.what(What::DeadlineExceeded));
    }

    let token = match (self.config.rotation, session.pinned_token) {
      | (Rotation::PerTransfer, Some(token)) => token,
      | (Rotation::PerTransfer, None) => {
        let token = self.tokens.next_token();
        session.pinned_token = Some(token);
        token
      },
      | (Rotation::PerExchange, _) => self.tokens.next_token(),
    };
    let when = When::Exchange { num: session.num,
                                id: session.id,
                                token };

    let req = session.request(token, &self.config);
    log::debug!("requesting block {} ({} bytes) of {}",
                session.num,
                session.szx.size(),
                session.path);
    log::trace!("--> {}", msg_summary(&req));

    let bytes: Vec<u8> = req.try_into_bytes()
                            .map_err(|e| when.what(What::ToBytes(e)))?;
    nb::block!(self.sock.send(&bytes)).map_err(|e| when.what(What::SockError(e)))?;

    session.state = State::AwaitingResponse { num: session.num,
                                              token };

    let rep = self.recv(when)?;
    log::trace!("<-- {}", msg_summary(&rep));

    if rep.token != token {
      return Err(when.what(What::TokenMismatch { expected: token,
                                                 actual: rep.token }));
    }

    if !crate::code::is_success(rep.code) {
      return Err(when.what(What::UnexpectedCode(rep.code)));
    }

    let block = rep.block2()
                   .transpose()
                   .map_err(|e| when.what(What::MalformedBlock2(e)))?;

    session.payload.extend(rep.payload.0);

    match block {
      | None => Ok(Next::Done),
      | Some(block) => {
        if block.szx() != session.szx {
          log::debug!("server chose block size {} (asked for {})",
                      block.size(),
                      session.szx.size());
        }

        session.szx = block.szx();

        if block.more() {
          session.num = block.num() + 1;
          session.id = session.id.next();
          session.state = State::Idle;
          Ok(Next::Continue)
        } else {
          session.num = block.num();
          Ok(Next::Done)
        }
      },
    }
  }

  /// Wait for exactly one datagram, for at most [`Config::exchange_timeout`]
  fn recv(&mut self, when: When) -> Result<Message, Error<T::Error>> {
    let mut buf = vec![0u8; self.config.max_dgram_size];
    let give_up_at = self.now(when)?
                         .saturating_add(self.config.exchange_timeout.0);

    loop {
      match self.sock.recv(&mut buf) {
        | Ok(n) => {
          break Message::try_from_bytes(&buf[..n]).map_err(|e| when.what(What::FromBytes(e)))
        },
        | Err(nb::Error::Other(e)) => break Err(when.what(What::SockError(e))),
        | Err(nb::Error::WouldBlock) if self.now(when)? >= give_up_at => {
          break Err(when.what(What::Timeout))
        },
        | Err(nb::Error::WouldBlock) => std::thread::sleep(std::time::Duration::from_millis(1)),
      }
    }
  }
}
