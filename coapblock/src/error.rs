use coapblock_msg::{Code, Id, MessageParseError, MessageToBytesError, OptValueTooLong, Token};

use crate::target::TargetError;

/// The context that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// We were turning a URL into an address
  Parsing,
  /// We were opening a socket to the server
  Dialing,
  /// We were performing the exchange for a block
  Exchange {
    /// The block being asked for
    num: u32,
    /// Message ID of the request
    id: Id,
    /// Token of the request (zero-length if the failure
    /// happened before a token was drawn)
    token: Token,
  },
}

impl core::fmt::Display for When {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | When::Parsing => write!(f, "parsing target"),
      | When::Dialing => write!(f, "dialing server"),
      | When::Exchange { num, id, token } => {
        write!(f, "exchanging block {} (id {}, token {})", num, id.0, token)
      },
    }
  }
}

impl When {
  /// Construct a specific error from the context the error occurred in
  pub fn what<E: core::fmt::Debug>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// An error encountered while fetching a resource.
///
/// `E` is the error type of the [`Transport`](crate::net::Transport) in use.
#[derive(Debug, thiserror::Error)]
#[error("{what} ({when})")]
pub struct Error<E: core::fmt::Debug> {
  /// What happened?
  pub what: What<E>,
  /// What were we doing when it happened?
  pub when: When,
}

impl<E: core::fmt::Debug> Error<E> {
  /// Did this transfer fail because the overall deadline passed?
  pub fn is_cancelled(&self) -> bool {
    matches!(self.what, What::DeadlineExceeded)
  }

  /// Is this `FromBytes`?
  pub fn message_parse_error(&self) -> Option<&MessageParseError> {
    match self.what {
      | What::FromBytes(ref e) => Some(e),
      | _ => None,
    }
  }
}

/// A contextless error with some additional debug data attached.
#[derive(Debug, thiserror::Error)]
pub enum What<E: core::fmt::Debug> {
  /// The URL was not a usable `coap://` target
  #[error(transparent)]
  Target(#[from] TargetError),
  /// Some socket operation (e.g. sending or receiving) failed
  #[error("socket error: {0:?}")]
  SockError(E),
  /// Serializing a request to bytes failed
  #[error("failed to serialize request: {0}")]
  ToBytes(MessageToBytesError),
  /// Parsing a response from bytes failed
  #[error("failed to parse response: {0}")]
  FromBytes(MessageParseError),
  /// The response's token did not match the request's
  #[error("token mismatch: expected {expected}, got {actual}")]
  TokenMismatch {
    /// Token sent in the request
    expected: Token,
    /// Token seen in the response
    actual: Token,
  },
  /// The response code was neither 2.05 Content nor 2.03 Valid
  #[error("unexpected response code {0}")]
  UnexpectedCode(Code),
  /// The response had a Block2 option too long to be a block
  #[error("malformed Block2 option: {} bytes (max {})", .0.actual, .0.max)]
  MalformedBlock2(OptValueTooLong),
  /// No response arrived within the per-exchange timeout
  #[error("timed out waiting for a response")]
  Timeout,
  /// The transfer's overall deadline passed before
  /// the next exchange could start
  #[error("transfer deadline exceeded")]
  DeadlineExceeded,
  /// The clock failed to provide timing.
  ///
  /// See [`embedded_time::clock::Error`]
  #[error("clock error")]
  ClockError,
}
