use coapblock_msg::{ContentFormat, Szx};
use embedded_time::duration::Milliseconds;

use crate::time::Millis;

/// Overall transfer timeout used by [`crate::get`] when the caller passes zero.
///
/// ```
/// use coapblock::config::DEFAULT_TRANSFER_TIMEOUT;
/// use embedded_time::duration::Milliseconds;
///
/// assert_eq!(DEFAULT_TRANSFER_TIMEOUT, Milliseconds(30_000u64));
/// ```
pub const DEFAULT_TRANSFER_TIMEOUT: Millis = Milliseconds(30_000);

/// When a transfer should draw a new request token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rotation {
  /// Every exchange (every block) gets a fresh, random token.
  PerExchange,
  /// One random token is drawn at the start of the transfer and
  /// reused for every block.
  PerTransfer,
}

impl Default for Rotation {
  fn default() -> Self {
    Rotation::PerExchange
  }
}

/// Runtime config for blockwise transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// How long to wait for the response to a single request
  /// before failing the transfer.
  ///
  /// This is independent of the overall transfer timeout; it is
  /// reset every time a request is sent.
  ///
  /// Defaults to 5 seconds.
  /// ```
  /// use coapblock::config::Config;
  /// use embedded_time::duration::Milliseconds;
  ///
  /// assert_eq!(Config::default().exchange_timeout, Milliseconds(5_000u64));
  /// ```
  pub exchange_timeout: Millis,
  /// Block size to ask for in the first request.
  ///
  /// Servers may answer with a smaller block size, which
  /// is then used for the rest of the transfer.
  ///
  /// Defaults to 1024 bytes.
  /// ```
  /// use coapblock::config::Config;
  /// use coapblock::msg::Szx;
  ///
  /// assert_eq!(Config::default().initial_szx, Szx::S1024);
  /// ```
  pub initial_szx: Szx,
  /// See [`Rotation`].
  ///
  /// Defaults to a new token for every exchange.
  /// ```
  /// use coapblock::config::{Config, Rotation};
  ///
  /// assert_eq!(Config::default().rotation, Rotation::PerExchange);
  /// ```
  pub rotation: Rotation,
  /// Size of the buffer datagrams are received into.
  ///
  /// Anything past this many bytes in an inbound datagram is lost,
  /// so this must fit the largest block plus the message header & options.
  ///
  /// Defaults to 2048 bytes.
  pub max_dgram_size: usize,
  /// Content-Format to ask the server for with an Accept option.
  ///
  /// Defaults to `None`; no Accept option is sent.
  pub accept: Option<ContentFormat>,
}

impl Default for Config {
  fn default() -> Self {
    Config { exchange_timeout: Milliseconds(5_000),
             initial_szx: Szx::S1024,
             rotation: Rotation::default(),
             max_dgram_size: 2048,
             accept: None }
  }
}
