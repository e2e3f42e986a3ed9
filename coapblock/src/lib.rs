//! `coapblock` is a diagnostic client for CoAP blockwise transfers
//! ([RFC7959](https://datatracker.ietf.org/doc/html/rfc7959)) over UDP.
//!
//! It exists to check that a device or server correctly serves a large
//! resource in bounded-size blocks, and in particular that it copes with
//! a client that uses a **fresh, unpredictable token for every exchange**,
//! something most blockwise helpers in CoAP libraries do not allow.
//!
//! ## Blockwise GET
//! A resource larger than one block is fetched by repeatedly sending a
//! confirmable GET carrying a Block2 option that names the block wanted,
//! and appending each response's payload until the server reports that no
//! more blocks follow:
//!
//! ```text
//! client                                  server
//!   | CON GET /fw  token=a1.. Block2 0/0/1024  |
//!   |----------------------------------------->|
//!   |   ACK 2.05   token=a1.. Block2 0/1/128   |
//!   |<-----------------------------------------|
//!   | CON GET /fw  token=5c.. Block2 1/0/128   |
//!   |----------------------------------------->|
//!   |   ACK 2.05   token=5c.. Block2 1/0/128   |
//!   |<-----------------------------------------|
//! ```
//!
//! The client always follows the block size the server reports, and a
//! response whose token differs from its request fails the transfer.
//!
//! ## Usage
//! ```no_run
//! use std::time::Duration;
//!
//! let body = coapblock::get("coap://127.0.0.1:5683/fw",
//!                           Duration::from_secs(30),
//!                           coapblock::config::Config::default()).unwrap();
//! println!("{} bytes", body.len());
//! ```
//!
//! For custom transports, clocks or token sources, see [`blockwise::Transfer`].

// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]

use ::std::time::Duration;

#[cfg(test)]
pub(crate) mod test;

pub(crate) mod logging;

/// the blockwise transfer engine
pub mod blockwise;

/// message codes
pub mod code;

/// configuring runtime behavior
pub mod config;

/// errors
pub mod error;

/// network abstractions
pub mod net;

/// time abstractions
pub mod time;

/// request token generation
pub mod token;

/// `coap://` URL targets
pub mod target;

/// a small blockwise test server
pub mod server;

/// deterministic payloads served by the test server
pub mod data;

pub use coapblock_msg as msg;

use crate::blockwise::Transfer;
use crate::config::Config;
use crate::error::{Error, What, When};
use crate::target::Target;
use embedded_time::duration::Milliseconds;
use crate::token::Random;

/// Fetch the resource at a `coap://host[:port]/path` URL with a blockwise GET.
///
/// This is the all-in-one entry point:
///  - the URL is validated (only `coap` with a host is accepted)
///  - the host is resolved and a UDP socket connected to it
///  - the transfer runs with tokens chosen per [`Config::rotation`]
///
/// A zero `timeout` is replaced with [`config::DEFAULT_TRANSFER_TIMEOUT`].
///
/// The socket is closed when this returns, whether or not the transfer succeeded.
pub fn get(url: impl AsRef<str>,
           timeout: Duration,
           config: Config)
           -> Result<Vec<u8>, Error<::std::io::Error>> {
  let target = Target::parse(url.as_ref()).map_err(|e| When::Parsing.what(What::Target(e)))?;
  let addr = target.resolve()
                   .map_err(|e| When::Parsing.what(What::Target(e)))?;

  let timeout = match timeout.as_millis() {
    | 0 => config::DEFAULT_TRANSFER_TIMEOUT,
    | ms => Milliseconds(u64::try_from(ms).unwrap_or(u64::MAX)),
  };

  let sock = net::dial(addr).map_err(|e| When::Dialing.what(What::SockError(e)))?;
  log::debug!("dialed {} for {}", addr, target);

  Transfer::new(sock, time::StdClock::new(), Random::from_entropy(), config).get(&target.path,
                                                                                 timeout)
}

macro_rules! code_const {
  (rfc7252($section:literal) $name:ident = $c:literal * $d:literal) => {
    #[doc = concat!("[RFC7252 Section ", $section, "](https://datatracker.ietf.org/doc/html/rfc7252#section-", $section, ")")]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: coapblock_msg::Code = coapblock_msg::Code::new($c, $d);
  };
}

pub(crate) use code_const;
