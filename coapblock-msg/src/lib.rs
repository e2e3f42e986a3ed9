//! Low-level representation of the CoAP messages spoken by `coapblock`.
//!
//! This is deliberately a subset of RFC7252: enough to build a confirmable
//! GET carrying a Block2 option and to pick apart whatever comes back
//! (header, token, options and payload).
//!
//! ```rust
//! use coapblock_msg::{Block, Code, Id, Message, Szx, Token, TryFromBytes, TryIntoBytes, Type};
//!
//! let mut req = Message::new(Type::Con, Code::new(0, 1), Id(1), Token::default());
//! req.set_path("fw");
//! req.set_block2(Block::new(0, false, Szx::S1024));
//!
//! let bytes: Vec<u8> = req.clone().try_into_bytes().unwrap();
//! assert_eq!(Message::try_from_bytes(&bytes).unwrap(), req);
//! ```

#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code, missing_copy_implementations))]
#![deny(missing_docs)]

pub(crate) mod cursor;

#[doc(hidden)]
pub mod from_bytes;

/// Message structs
pub mod msg;

#[doc(hidden)]
pub mod to_bytes;

#[doc(inline)]
pub use from_bytes::TryFromBytes;
#[doc(inline)]
pub use msg::*;
#[doc(inline)]
pub use to_bytes::{MessageToBytesError, TryIntoBytes};

#[cfg(test)]
pub(crate) fn test_msg() -> (Message, Vec<u8>) {
  use std::collections::BTreeMap;

  //                          ver type tkl code (2.05)  id
  let header: [u8; 4] = 0b_01_10_0001_0100_0101_0000_0000_0000_0001_u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let content_format: &[u8] = &[42];
  // Content-Format (12): delta 12, len 1
  // Block2 (23): delta 11, len 1, num 2 more szx 2
  let options: [&[u8]; 2] = [&[0b_1100_0001u8], content_format];
  let block2: [u8; 2] = [0b_1011_0001u8, 0b0010_1010];
  let payload: [&[u8]; 2] = [&[0b1111_1111_u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               block2.as_ref(),
               payload.concat().as_ref()].concat();

  let msg = Message { id: Id(1),
                      ty: Type::Ack,
                      ver: Version(1),
                      token: Token(tinyvec::array_vec!([u8; 8] => 254)),
                      opts: BTreeMap::from([(OptNumber::CONTENT_FORMAT,
                                             vec![OptValue(content_format.to_vec())]),
                                            (OptNumber::BLOCK2, vec![OptValue(vec![0b0010_1010])])]),
                      code: Code { class: 2,
                                   detail: 5 },
                      payload: Payload(b"hello, world!".to_vec()) };
  (msg, bytes)
}
