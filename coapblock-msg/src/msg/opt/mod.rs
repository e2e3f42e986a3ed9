use std::collections::BTreeMap;

use crate::cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;

/// Options with meaning this crate knows about
pub mod known;

/// Option parse errors
pub mod parse_error;
pub use parse_error::*;

/// Options in a message, keyed by number.
///
/// Options may repeat (e.g. Uri-Path), so each number maps to a list of values.
pub type OptionMap = BTreeMap<OptNumber, Vec<OptValue>>;

pub(crate) fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                                     bytes: &mut Cursor<A>,
                                                     reserved_err: OptParseError)
                                                     -> Result<u16, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok((n as u16) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]).saturating_add(269)),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(head as u16),
  }
}

/// # `Opt` struct
/// Low-level representation of a freshly parsed CoAP Option,
/// before its delta has been turned into an [`OptNumber`].
///
/// See [RFC7252 - Option Format](https://datatracker.ietf.org/doc/html/rfc7252#section-3.1)
#[derive(Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct Opt {
  /// See [`OptDelta`]
  pub delta: OptDelta,
  /// See [`OptValue`]
  pub value: OptValue,
}

impl Opt {
  /// Write the option header, any extended delta / length bytes, then the value
  pub fn extend_bytes(self, bytes: &mut impl Extend<u8>) {
    let (delta, delta_ext) = crate::to_bytes::ext_nibble(self.delta.0);
    let (len, len_ext) = crate::to_bytes::ext_nibble(self.value.0.len() as u16);

    bytes.extend([(delta << 4) | len]);
    bytes.extend(delta_ext);
    bytes.extend(len_ext);
    bytes.extend(self.value.0);
  }
}

/// The "Option Delta" is the difference between this Option's Number
/// and the previous Option's number.
#[derive(Copy, Clone, Hash, PartialEq, PartialOrd, Debug, Default)]
pub struct OptDelta(pub u16);

/// # Option Number
/// Identifies which option is being set (e.g. Content-Format has a Number of 12)
///
/// See [RFC7252 - Option Numbers](https://datatracker.ietf.org/doc/html/rfc7252#section-5.4.6)
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u32);

/// Whether an option must be understood by the recipient
///
/// See [RFC7252 - Critical/Elective](https://datatracker.ietf.org/doc/html/rfc7252#section-5.4.1)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionMustBeProcessed {
  /// This option must be processed,
  /// and a response that ignores it
  /// will be rejected.
  ///
  /// Corresponds to the option being "critical"
  /// in strict CoAP terms
  Yes,
  /// This option does not _need_ to
  /// be processed.
  ///
  /// Corresponds to the option being "elective"
  /// in strict CoAP terms
  No,
}

impl OptNumber {
  #[allow(missing_docs)]
  pub const URI_PATH: OptNumber = OptNumber(11);
  #[allow(missing_docs)]
  pub const CONTENT_FORMAT: OptNumber = OptNumber(12);
  #[allow(missing_docs)]
  pub const ACCEPT: OptNumber = OptNumber(17);
  #[allow(missing_docs)]
  pub const BLOCK2: OptNumber = OptNumber(23);
  #[allow(missing_docs)]
  pub const SIZE2: OptNumber = OptNumber(28);

  /// Whether or not this option may be ignored by a server
  pub fn must_be_processed(&self) -> OptionMustBeProcessed {
    match self.0 & 0b1 {
      | 1 => OptionMustBeProcessed::Yes,
      | _ => OptionMustBeProcessed::No,
    }
  }
}

/// The raw bytes of an option's value
///
/// See [RFC7252 - Option Value Formats](https://datatracker.ietf.org/doc/html/rfc7252#section-3.2)
#[derive(Default, Clone, Hash, PartialEq, Eq, PartialOrd, Debug)]
pub struct OptValue(pub Vec<u8>);

/// An integer option's value had more bytes than allowed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptValueTooLong {
  /// Maximum number of bytes
  pub max: usize,
  /// Number of bytes in the value
  pub actual: usize,
}

impl OptValue {
  /// Encode an unsigned integer option value; the shortest
  /// big-endian representation with no leading zero bytes.
  ///
  /// ```
  /// use coapblock_msg::OptValue;
  ///
  /// assert_eq!(OptValue::uint(0).0, Vec::<u8>::new());
  /// assert_eq!(OptValue::uint(0x0102).0, vec![1, 2]);
  /// ```
  pub fn uint(n: u32) -> Self {
    OptValue(n.to_be_bytes()
              .into_iter()
              .skip_while(|b| *b == 0)
              .collect())
  }

  /// Decode an unsigned integer option value of at most `max` bytes
  pub fn as_uint(&self, max: usize) -> Result<u32, OptValueTooLong> {
    let max = max.min(4);

    if self.0.len() > max {
      return Err(OptValueTooLong { max,
                                   actual: self.0.len() });
    }

    Ok(self.0.iter().fold(0u32, |n, b| (n << 8) | u32::from(*b)))
  }
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for Opt {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    // the payload marker is left for the message to consume
    let byte1 = match bytes.peek_next() {
      | None | Some(0b11111111) => return Err(OptParseError::OptionsExhausted),
      | Some(b) => {
        bytes.next();
        b
      },
    };

    // NOTE: Delta **MUST** be consumed before Value; extended delta bytes precede extended length bytes
    let delta = parse_opt_len_or_delta(byte1 >> 4,
                                       bytes,
                                       OptParseError::ReservedDelta)?;
    let delta = OptDelta(delta);

    let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                     bytes,
                                     OptParseError::ReservedLength)?
              as usize;

    let value = bytes.take_exact(len)
                     .ok_or(OptParseError::UnexpectedEndOfStream)?
                     .to_vec();

    Ok(Opt { delta,
             value: OptValue(value) })
  }
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for OptionMap {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    let mut opts = OptionMap::new();
    let mut number = 0u32;

    loop {
      match Opt::try_consume_bytes(bytes) {
        | Ok(opt) => {
          number += opt.delta.0 as u32;
          opts.entry(OptNumber(number)).or_default().push(opt.value);
        },
        | Err(OptParseError::OptionsExhausted) => break Ok(opts),
        | Err(e) => break Err(e),
      }
    }
  }
}
