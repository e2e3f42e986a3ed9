use tinyvec::ArrayVec;

use crate::*;

/// Serialize a value into a datagram
pub trait TryIntoBytes {
  #[allow(missing_docs)]
  type Error;

  /// Write `self` out into any byte collection, most often a `Vec<u8>`
  ///
  /// ```
  /// use coapblock_msg::{Code, Id, Message, Token, TryIntoBytes, Type};
  ///
  /// let msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token::default());
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  ///
  /// assert_eq!(bytes, vec![0b0100_0000, 0b0000_0001, 0, 1]);
  /// ```
  fn try_into_bytes<C: Extend<u8> + Default>(self) -> Result<C, Self::Error>;
}

/// A [`Message`] that can't be put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageToBytesError {
  /// An option's value was longer than the 16-bit length field allows
  OptionValueTooLong {
    /// Option number
    number: u32,
    /// Length of the value
    len: usize,
  },
  /// The gap between two option numbers did not fit in the 16-bit delta field
  OptionDeltaTooLarge(u32),
}

impl core::fmt::Display for MessageToBytesError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::OptionValueTooLong { number, len } => {
        write!(f, "option {} value of {} bytes is too long", number, len)
      },
      | Self::OptionDeltaTooLarge(n) => write!(f, "option delta {} is too large", n),
    }
  }
}

impl std::error::Error for MessageToBytesError {}

const PAYLOAD_MARKER: u8 = 0xFF;

impl TryIntoBytes for Message {
  type Error = MessageToBytesError;

  fn try_into_bytes<C: Extend<u8> + Default>(self) -> Result<C, Self::Error> {
    let mut out = C::default();

    let first = u8::from(Byte1 { ver: self.ver,
                                 ty: self.ty,
                                 tkl: self.token.0.len() as u8 });
    let [id_hi, id_lo] = self.id.0.to_be_bytes();
    out.extend([first, u8::from(self.code), id_hi, id_lo]);
    out.extend(self.token.0);

    let mut prev = 0u32;
    for (OptNumber(number), values) in self.opts {
      for value in values {
        let delta = u16::try_from(number - prev).map_err(|_| {
                                                  MessageToBytesError::OptionDeltaTooLarge(number - prev)
                                                })?;

        if u16::try_from(value.0.len()).is_err() {
          return Err(MessageToBytesError::OptionValueTooLong { number,
                                                               len: value.0.len() });
        }

        Opt { delta: OptDelta(delta),
              value }.extend_bytes(&mut out);
        prev = number;
      }
    }

    if !self.payload.0.is_empty() {
      out.extend([PAYLOAD_MARKER]);
      out.extend(self.payload.0);
    }

    Ok(out)
  }
}

/// The 4-bit nibble that goes in an option header for a delta or length,
/// and the 0-2 extension bytes that follow the header.
///
/// 0-12 fit in the nibble, 13-268 use nibble 13 plus one byte,
/// anything larger uses nibble 14 plus two bytes.
pub(crate) fn ext_nibble(val: u16) -> (u8, ArrayVec<[u8; 2]>) {
  let mut ext = ArrayVec::new();
  let nibble = match val {
    | 0..=12 => val as u8,
    | 13..=268 => {
      ext.push((val - 13) as u8);
      13
    },
    | _ => {
      ext.extend((val - 269).to_be_bytes());
      14
    },
  };

  (nibble, ext)
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    (b.ver.0 << 6) | (u8::from(b.ty) << 4) | (b.tkl & 0b1111)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{assert_eqb, assert_eqb_iter};

  #[test]
  fn msg() {
    let (msg, expected) = test_msg();
    let actual: Vec<u8> = msg.try_into_bytes().unwrap();
    assert_eqb_iter!(actual, expected);
  }

  #[test]
  fn first_header_byte() {
    let byte = Byte1 { ver: Version::V1,
                       ty: Type::Non,
                       tkl: 8 };
    assert_eqb!(u8::from(byte), 0b_01_01_1000u8)
  }

  #[test]
  fn nibble_boundaries() {
    let cases: [(u16, u8, &[u8]); 6] = [(0, 0, &[]),
                                        (12, 12, &[]),
                                        (13, 13, &[0]),
                                        (268, 13, &[255]),
                                        (269, 14, &[0, 0]),
                                        (1300, 14, &[0x04, 0x07])];

    for (val, nibble, ext) in cases {
      let (actual_nibble, actual_ext) = ext_nibble(val);
      assert_eq!(actual_nibble, nibble, "nibble for {}", val);
      assert_eq!(actual_ext.as_slice(), ext, "extension bytes for {}", val);
    }
  }

  #[test]
  fn extended_delta_and_length() {
    let opt = Opt { delta: OptDelta(23),
                    value: OptValue(vec![7; 300]) };
    let mut actual = Vec::<u8>::new();
    opt.extend_bytes(&mut actual);

    assert_eqb_iter!(&actual[..4], [0b1101_1110u8, 23 - 13, 0, (300u16 - 269) as u8]);
    assert_eq!(actual.len(), 4 + 300);
  }

  #[test]
  fn repeated_options_use_zero_delta() {
    let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(2), Token::default());
    msg.set_path("a/b");
    msg.set_block2(Block::new(1, false, Szx::S1024));

    let actual: Vec<u8> = msg.try_into_bytes().unwrap();
    let expected = [0b0100_0000u8, 1, 0, 2,
                    // Uri-Path "a", Uri-Path "b"
                    0b1011_0001, b'a', 0b0000_0001, b'b',
                    // Block2 num 1 szx 6 (delta 12)
                    0b1100_0001, 0b0001_0110];
    assert_eqb_iter!(actual, expected);
  }

  #[test]
  fn no_payload_marker() {
    let msg = Message::new(Type::Con, Code::new(2, 5), Id(0), Token::default());

    assert_ne!(msg.try_into_bytes::<Vec<_>>().unwrap().last(),
               Some(&PAYLOAD_MARKER));
  }

  #[test]
  fn huge_option_gap_is_an_error() {
    let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(0), Token::default());
    msg.set(OptNumber(70_000), OptValue(vec![1]));

    assert_eq!(msg.try_into_bytes::<Vec<u8>>(),
               Err(MessageToBytesError::OptionDeltaTooLarge(70_000)));
  }
}
