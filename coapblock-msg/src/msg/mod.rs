use crate::cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;
use crate::TryFromBytes;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::known::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

/// Message payload; the request / response body.
///
/// See [RFC7252 - Payloads and Representations](https://datatracker.ietf.org/doc/html/rfc7252#section-5.5)
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd)]
pub struct Payload(pub Vec<u8>);

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

/// # `Message` struct
/// Low-level representation of a CoAP message.
///
/// Options are stored keyed by their [`OptNumber`], so they are always
/// serialized in ascending order no matter the order they were set in.
///
/// See [RFC7252 - Message Format](https://datatracker.ietf.org/doc/html/rfc7252#section-3)
///
/// ```
/// use coapblock_msg::*;
/// # //                       version  token len  code (2.05 Content)
/// # //                       |        |          /
/// # //                       |  type  |         /  message ID
/// # //                       |  |     |        |   |
/// # //                       vv vv vvvv vvvvvvvv vvvvvvvvvvvvvvvv
/// # let header: [u8; 4] = 0b_01_10_0001_01000101_0000000000000001u32.to_be_bytes();
/// # let token: [u8; 1] = [254u8];
/// # let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
/// let packet: Vec<u8> = /* bytes! */
/// # [header.as_ref(), token.as_ref(), payload.concat().as_ref()].concat();
///
/// let msg = Message::try_from_bytes(packet).unwrap();
///
/// assert_eq!(msg.ty, Type::Ack);
/// assert_eq!(msg.code, Code::new(2, 5));
/// assert_eq!(msg.token, Token(tinyvec::array_vec!([u8; 8] => 254)));
/// assert_eq!(msg.payload.0, b"hello, world!".to_vec());
/// assert_eq!(msg.block2(), None);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`opt::Opt`] for details
  pub opts: OptionMap,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Message {
  /// Create a new message with no options and an empty payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Version::V1,
           token,
           code,
           opts: Default::default(),
           payload: Default::default() }
  }

  /// Create a piggybacked ACK responding to this message.
  ///
  /// The response echoes this message's [`Id`] and [`Token`].
  pub fn ack(&self, code: Code) -> Self {
    Self::new(Type::Ack, code, self.id, self.token)
  }

  /// Get all values for an option
  pub fn get(&self, n: OptNumber) -> Option<&Vec<OptValue>> {
    self.opts.get(&n)
  }

  /// Get the first value for an option
  pub fn get_first(&self, n: OptNumber) -> Option<&OptValue> {
    self.get(n).and_then(|vs| vs.first())
  }

  /// Replace all values of an option with a single value
  pub fn set(&mut self, n: OptNumber, v: OptValue) {
    self.opts.insert(n, vec![v]);
  }

  /// Add a value to an option, keeping the values already present
  pub fn add(&mut self, n: OptNumber, v: OptValue) {
    self.opts.entry(n).or_default().push(v);
  }

  /// Remove an option
  pub fn remove(&mut self, n: OptNumber) -> Option<Vec<OptValue>> {
    self.opts.remove(&n)
  }

  /// Set an option to an unsigned integer value
  /// (big-endian, leading zero bytes stripped)
  pub fn set_uint(&mut self, n: OptNumber, value: u32) {
    self.set(n, OptValue::uint(value));
  }

  /// Read an option as an unsigned integer
  pub fn get_uint(&self, n: OptNumber) -> Option<Result<u32, OptValueTooLong>> {
    self.get_first(n).map(|v| v.as_uint(4))
  }

  /// Replace the Uri-Path options with the segments in `path`.
  ///
  /// Empty segments are skipped, so `"/"` and `""` both address the root
  /// resource.
  ///
  /// ```
  /// use coapblock_msg::*;
  ///
  /// let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token::default());
  /// msg.set_path("/a//b/");
  /// assert_eq!(msg.get(OptNumber::URI_PATH).map(|vs| vs.len()), Some(2));
  /// assert_eq!(msg.path().unwrap(), "a/b");
  /// ```
  pub fn set_path(&mut self, path: impl AsRef<str>) {
    self.remove(OptNumber::URI_PATH);
    path.as_ref()
        .split('/')
        .filter(|seg| !seg.is_empty())
        .for_each(|seg| self.add(OptNumber::URI_PATH, OptValue(seg.as_bytes().to_vec())));
  }

  /// Rejoin the Uri-Path options with `/` separators
  pub fn path(&self) -> Result<String, core::str::Utf8Error> {
    self.get(OptNumber::URI_PATH)
        .map(|segs| {
          segs.iter()
              .map(|seg| core::str::from_utf8(&seg.0))
              .collect::<Result<Vec<_>, _>>()
              .map(|segs| segs.join("/"))
        })
        .unwrap_or_else(|| Ok(String::new()))
  }

  /// Get the Block2 option, if present.
  ///
  /// Block values are at most 3 bytes long on the wire; a longer value
  /// yields `Some(Err(_))`.
  pub fn block2(&self) -> Option<Result<Block, OptValueTooLong>> {
    self.get_first(OptNumber::BLOCK2)
        .map(|v| v.as_uint(Block::MAX_LEN).map(Block::from))
  }

  /// Set the Block2 option
  pub fn set_block2(&mut self, block: Block) {
    self.set_uint(OptNumber::BLOCK2, block.into());
  }

  /// Get the Content-Format option, if present
  pub fn content_format(&self) -> Option<ContentFormat> {
    self.get_uint(OptNumber::CONTENT_FORMAT)
        .and_then(Result::ok)
        .map(|n| ContentFormat::from(n as u16))
  }

  /// Set the Content-Format option
  pub fn set_content_format(&mut self, format: ContentFormat) {
    self.set_uint(OptNumber::CONTENT_FORMAT, u16::from(format).into());
  }

  /// Set the Accept option
  pub fn set_accept(&mut self, format: ContentFormat) {
    self.set_uint(OptNumber::ACCEPT, u16::from(format).into());
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Message {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next()
                                      .ok_or_else(MessageParseError::eof)?
                                      .try_into()?;

    if tkl > 8 {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id: Id = Id::try_consume_bytes(&mut bytes)?;

    let token = bytes.take_exact(tkl as usize)
                     .ok_or_else(MessageParseError::eof)?;
    let token = Token(token.iter().copied().collect());

    let opts = OptionMap::try_consume_bytes(&mut bytes).map_err(Self::Error::OptParseError)?;

    let payload = match bytes.next() {
      | Some(0b11111111) if bytes.is_exhausted() => {
        return Err(Self::Error::PayloadMarkerWithoutPayload)
      },
      | Some(0b11111111) => bytes.take_until_end().to_vec(),
      | _ => Vec::new(),
    };

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload: Payload(payload) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    assert_eq!(Message::try_from_bytes(&msg).unwrap(), expect)
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::try_from(byte).unwrap();
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn parse_id() {
    let mut id_bytes = Cursor::new(34u16.to_be_bytes());
    let id = Id::try_consume_bytes(&mut id_bytes).unwrap();
    assert_eq!(id, Id(34));
  }

  #[test]
  fn token_longer_than_8_is_rejected() {
    let bytes = [0b_01_00_1001u8, 0b0100_0101, 0, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::InvalidTokenLength(9)));
  }

  #[test]
  fn truncated_token_is_eof() {
    let bytes = [0b_01_00_0100u8, 0b0100_0101, 0, 1, 0xAA];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::UnexpectedEndOfStream));
  }

  #[test]
  fn header_only_is_ok() {
    let msg = Message::try_from_bytes([0b_01_10_0000u8, 0b0100_0011, 0, 7]).unwrap();
    assert_eq!(msg.code, Code::new(2, 3));
    assert_eq!(msg.id, Id(7));
    assert_eq!(msg.token, Token::default());
    assert!(msg.payload.0.is_empty());
  }

  #[test]
  fn payload_marker_without_payload_is_rejected() {
    let bytes = [0b_01_10_0000u8, 0b0100_0101, 0, 1, 0xFF];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::PayloadMarkerWithoutPayload));
  }

  #[test]
  fn block2_too_long() {
    let mut msg = Message::new(Type::Ack, Code::new(2, 5), Id(1), Token::default());
    msg.set(OptNumber::BLOCK2, OptValue(vec![1, 2, 3, 4]));
    assert_eq!(msg.block2(),
               Some(Err(OptValueTooLong { max: 3,
                                          actual: 4 })));
  }

  #[test]
  fn path_roundtrips_through_options() {
    let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token::default());
    msg.set_path("fw");
    assert_eq!(msg.path().unwrap(), "fw");

    msg.set_path("/");
    assert_eq!(msg.get(OptNumber::URI_PATH), None);
    assert_eq!(msg.path().unwrap(), "");
  }
}
