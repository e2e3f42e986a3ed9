use tinyvec::ArrayVec;

/// # Message Token
///
/// 0 to 8 opaque bytes used to correlate requests and responses.
///
/// Unlike the message [`Id`](super::Id), which identifies a single datagram,
/// the token identifies a request/response exchange; a response must carry
/// the exact token of the request it answers.
///
/// See [RFC7252 - Token](https://datatracker.ietf.org/doc/html/rfc7252#section-5.3.1)
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Hash, Debug)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Create a full-width (8-byte) token
  pub fn from_bytes(bytes: [u8; 8]) -> Self {
    Token(ArrayVec::from(bytes))
  }

  /// The token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }
}

impl core::fmt::LowerHex for Token {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
  }
}

impl core::fmt::Display for Token {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "{:x}", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_as_hex() {
    let token = Token::from_bytes([0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 0x0a]);
    assert_eq!(token.to_string(), "deadbeef0001020a");
    assert_eq!(Token::default().to_string(), "");
  }
}
