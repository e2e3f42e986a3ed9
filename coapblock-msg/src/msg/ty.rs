use super::MessageParseError;

/// Message type, the 2 bits after the version in the first header byte
///
/// Requests sent by `coapblock` are always [`Type::Con`]; the server
/// answers those with [`Type::Ack`] and a piggybacked response.
///
/// [RFC7252 Section 3](https://datatracker.ietf.org/doc/html/rfc7252#section-3)
#[derive(Copy, Clone, Hash, Eq, Ord, PartialEq, PartialOrd, Debug)]
pub enum Type {
  /// Non-confirmable; sent without asking for an ack
  Non,
  /// Confirmable; the peer answers with exactly one Ack or Reset
  Con,
  /// Acknowledges a Con, possibly carrying the response
  Ack,
  /// The peer got the message but couldn't make sense of it
  Reset,
}

impl TryFrom<u8> for Type {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    match b {
      | 0 => Ok(Type::Con),
      | 1 => Ok(Type::Non),
      | 2 => Ok(Type::Ack),
      | 3 => Ok(Type::Reset),
      | _ => Err(MessageParseError::InvalidType(b)),
    }
  }
}

impl From<Type> for u8 {
  fn from(t: Type) -> u8 {
    match t {
      | Type::Con => 0,
      | Type::Non => 1,
      | Type::Ack => 2,
      | Type::Reset => 3,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_values() {
    assert_eq!(u8::from(Type::Con), 0);
    assert_eq!(u8::from(Type::Reset), 3);
    assert_eq!(Type::try_from(2u8), Ok(Type::Ack));
    assert_eq!(Type::try_from(4u8), Err(MessageParseError::InvalidType(4)));
  }
}
