use crate::cursor::Cursor;

/// Decode a whole value (e.g. a [`Message`](crate::Message)) from a datagram
pub trait TryFromBytes<A: AsRef<[u8]>>: Sized {
  #[allow(missing_docs)]
  type Error;

  /// Decode `bytes`; anything left over after the value is an error
  /// or payload, depending on the implementor
  fn try_from_bytes(bytes: A) -> Result<Self, Self::Error>;
}

/// Decode one piece of a message from wherever `bytes` is positioned,
/// leaving the cursor just past it
pub(crate) trait TryConsumeBytes<A: AsRef<[u8]>>: Sized {
  type Error;

  fn try_consume_bytes(bytes: &mut Cursor<A>) -> Result<Self, Self::Error>;
}
