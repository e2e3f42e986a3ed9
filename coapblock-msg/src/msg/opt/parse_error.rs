/// Why an option couldn't be read off the wire
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum OptParseError {
  /// The bytes ran out partway through an option
  UnexpectedEndOfStream,
  /// Delta nibble was 15, which RFC7252 reserves for the payload marker
  ReservedDelta,
  /// Length nibble was 15, which RFC7252 reserves
  ReservedLength,
  /// Hit the payload marker or the end of the message.
  ///
  /// Ends the option list; never surfaced from parsing a whole message.
  OptionsExhausted,
}

impl OptParseError {
  /// Shorthand for [`OptParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

impl core::fmt::Display for OptParseError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::UnexpectedEndOfStream => write!(f, "option truncated"),
      | Self::ReservedDelta => write!(f, "option delta nibble 15 is reserved"),
      | Self::ReservedLength => write!(f, "option length nibble 15 is reserved"),
      | Self::OptionsExhausted => write!(f, "no more options"),
    }
  }
}

impl std::error::Error for OptParseError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_names_the_nibble() {
    assert_eq!(OptParseError::ReservedDelta.to_string(),
               "option delta nibble 15 is reserved");
    assert_eq!(OptParseError::eof().to_string(), "option truncated");
  }
}
