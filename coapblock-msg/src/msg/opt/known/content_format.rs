/// Value of the Content-Format and Accept options.
///
/// Only the formats the test server serves get a name; anything
/// else round-trips through [`ContentFormat::Other`].
///
/// [RFC7252 Section 12.3](https://datatracker.ietf.org/doc/html/rfc7252#section-12.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentFormat {
  /// `application/octet-stream` (42)
  OctetStream,
  /// `application/json` (50)
  Json,
  /// Any other registered number
  Other(u16),
}

impl From<ContentFormat> for u16 {
  fn from(f: ContentFormat) -> Self {
    match f {
      | ContentFormat::OctetStream => 42,
      | ContentFormat::Json => 50,
      | ContentFormat::Other(n) => n,
    }
  }
}

impl From<u16> for ContentFormat {
  fn from(n: u16) -> Self {
    match n {
      | 42 => ContentFormat::OctetStream,
      | 50 => ContentFormat::Json,
      | n => ContentFormat::Other(n),
    }
  }
}
