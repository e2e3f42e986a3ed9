/// Protocol version, the top 2 bits of the first header byte.
///
/// RFC7252 only defines [`Version::V1`], which is also the default.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub struct Version(pub u8);

impl Version {
  /// CoAP as specified by RFC7252
  pub const V1: Version = Version(1);
}

impl Default for Version {
  fn default() -> Self {
    Self::V1
  }
}
