/// Block size exponent.
///
/// The 3 lowest bits of a Block option; the block size is
/// `16 * 2^szx` bytes, i.e. `2^(szx + 4)`.
///
/// ```
/// use coapblock_msg::Szx;
///
/// assert_eq!(Szx::S1024.size(), 1024);
/// assert_eq!(Szx::new(0).size(), 16);
/// assert_eq!(Szx::from_size(100), Szx::S64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Szx(u8);

impl Szx {
  #[allow(missing_docs)]
  pub const S16: Szx = Szx(0);
  #[allow(missing_docs)]
  pub const S32: Szx = Szx(1);
  #[allow(missing_docs)]
  pub const S64: Szx = Szx(2);
  #[allow(missing_docs)]
  pub const S128: Szx = Szx(3);
  #[allow(missing_docs)]
  pub const S256: Szx = Szx(4);
  #[allow(missing_docs)]
  pub const S512: Szx = Szx(5);
  #[allow(missing_docs)]
  pub const S1024: Szx = Szx(6);

  /// Create a Szx from a raw exponent, keeping only the 3 low bits
  pub const fn new(szx: u8) -> Self {
    Szx(szx & 0b111)
  }

  /// Pick the largest block size (16 to 1024 bytes)
  /// that is not larger than `size`.
  pub fn from_size(size: u16) -> Self {
    let size = size.clamp(16, 1024);
    Szx((15 - size.leading_zeros() - 4) as u8)
  }

  /// The raw exponent
  pub const fn exponent(&self) -> u8 {
    self.0
  }

  /// The number of bytes in a block of this size
  pub const fn size(&self) -> usize {
    16 << self.0
  }
}

/// Pack the three fields of a Block option into its integer value.
///
/// ```text
///  num   more  szx
///  |     |     |
///  vvvv  v     vvv
///  ...n  m     sss
/// ```
pub fn pack(num: u32, more: bool, szx: Szx) -> u32 {
  let num = num << 4;
  let more = u32::from(more) << 3;
  let szx = u32::from(szx.0);

  num | more | szx
}

/// Split the integer value of a Block option into `(more, num, szx)`.
///
/// Exact inverse of [`pack`] for all `num < 2^28`.
pub fn unpack(value: u32) -> (bool, u32, Szx) {
  let more = (value & 0b1000) >> 3 == 1;
  let num = value >> 4;
  let szx = Szx::new((value & 0b111) as u8);

  (more, num, szx)
}

/// Three items of information may need to be transferred in a
/// Block (Block1 or Block2) option:
/// * the size of the block ([`Block::szx`])
/// * whether more blocks are following ([`Block::more`])
/// * the relative number of the block ([`Block::num`]) within a sequence of blocks with the given size.
///
/// See [RFC7959 - The Block2 and Block1 Options](https://datatracker.ietf.org/doc/html/rfc7959#section-2.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Block(u32);

impl Block {
  /// Block option values are at most 3 bytes on the wire
  pub const MAX_LEN: usize = 3;

  #[allow(missing_docs)]
  pub fn new(num: u32, more: bool, szx: Szx) -> Self {
    Self(pack(num, more, szx))
  }

  #[allow(missing_docs)]
  pub fn szx(&self) -> Szx {
    unpack(self.0).2
  }

  /// Size of this block in bytes
  pub fn size(&self) -> usize {
    self.szx().size()
  }

  #[allow(missing_docs)]
  pub fn more(&self) -> bool {
    unpack(self.0).0
  }

  #[allow(missing_docs)]
  pub fn num(&self) -> u32 {
    unpack(self.0).1
  }

  /// Byte offset of this block within the whole resource
  pub fn offset(&self) -> usize {
    self.num() as usize * self.size()
  }
}

impl From<Block> for u32 {
  fn from(b: Block) -> Self {
    b.0
  }
}

impl From<u32> for Block {
  fn from(n: u32) -> Self {
    Block(n)
  }
}
