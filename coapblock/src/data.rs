use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Length of [`firmware`] in bytes
pub const FIRMWARE_LEN: usize = 20_000;

const FIRMWARE_SEED: u64 = 0x0C0A_9B10_C4F1;

/// A firmware-sized blob served at `/fw` by the test server.
///
/// The bytes are pseudorandom (so they don't compress and a misplaced
/// block changes the checksum) but the same on every call and every machine.
pub fn firmware() -> Vec<u8> {
  let mut bytes = vec![0u8; FIRMWARE_LEN];
  ChaCha20Rng::seed_from_u64(FIRMWARE_SEED).fill_bytes(&mut bytes);
  bytes
}

/// Body served for any path the test server has no resource for
pub const DEFAULT_BODY: &[u8] = b"{'value':'foo'}";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn firmware_is_stable() {
    let a = firmware();
    assert_eq!(a.len(), FIRMWARE_LEN);
    assert_eq!(a, firmware());
    assert!(a.windows(2).any(|w| w[0] != w[1]));
  }
}
