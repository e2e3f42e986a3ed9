/// A forward-only cursor over a byte buffer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor<T> {
  t: T,
  cursor: usize,
}

impl<T: AsRef<[u8]>> Cursor<T> {
  pub(crate) fn new(t: T) -> Cursor<T> {
    Cursor { t, cursor: 0 }
  }

  /// Take the next byte, returning None if the cursor is exhausted.
  pub(crate) fn next(&mut self) -> Option<u8> {
    self.take_exact(1).map(|a| a[0])
  }

  /// Look at the next byte without advancing
  pub(crate) fn peek_next(&self) -> Option<u8> {
    self.t.as_ref().get(self.cursor).copied()
  }

  /// Take `n` bytes, returning None (and not advancing)
  /// if fewer than `n` bytes remain.
  pub(crate) fn take_exact(&mut self, n: usize) -> Option<&[u8]> {
    if n > self.remaining() {
      None
    } else {
      let start = self.cursor;
      self.cursor += n;
      Some(&self.t.as_ref()[start..start + n])
    }
  }

  /// Consume everything left in the buffer
  pub(crate) fn take_until_end(&mut self) -> &[u8] {
    let start = self.cursor;
    self.cursor = self.t.as_ref().len();
    &self.t.as_ref()[start..]
  }

  pub(crate) fn remaining(&self) -> usize {
    self.t.as_ref().len() - self.cursor
  }

  pub(crate) fn is_exhausted(&self) -> bool {
    self.remaining() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  pub fn next() {
    let mut cur = Cursor::new(vec![1]);
    assert_eq!(cur.next(), Some(1));
    assert_eq!(cur.next(), None);
    assert!(cur.is_exhausted());
  }

  #[test]
  pub fn take_exact() {
    let mut cur = Cursor::new(vec![1, 2, 3]);
    assert_eq!(cur.take_exact(2), Some([1, 2].as_ref()));
    assert_eq!(cur.take_exact(2), None);
    assert_eq!(cur.take_exact(1), Some([3].as_ref()));
  }

  #[test]
  pub fn take_until_end() {
    let mut cur = Cursor::new(vec![1, 2, 3]);
    cur.next();
    assert_eq!(cur.remaining(), 2);
    assert_eq!(cur.take_until_end(), &[2, 3]);
    assert_eq!(cur.take_until_end(), &[]);
  }
}
