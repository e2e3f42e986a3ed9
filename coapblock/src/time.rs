use embedded_time::rate::Fraction;
use embedded_time::Instant;

/// A duration, in milliseconds
pub type Millis = embedded_time::duration::Milliseconds<u64>;

/// Supertrait of [`embedded_time::Clock`] pinning the
/// type of "ticks" to u64
pub trait Clock: embedded_time::Clock<T = u64> {}
impl<C: embedded_time::Clock<T = u64>> Clock for C {}

/// Milliseconds elapsed between the clock's epoch and `now`
pub(crate) fn since_epoch<C: Clock>(now: Instant<C>) -> Result<Millis, embedded_time::clock::Error> {
  Millis::try_from(now.duration_since_epoch()).map_err(|_| embedded_time::clock::Error::Unspecified)
}

/// Read the clock, yielding milliseconds since its epoch
pub(crate) fn now<C: Clock>(clock: &C) -> Result<Millis, embedded_time::clock::Error> {
  clock.try_now().and_then(since_epoch)
}

/// Implement [`embedded_time::Clock`] using [`std::time`] primitives
#[derive(Debug, Clone, Copy)]
pub struct StdClock(std::time::Instant);

impl Default for StdClock {
  fn default() -> Self {
    Self::new()
  }
}

impl StdClock {
  /// Create a new clock, whose epoch is now
  pub fn new() -> Self {
    Self(std::time::Instant::now())
  }
}

impl embedded_time::Clock for StdClock {
  type T = u64;

  // microseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

  fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
    let elapsed = std::time::Instant::now().duration_since(self.0);
    Ok(Instant::new(elapsed.as_micros() as u64))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use embedded_time::duration::Milliseconds;

  use crate::test::ClockMock;

  #[test]
  fn mock_clock_reads_millis() {
    let clock = ClockMock::new();
    assert_eq!(now(&clock).unwrap(), Milliseconds(0u64));

    clock.advance(1_500);
    assert_eq!(now(&clock).unwrap(), Milliseconds(1_500u64));
  }

  #[test]
  fn std_clock_moves_forward() {
    let clock = StdClock::new();
    let a = now(&clock).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let b = now(&clock).unwrap();
    assert!(b.0 >= a.0 + 5);
  }
}
