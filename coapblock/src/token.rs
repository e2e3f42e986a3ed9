use coapblock_msg::Token;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Something that can hand out request tokens
pub trait TokenSource {
  /// Get the token to use for the next request
  fn next_token(&mut self) -> Token;
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
  fn next_token(&mut self) -> Token {
    S::next_token(self)
  }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
  fn next_token(&mut self) -> Token {
    S::next_token(self)
  }
}

/// Unpredictable 8-byte tokens drawn from a cryptographically secure RNG
///
/// ```
/// use coapblock::token::{Random, TokenSource};
///
/// let mut tokens = Random::from_entropy();
/// let (a, b) = (tokens.next_token(), tokens.next_token());
///
/// assert_eq!(a.as_bytes().len(), 8);
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct Random<R>(R);

impl Random<ChaCha20Rng> {
  /// Seed a ChaCha20 RNG from the operating system
  pub fn from_entropy() -> Self {
    Self(ChaCha20Rng::from_entropy())
  }
}

impl<R: RngCore + CryptoRng> Random<R> {
  /// Draw tokens from `rng`
  pub fn new(rng: R) -> Self {
    Self(rng)
  }
}

impl<R: RngCore + CryptoRng> TokenSource for Random<R> {
  fn next_token(&mut self) -> Token {
    let mut bytes = [0u8; 8];
    self.0.fill_bytes(&mut bytes);
    Token::from_bytes(bytes)
  }
}

/// Draws a single token from an inner source the first time it's
/// asked, then hands out that same token forever.
#[derive(Debug, Clone)]
pub struct Fixed<S> {
  inner: S,
  token: Option<Token>,
}

impl<S: TokenSource> Fixed<S> {
  #[allow(missing_docs)]
  pub fn new(inner: S) -> Self {
    Self { inner, token: None }
  }
}

impl<S: TokenSource> TokenSource for Fixed<S> {
  fn next_token(&mut self) -> Token {
    match self.token {
      | Some(t) => t,
      | None => {
        let t = self.inner.next_token();
        self.token = Some(t);
        t
      },
    }
  }
}
