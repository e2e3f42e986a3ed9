use std::net::{SocketAddr, ToSocketAddrs};

use percent_encoding::percent_decode_str;
use url::{Host, Url};

/// Default CoAP port, used when a URL doesn't name one
pub const DEFAULT_PORT: u16 = 5683;

/// Why a URL could not be turned into a [`Target`]
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
  /// The string wasn't a URL at all
  #[error("invalid url: {0}")]
  InvalidUrl(#[from] url::ParseError),
  /// Only `coap://` is supported
  #[error("unsupported scheme {0:?}, expected \"coap\"")]
  UnsupportedScheme(String),
  /// The URL had no host
  #[error("url has no host")]
  MissingHost,
  /// A path segment percent-decoded to something other than UTF-8
  #[error("url path is not utf-8 once decoded: {0}")]
  InvalidPath(#[source] core::str::Utf8Error),
  /// The host didn't resolve to any address
  #[error("failed to resolve {host}: {source}")]
  Resolve {
    /// `host:port` that was looked up
    host: String,
    /// What went wrong
    source: std::io::Error,
  },
}

/// A `coap://host[:port]/path` URL, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  /// Hostname or IP literal (IPv6 without brackets)
  pub host: String,
  #[allow(missing_docs)]
  pub port: u16,
  /// Resource path, percent-decoded; always starts with `/`
  pub path: String,
}

impl Target {
  /// Parse and validate a URL.
  ///
  /// ```
  /// use coapblock::target::Target;
  ///
  /// let t = Target::parse("coap://device.local/fw").unwrap();
  /// assert_eq!((t.host.as_str(), t.port, t.path.as_str()), ("device.local", 5683, "/fw"));
  ///
  /// assert!(Target::parse("http://device.local/fw").is_err());
  /// ```
  pub fn parse(url: &str) -> Result<Self, TargetError> {
    let url = Url::parse(url)?;

    if url.scheme() != "coap" {
      return Err(TargetError::UnsupportedScheme(url.scheme().to_string()));
    }

    let host = match url.host() {
      | Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
      | Some(Host::Ipv4(ip)) => ip.to_string(),
      | Some(Host::Ipv6(ip)) => ip.to_string(),
      | _ => return Err(TargetError::MissingHost),
    };

    let path = url.path()
                  .split('/')
                  .filter(|seg| !seg.is_empty())
                  .map(|seg| percent_decode_str(seg).decode_utf8())
                  .try_fold(String::new(), |mut path, seg| {
                    path.push('/');
                    path.push_str(&seg?);
                    Ok::<_, core::str::Utf8Error>(path)
                  })
                  .map_err(TargetError::InvalidPath)?;
    let path = match path.as_str() {
      | "" => "/".to_string(),
      | _ => path,
    };

    Ok(Target { host,
                port: url.port().unwrap_or(DEFAULT_PORT),
                path })
  }

  /// Resolve the host to the first socket address it names
  pub fn resolve(&self) -> Result<SocketAddr, TargetError> {
    let resolve_err = |source| TargetError::Resolve { host: self.to_string(),
                                                      source };

    (self.host.as_str(), self.port).to_socket_addrs()
                                   .map_err(resolve_err)?
                                   .next()
                                   .ok_or_else(|| {
                                     resolve_err(std::io::Error::from(std::io::ErrorKind::NotFound))
                                   })
  }
}

impl core::fmt::Display for Target {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    if self.host.contains(':') {
      write!(f, "[{}]:{}", self.host, self.port)
    } else {
      write!(f, "{}:{}", self.host, self.port)
    }
  }
}
