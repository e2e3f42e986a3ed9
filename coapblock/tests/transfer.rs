use std::net::UdpSocket;
use std::time::Duration;

use coapblock::config::{Config, Rotation};
use coapblock::error::{What, When};
use coapblock::msg::Szx;
use coapblock::server::{Server, ServerConfig};
use embedded_time::duration::Milliseconds;
use sha2::{Digest, Sha256};

fn serve(szx: Szx) -> coapblock::server::Handle {
  let config = ServerConfig { szx,
                              ..ServerConfig::default() };
  Server::try_new("127.0.0.1:0", config).unwrap()
                                        .spawn()
                                        .unwrap()
}

#[test]
fn fetches_firmware_with_rotating_tokens() {
  let server = serve(Szx::S128);
  let url = format!("coap://{}/fw", server.addr());

  let body = coapblock::get(&url, Duration::from_secs(30), Config::default()).unwrap();
  assert_eq!(body.len(), coapblock::data::FIRMWARE_LEN);
  assert_eq!(Sha256::digest(&body), Sha256::digest(coapblock::data::firmware()));

  server.shutdown().unwrap();
}

#[test]
fn fetches_firmware_with_one_token() {
  let server = serve(Szx::S1024);
  let url = format!("coap://{}/fw", server.addr());
  let config = Config { rotation: Rotation::PerTransfer,
                        ..Config::default() };

  let body = coapblock::get(&url, Duration::ZERO, config).unwrap();
  assert_eq!(body, coapblock::data::firmware());

  server.shutdown().unwrap();
}

#[test]
fn small_resource_in_one_exchange() {
  let server = serve(Szx::S128);
  let url = format!("coap://{}/anything", server.addr());

  let body = coapblock::get(&url, Duration::from_secs(30), Config::default()).unwrap();
  assert_eq!(body, b"{'value':'foo'}".to_vec());

  server.shutdown().unwrap();
}

#[test]
fn short_deadline_cancels() {
  let server = serve(Szx::S16);
  let url = format!("coap://{}/fw", server.addr());

  let err = coapblock::get(&url, Duration::from_millis(1), Config::default()).unwrap_err();
  assert!(err.is_cancelled(), "{}", err);

  server.shutdown().unwrap();
}

#[test]
fn silent_peer_times_out() {
  let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
  let url = format!("coap://{}/fw", peer.local_addr().unwrap());
  let config = Config { exchange_timeout: Milliseconds(200),
                        ..Config::default() };

  let err = coapblock::get(&url, Duration::from_secs(30), config).unwrap_err();
  assert!(matches!(err.what, What::Timeout), "{}", err);
  assert!(matches!(err.when, When::Exchange { num: 0, .. }));
}

#[test]
fn bad_urls_fail_before_dialing() {
  for url in ["http://127.0.0.1/fw", "coap:/fw", "::"] {
    let err = coapblock::get(url, Duration::from_secs(1), Config::default()).unwrap_err();
    assert_eq!(err.when, When::Parsing);
    assert!(matches!(err.what, What::Target(_)));
  }
}
