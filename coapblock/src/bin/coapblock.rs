use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use coapblock::config::{Config, Rotation};
use coapblock::msg::ContentFormat;
use sha2::{Digest, Sha256};

/// Fetch a CoAP resource with a blockwise GET and print its size and SHA-256
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opt {
  /// coap://host[:port]/path
  url: String,

  /// Timeout for the whole transfer
  #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
  timeout: Duration,

  /// Use a new random token for every exchange
  #[arg(long)]
  rotate: bool,

  /// Log level (error, warn, info, debug, trace)
  #[arg(long, default_value = "info", value_parser = parse_level)]
  log_level: log::Level,
}

fn parse_level(s: &str) -> Result<log::Level, String> {
  s.parse().map_err(|_| format!("unknown log level {:?}", s))
}

fn main() -> anyhow::Result<()> {
  let opt = Opt::parse();
  simple_logger::init_with_level(opt.log_level).context("failed to initialize logging")?;

  let config = if opt.rotate {
    log::info!("rotating tokens for every exchange");
    Config { rotation: Rotation::PerExchange,
             ..Config::default() }
  } else {
    log::info!("using one token for the whole transfer");
    Config { rotation: Rotation::PerTransfer,
             accept: Some(ContentFormat::OctetStream),
             ..Config::default() }
  };

  let data = coapblock::get(&opt.url, opt.timeout, config).with_context(|| format!("GET {}", opt.url))?;

  println!("size={} checksum={}", data.len(), hex::encode(Sha256::digest(&data)));
  Ok(())
}
