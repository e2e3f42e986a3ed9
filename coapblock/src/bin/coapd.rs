use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::Parser;
use coapblock::msg::Szx;
use coapblock::server::{Server, ServerConfig};

/// Serve a firmware image blockwise at /fw, and a small JSON document everywhere else
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opt {
  /// Address to listen on
  #[arg(long, default_value = "0.0.0.0:5683")]
  listen_addr: SocketAddr,

  /// Largest block size exponent to send (block size is 16 << szx)
  #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=6))]
  szx: u8,

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

  let config = ServerConfig { szx: Szx::new(opt.szx),
                              ..ServerConfig::default() };

  let mut server = Server::try_new(opt.listen_addr, config).with_context(|| {
                                                             format!("failed to listen on {}", opt.listen_addr)
                                                           })?;
  log::info!("server listening on {}", server.local_addr()?);

  server.run(&AtomicBool::new(false))?;
  Ok(())
}
