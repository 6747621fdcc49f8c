//! Server configuration, built once by the entry point and passed down.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::cli::ServeArgs;

/// Upper bound on a request body (1 MiB). A full 1000-value batch is far smaller.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;

pub const DEFAULT_PORT: u16 = 3000;

/// Settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub addr: SocketAddr,
    /// Bodies larger than this get a 413 response.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::new(host, port),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT)
    }
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        Self::new(args.host, args.port)
    }
}
