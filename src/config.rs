//! Resolved server settings.
//!
//! Command-line flags and their `DW_*` environment fallbacks are parsed by
//! clap; this is the plain value the server is started with.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use crate::db::Workspace;
use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workspace: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.workspace)
    }

    /// First address the host name resolves to.
    pub fn addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::validation(format!("Cannot resolve host: {}", self.host)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workspace: PathBuf::from("./workspace"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback_3001() {
        let addr = Config::default().addr().unwrap();
        assert_eq!(addr, "127.0.0.1:3001".parse().unwrap());
    }

    #[test]
    fn custom_port() {
        let config = Config { host: "0.0.0.0".into(), port: 8080, ..Config::default() };
        assert_eq!(config.addr().unwrap().port(), 8080);
    }
}
