use std::fmt;
use std::net::SocketAddr;
use txload_config::DispatchConfig;

/// A server endpoint a dispatch connection dials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// One target per port of the configured range
    pub fn from_config(config: &DispatchConfig) -> Vec<Target> {
        config
            .ports
            .ports()
            .map(|port| Target::new(config.host.clone(), port))
            .collect()
    }
}

impl From<SocketAddr> for Target {
    fn from(addr: SocketAddr) -> Self {
        Target::new(addr.ip().to_string(), addr.port())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
