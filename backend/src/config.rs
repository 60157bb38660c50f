use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid FAIR_SHARE_ADDR: {0}")]
    InvalidAddr(String),
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

impl Config {
    /// `FAIR_SHARE_ADDR` wins over `PORT`; blank values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = non_blank("FAIR_SHARE_ADDR") {
            let addr = raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidAddr(raw.clone()))?;
            return Ok(Self { addr });
        }

        let mut config = Self::default();
        if let Some(raw) = non_blank("PORT") {
            let port = raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
            config.addr.set_port(port);
        }
        Ok(config)
    }
}
