//! Server configuration validated at startup.

use crate::error::ConfigError;
use log::warn;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// How long a new connection may take to send its request head
pub const DEFAULT_HEAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the listener binds to
    pub addr: SocketAddr,
    /// Number of videos in the catalog, ids run from 1 to this value
    pub catalog_size: u32,
    /// Directory holding `index.html` and `theinbetween.html`
    pub pages_dir: PathBuf,
    /// Idle connections that send no request head within this are closed
    pub head_timeout: Duration,
}

impl Config {
    /// Validates raw settings. A catalog smaller than one item is fatal.
    pub fn new(
        host: &str,
        port: u16,
        catalog_size: u32,
        pages_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if catalog_size < 1 {
            return Err(ConfigError::InvalidCatalogSize(catalog_size));
        }
        if catalog_size == 1 {
            warn!("Catalog size is 1, ignoreVideoId hints cannot be honored");
        }

        let address = format!("{}:{}", host, port);
        let addr = address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(address))?;

        Ok(Self {
            addr,
            catalog_size,
            pages_dir: pages_dir.into(),
            head_timeout: DEFAULT_HEAD_TIMEOUT,
        })
    }

    pub fn with_head_timeout(mut self, head_timeout: Duration) -> Self {
        self.head_timeout = head_timeout;
        self
    }
}
