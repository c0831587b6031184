//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "localhost"   # Host to bind
//! port = 3000               # HTTP port number
//! open = true               # Open the browser at startup
//! heartbeat_secs = 15       # Keep-alive interval of the reload stream
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Preview server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Host name or address to bind.
    pub interface: String,

    /// HTTP port number.
    pub port: u16,

    /// Open the default browser once the listener is up.
    pub open: bool,

    /// Seconds between heartbeat comments on `/__reload`.
    pub heartbeat_secs: u64,
}

impl ServeConfig {
    /// `host:port` string accepted by the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.interface, self.port)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "localhost".to_string(),
            port: 3000,
            open: true,
            heartbeat_secs: 15,
        }
    }
}
