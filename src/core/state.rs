//! Shutdown state for serve mode.
//!
//! Ctrl+C before a server is registered exits right away. Afterwards the
//! handler closes the reload hub, which ends every SSE stream, and unblocks
//! the listener so the request loop returns.

use std::sync::{Arc, OnceLock};

use tiny_http::Server;

use crate::preview::BroadcastHub;

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Reload hub whose streams must end on shutdown
static HUB: OnceLock<Arc<BroadcastHub>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if let Some(hub) = HUB.get() {
            hub.close();
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server and reload hub for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, hub: Arc<BroadcastHub>) {
    let _ = SERVER.set(server);
    let _ = HUB.set(hub);
}
