//! Server lifecycle: binding, the watcher thread, and the browser launch.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tiny_http::Server;

use crate::preview::Preview;
use crate::watch::{DocumentWatcher, WatchTiming};
use crate::log;

/// Delay before the browser is pointed at the server.
const BROWSER_DELAY: Duration = Duration::from_millis(500);

/// Bind the listener. Failure is fatal; there is no port retry because the
/// printed URL must match what was asked for.
pub fn bind(addr: &str) -> Result<(Server, SocketAddr)> {
    let server = Server::http(addr).map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
    let local = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow!("Listener on {} has no IP address", addr))?;
    Ok((server, local))
}

/// Start watching the document on its own runtime thread.
///
/// The runtime and OS watch are created before the thread so that either
/// failing aborts startup.
pub fn spawn_watcher(preview: Arc<Preview>, timing: WatchTiming) -> Result<JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to create watcher runtime")?;

    let path = preview.document().path().to_path_buf();
    let watcher = DocumentWatcher::new(&path)
        .with_context(|| format!("Failed to watch {}", path.display()))?;

    Ok(thread::spawn(move || {
        rt.block_on(watcher.run(timing, || {
            preview.refresh();
        }));
    }))
}

/// Open the default browser at `url` after a short delay. Fire and forget.
pub fn open_browser(url: String) {
    thread::spawn(move || {
        thread::sleep(BROWSER_DELAY);
        crate::debug!("open"; "{}", url);
        if let Err(e) = open::that(&url) {
            log!("open"; "failed to open browser: {}", e);
        }
    });
}
