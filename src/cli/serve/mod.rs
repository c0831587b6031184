//! Preview server with live reload support.
//!
//! ```text
//! incoming_requests ─┬─► GET /__reload ──► own thread (SSE stream)
//!                    └─► everything else ─► rayon pool ─► handle_request
//! ```

mod lifecycle;
mod path;
mod response;
mod sse;


pub use lifecycle::{open_browser, spawn_watcher};

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tiny_http::{Method, Request, Server};

use crate::config::ServeConfig;
use crate::preview::Preview;
use crate::{debug, log};

/// Worker threads for ordinary requests.
const POOL_THREADS: usize = 4;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    /// Host part of the URL shown to the user and opened in the browser
    host: String,
}

/// Bind the HTTP listener without starting the request loop.
pub fn bind_server(config: &ServeConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind(&config.addr())?;

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
        host: display_host(&config.interface, addr),
    })
}

/// A wildcard bind (`0.0.0.0`, `::`) is not a browsable address.
fn display_host(interface: &str, addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        interface.to_string()
    }
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root URL as shown to the user.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.addr.port())
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Serve until the listener is unblocked.
    pub fn run(self, preview: Arc<Preview>, heartbeat: Duration) -> Result<()> {
        run_request_loop(&self.server, &preview, heartbeat)
    }
}

fn run_request_loop(server: &Server, preview: &Arc<Preview>, heartbeat: Duration) -> Result<()> {
    // Streams never enter the pool, so they cannot starve page requests.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .thread_name(|i| format!("mdpeek-http-{i}"))
        .build()?;

    for request in server.incoming_requests() {
        let preview = Arc::clone(preview);

        if is_reload_stream(&request, &preview) {
            thread::spawn(move || sse::serve_stream(request, preview.hub(), heartbeat));
            continue;
        }

        pool.spawn(move || {
            if let Err(e) = handle_request(request, &preview) {
                log!("serve"; "request error: {:#}", e);
            }
        });
    }

    debug!("serve"; "request loop stopped");
    Ok(())
}

fn is_reload_stream(request: &Request, preview: &Preview) -> bool {
    preview.is_watching()
        && request.method() == &Method::Get
        && path::raw_path(request.url()) == &sse::RELOAD_PATH[1..]
}

/// Handle a single HTTP request
fn handle_request(request: Request, preview: &Preview) -> Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    let raw = path::raw_path(request.url());
    if raw.is_empty() {
        return response::respond_page(request, preview.snapshot());
    }

    let decoded = path::normalize_url(request.url());
    let matched = match decoded.as_deref() {
        Some(url) if preview.allows(url) => Some(url),
        _ if preview.allows(raw) => Some(raw),
        _ => None,
    };

    let resolved = matched.and_then(|rel| path::resolve_resource(preview.document().base_dir(), rel));
    match resolved {
        Some(file) => response::respond_file(request, &file),
        None => {
            debug!("serve"; "404 {}", request.url());
            response::respond_not_found(request)
        }
    }
}
