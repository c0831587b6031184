//! `/__reload` server-sent event stream.
//!
//! tiny_http's own chunked encoder buffers output, so the stream takes over
//! the raw connection and frames every event as one flushed chunk.
//!
//! tiny_http keeps the read half of a plain `GET` connection to itself, so a
//! closed tab only shows up as a failed write. Between heartbeats the stream
//! writes an empty comment every [`LIVENESS_INTERVAL`]; the second write after
//! the peer is gone fails and the subscriber is dropped.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel;
use tiny_http::Request;

use crate::preview::{BroadcastHub, Subscription};
use crate::utils::mime::types::EVENT_STREAM;

/// Route of the reload stream.
pub const RELOAD_PATH: &str = "/__reload";

const RELOAD_EVENT: &str = "data: reload\n\n";
const HEARTBEAT: &str = ": heartbeat\n\n";
const CONNECTED: &str = ": connected\n\n";
const LIVENESS: &str = ":\n\n";

/// Interval of the empty comments that detect a closed client.
pub const LIVENESS_INTERVAL: Duration = Duration::from_millis(500);

/// Serve one reload stream until the client leaves or the hub closes.
/// Blocks the calling thread.
pub fn serve_stream(request: Request, hub: &Arc<BroadcastHub>, heartbeat: Duration) {
    let subscription = hub.subscribe();
    crate::debug!("reload"; "client {} connected ({} total)", subscription.id(), hub.len());

    let mut writer = request.into_writer();
    match write_stream(&mut *writer, &subscription, heartbeat) {
        Ok(()) => crate::debug!("reload"; "client {}: stream closed", subscription.id()),
        Err(e) => crate::debug!("reload"; "client {} disconnected: {}", subscription.id(), e),
    }
}

/// Write headers, then events until the subscription is disconnected.
pub fn write_stream(
    writer: &mut dyn Write,
    subscription: &Subscription,
    heartbeat: Duration,
) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: {EVENT_STREAM}\r\n\
         Cache-Control: no-cache\r\n\
         Connection: keep-alive\r\n\
         X-Accel-Buffering: no\r\n\
         Transfer-Encoding: chunked\r\n\r\n"
    )?;
    write_chunk(writer, CONNECTED)?;

    let ticker = channel::tick(heartbeat);
    let liveness = if heartbeat > LIVENESS_INTERVAL {
        channel::tick(LIVENESS_INTERVAL)
    } else {
        channel::never()
    };

    loop {
        crossbeam::select! {
            recv(subscription.receiver()) -> signal => match signal {
                Ok(()) => write_chunk(writer, RELOAD_EVENT)?,
                Err(_) => break,
            },
            recv(ticker) -> _ => write_chunk(writer, HEARTBEAT)?,
            recv(liveness) -> _ => write_chunk(writer, LIVENESS)?,
        }
    }

    // Terminating chunk.
    writer.write_all(b"0\r\n\r\n")?;
    writer.flush()
}

fn write_chunk(writer: &mut dyn Write, payload: &str) -> io::Result<()> {
    write!(writer, "{:X}\r\n{}\r\n", payload.len(), payload)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run(hub: &Arc<BroadcastHub>, heartbeat: Duration) -> thread::JoinHandle<String> {
        let subscription = hub.subscribe();
        thread::spawn(move || {
            let mut out = Vec::new();
            write_stream(&mut out, &subscription, heartbeat).unwrap();
            String::from_utf8(out).unwrap()
        })
    }

    fn wait_for_subscribers(hub: &BroadcastHub, n: usize) {
        while hub.len() < n {
            thread::yield_now();
        }
    }

    #[test]
    fn test_stream_headers_and_events() {
        let hub = Arc::new(BroadcastHub::new());
        let handle = run(&hub, Duration::from_secs(3600));
        wait_for_subscribers(&hub, 1);

        hub.broadcast();
        thread::sleep(Duration::from_millis(50));
        hub.close();

        let out = handle.join().unwrap();
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("Content-Type: text/event-stream\r\n"));
        assert!(out.contains("Cache-Control: no-cache\r\n"));
        assert!(out.contains("X-Accel-Buffering: no\r\n"));
        assert!(out.contains("Transfer-Encoding: chunked\r\n"));
        assert!(out.contains("E\r\ndata: reload\n\n\r\n"));
        assert!(out.ends_with("0\r\n\r\n"));
    }

    #[test]
    fn test_stream_heartbeat() {
        let hub = Arc::new(BroadcastHub::new());
        let handle = run(&hub, Duration::from_millis(10));
        wait_for_subscribers(&hub, 1);

        thread::sleep(Duration::from_millis(100));
        hub.close();

        let out = handle.join().unwrap();
        assert!(out.contains(": heartbeat\n\n"));
        assert!(!out.contains("data: reload"));
    }

    #[test]
    fn test_closed_client_detected_between_heartbeats() {
        use std::sync::atomic::{AtomicBool, Ordering};

        /// Accepts writes until `closed` is set.
        struct Peer(Arc<AtomicBool>);
        impl Write for Peer {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.0.load(Ordering::SeqCst) {
                    return Err(io::ErrorKind::ConnectionReset.into());
                }
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let hub = Arc::new(BroadcastHub::new());
        let closed = Arc::new(AtomicBool::new(false));
        let subscription = hub.subscribe();
        let mut peer = Peer(Arc::clone(&closed));

        let handle = thread::spawn(move || {
            let result = write_stream(&mut peer, &subscription, Duration::from_secs(3600));
            drop(subscription);
            result
        });
        thread::sleep(Duration::from_millis(100));
        closed.store(true, Ordering::SeqCst);

        let started = std::time::Instant::now();
        let err = handle.join().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(hub.is_empty());
    }

    #[test]
    fn test_write_error_ends_stream() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let hub = Arc::new(BroadcastHub::new());
        let subscription = hub.subscribe();
        let err = write_stream(&mut Broken, &subscription, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        drop(subscription);
        assert!(hub.is_empty());
    }
}
