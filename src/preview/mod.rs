//! Shared preview state: the render cache, the allow-list, and the reload hub.
//!
//! ```text
//! watcher ──► Preview::refresh ──► RenderCache::set ──► BroadcastHub::broadcast
//!                                        ▲                       │
//! GET /  ──► Preview::snapshot ──────────┘        /__reload ◄────┘
//! ```

mod cache;
mod hub;

pub use cache::{RenderCache, Snapshot};
pub use hub::{BroadcastHub, Subscription};

use std::sync::Arc;

use anyhow::Result;

use crate::document::{AllowList, Document, extract_local_resources, is_allowed};
use crate::logger;

/// Everything request handlers and the watcher share.
#[derive(Debug)]
pub struct Preview {
    document: Document,
    cache: RenderCache,
    /// Fixed at startup from the first parse.
    allowed: AllowList,
    hub: Arc<BroadcastHub>,
}

impl Preview {
    /// Read, parse and render the document once. Failing to read it here is
    /// fatal; later failures only degrade the page.
    pub fn open(document: Document) -> Result<Self> {
        let parsed = document.load()?;
        let allowed = extract_local_resources(&parsed);
        let cache = RenderCache::new(document.render_page(&parsed));

        crate::debug!("serve"; "allowed resources: {:?}", allowed);

        Ok(Self {
            document,
            cache,
            allowed,
            hub: Arc::new(BroadcastHub::new()),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_watching(&self) -> bool {
        self.document.live_reload()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cache.get()
    }

    #[cfg(test)]
    pub fn allowed(&self) -> &AllowList {
        &self.allowed
    }

    /// Whether `path` (request path without the leading `/`) may be served.
    pub fn allows(&self, path: &str) -> bool {
        is_allowed(&self.allowed, path)
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Re-render the document into the cache, then notify every subscriber.
    ///
    /// A read failure replaces the page with an error page; it is never
    /// propagated. Returns whether the render succeeded.
    pub fn refresh(&self) -> bool {
        let title = self.document.title();
        let ok = match self.document.load() {
            Ok(parsed) => {
                self.cache.set(self.document.render_page(&parsed));
                logger::status_success(&format!("reloaded {title}"));
                true
            }
            Err(e) => {
                self.cache.set(self.document.render_error_page(&e));
                logger::status_error(&format!("failed to render {title}"), &format!("{e:#}"));
                false
            }
        };
        self.hub.broadcast();
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn preview(source: &str) -> (TempDir, Preview) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, source).unwrap();
        let preview = Preview::open(Document::new(path, true)).unwrap();
        (dir, preview)
    }

    fn page(preview: &Preview) -> String {
        String::from_utf8(preview.snapshot().to_vec()).unwrap()
    }

    #[test]
    fn test_open_renders_and_builds_allow_list() {
        let (_dir, preview) = preview("# Hi\n![local](img.png)\n![remote](https://x/y.png)");

        assert!(page(&preview).contains("<h1 id=\"hi\">Hi</h1>"));
        assert_eq!(preview.allowed().len(), 1);
        assert!(preview.allows("img.png"));
        assert!(preview.allows("./img.png"));
        assert!(!preview.allows("https://x/y.png"));
    }

    #[test]
    fn test_open_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let document = Document::new(dir.path().join("nope.md"), false);
        assert!(Preview::open(document).is_err());
    }

    #[test]
    fn test_refresh_replaces_page_and_notifies() {
        let (dir, preview) = preview("# One");
        let sub = preview.hub().subscribe();

        fs::write(dir.path().join("README.md"), "# Two").unwrap();
        assert!(preview.refresh());

        assert!(page(&preview).contains("Two"));
        assert!(!page(&preview).contains("One"));
        assert_eq!(sub.receiver().try_recv(), Ok(()));
    }

    #[test]
    fn test_refresh_failure_serves_error_page() {
        let (dir, preview) = preview("# One");
        fs::remove_file(dir.path().join("README.md")).unwrap();

        assert!(!preview.refresh());
        assert!(page(&preview).contains("<p class=\"mdpeek-error\">"));
    }

    #[test]
    fn test_allow_list_fixed_after_refresh() {
        let (dir, preview) = preview("![a](a.png)");
        fs::write(dir.path().join("README.md"), "![b](b.png)").unwrap();
        preview.refresh();

        assert!(preview.allows("a.png"));
        assert!(!preview.allows("b.png"));
    }
}
