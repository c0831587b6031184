//! Local resource references of a document.
//!
//! The image destinations found here form the allow-list of files the
//! server may hand out from the document's directory.

use pulldown_cmark::{Event, Tag};
use rustc_hash::FxHashSet;

use super::markdown::ParsedDocument;

/// Set of relative resource paths, as written in the document.
pub type AllowList = FxHashSet<String>;

/// URLs the browser fetches on its own: `http://`, `https://`, or
/// protocol-relative `//`.
pub fn is_network_url(dest: &str) -> bool {
    dest.starts_with("http://") || dest.starts_with("https://") || dest.starts_with("//")
}

/// Collect every non-network image destination, verbatim.
pub fn extract_local_resources(doc: &ParsedDocument) -> AllowList {
    doc.events()
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Image { dest_url, .. }) => Some(&**dest_url),
            _ => None,
        })
        .filter(|dest| !is_network_url(dest))
        .map(str::to_string)
        .collect()
}

/// Whether a request path (no leading `/`) names an allow-listed resource,
/// written with or without a `./` prefix.
pub fn is_allowed(allowed: &AllowList, path: &str) -> bool {
    if allowed.contains(path) {
        return true;
    }
    match path.strip_prefix("./") {
        Some(bare) => allowed.contains(bare),
        None => allowed.contains(&format!("./{path}")),
    }
}
