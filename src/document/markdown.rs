//! Markdown parsing and HTML rendering using pulldown-cmark.
//!
//! [`parse`] produces an owned event list that outlives the source text, so
//! one parse can feed both the resource scan and the renderer.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use rustc_hash::FxHashMap;

use super::resources::is_network_url;
use crate::utils::html::escape_attr;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// A parsed Markdown document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    events: Vec<Event<'static>>,
}

impl ParsedDocument {
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }
}

/// Parse raw document bytes with every extension enabled.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn parse(source: &[u8]) -> ParsedDocument {
    parse_with(&String::from_utf8_lossy(source), &MarkdownOptions::all())
}

pub fn parse_with(source: &str, options: &MarkdownOptions) -> ParsedDocument {
    let events = Parser::new_ext(source, options.to_pulldown_options())
        .map(Event::into_static)
        .collect();
    ParsedDocument { events }
}

/// Render a parsed document to an HTML fragment.
pub fn render(doc: &ParsedDocument) -> String {
    let events = assign_heading_ids(doc.events.clone());
    let events = open_external_links(events);

    let mut html = String::with_capacity(events.len() * 16);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

// =============================================================================
// Heading ids
// =============================================================================

fn assign_heading_ids(mut events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut slugs = SlugSet::default();

    for i in 0..events.len() {
        let explicit = match &events[i] {
            Event::Start(Tag::Heading { id, .. }) => id.clone(),
            _ => continue,
        };

        match explicit {
            Some(id) => slugs.reserve(&id),
            None => {
                let slug = slugs.claim(&slugify(&heading_text(&events[i + 1..])));
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(CowStr::from(slug));
                }
            }
        }
    }

    events
}

/// Plain text of a heading, from the events following its start tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Lower-case, alphanumerics kept, other runs collapsed to `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

#[derive(Default)]
struct SlugSet {
    seen: FxHashMap<String, usize>,
}

impl SlugSet {
    fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }

    /// First use keeps the slug, repeats get `-1`, `-2`, ...
    fn claim(&mut self, slug: &str) -> String {
        if !self.seen.contains_key(slug) {
            self.seen.insert(slug.to_string(), 0);
            return slug.to_string();
        }

        loop {
            let count = match self.seen.get_mut(slug) {
                Some(count) => {
                    *count += 1;
                    *count
                }
                None => 1,
            };
            let candidate = format!("{slug}-{count}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

// =============================================================================
// External links
// =============================================================================

/// Rewrite links to network URLs so they open in a new tab.
fn open_external_links(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut out = Vec::with_capacity(events.len());
    // One entry per open link: whether it was rewritten to raw HTML.
    let mut open = Vec::new();

    for event in events {
        match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if is_network_url(&dest_url) => {
                open.push(true);
                let title = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", escape_attr(&title))
                };
                out.push(Event::InlineHtml(CowStr::from(format!(
                    "<a href=\"{}\"{title} target=\"_blank\" rel=\"noopener noreferrer\">",
                    escape_attr(&dest_url)
                ))));
            }
            Event::Start(tag @ Tag::Link { .. }) => {
                open.push(false);
                out.push(Event::Start(tag));
            }
            Event::End(TagEnd::Link) => {
                if open.pop() == Some(true) {
                    out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                } else {
                    out.push(Event::End(TagEnd::Link));
                }
            }
            other => out.push(other),
        }
    }

    out
}
