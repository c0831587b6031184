//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - The preview page shell and its live-reload script
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{PAGE_HTML, PageVars};
//!
//! let html = PAGE_HTML.render(&PageVars { title: "README.md", body: &body, live_reload: true });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Script that reloads the page on every `reload` event from `/__reload`.
    pub const RELOAD_JS: &str = include_str!("serve/reload.js");

    /// Variables for page.html template.
    pub struct PageVars<'a> {
        pub title: &'a str,
        /// Rendered document fragment, inserted verbatim.
        pub body: &'a str,
        pub live_reload: bool,
    }

    impl TemplateVars for PageVars<'_> {
        fn apply(&self, content: &str) -> String {
            let reload = if self.live_reload {
                format!("<script>\n{RELOAD_JS}</script>")
            } else {
                String::new()
            };
            // Body goes in last so document text is never treated as a placeholder.
            content
                .replace("__TITLE__", &escape(self.title))
                .replace("__RELOAD__", &reload)
                .replace("__BODY__", self.body)
        }
    }

    /// HTML shell around the rendered document.
    pub const PAGE_HTML: Template<PageVars<'static>> =
        Template::new(include_str!("serve/page.html"));

}
