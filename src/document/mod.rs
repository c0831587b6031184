//! The previewed Markdown document.
//!
//! ```text
//! file bytes ─► markdown::parse ─► ParsedDocument ─┬─► markdown::render ─► page shell
//!                                                  └─► resources::extract_local_resources
//! ```

mod finder;
pub mod markdown;
pub mod resources;

pub use finder::find_readme;
pub use markdown::ParsedDocument;
pub use resources::{AllowList, extract_local_resources, is_allowed};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::embed::serve::{PAGE_HTML, PageVars};
use crate::utils::html::escape;

/// Source file identity plus how its page is rendered.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path of the source file
    path: PathBuf,
    /// Directory resources are served from
    base_dir: PathBuf,
    /// Page title (file name)
    title: String,
    /// Embed the reload script in rendered pages
    live_reload: bool,
}

impl Document {
    /// Resolve the document to preview.
    ///
    /// Without an explicit file, looks for `readme.md` (any casing) in `cwd`.
    pub fn resolve(file: Option<&Path>, cwd: &Path, live_reload: bool) -> Result<Self> {
        let file = match file {
            Some(file) => file.to_path_buf(),
            None => find_readme(cwd).ok_or_else(|| anyhow!("No README.md file found"))?,
        };

        let path = if file.is_absolute() {
            file
        } else {
            std::path::absolute(cwd.join(&file))
                .with_context(|| format!("cannot resolve absolute path of {}", file.display()))?
        };

        Ok(Self::new(path, live_reload))
    }

    /// Document at an already-absolute path.
    pub fn new(path: PathBuf, live_reload: bool) -> Self {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Markdown".to_string());
        Self {
            path,
            base_dir,
            title,
            live_reload,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Read and parse the file.
    pub fn load(&self) -> Result<ParsedDocument> {
        let source =
            fs::read(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        Ok(markdown::parse(&source))
    }

    /// Full HTML page for a parsed document.
    pub fn render_page(&self, doc: &ParsedDocument) -> Vec<u8> {
        self.wrap(&markdown::render(doc))
    }

    /// Page shown when the file could not be read: empty document plus a notice.
    pub fn render_error_page(&self, error: &anyhow::Error) -> Vec<u8> {
        let notice = format!(
            "<p class=\"mdpeek-error\">{}</p>\n",
            escape(&format!("{error:#}"))
        );
        self.wrap(&notice)
    }

    fn wrap(&self, body: &str) -> Vec<u8> {
        PAGE_HTML
            .render(&PageVars {
                title: &self.title,
                body,
                live_reload: self.live_reload,
            })
            .into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_explicit_relative_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# n").unwrap();

        let doc = Document::resolve(Some(Path::new("notes.md")), dir.path(), false).unwrap();
        assert!(doc.path().is_absolute());
        assert_eq!(doc.path(), dir.path().join("notes.md"));
        assert_eq!(doc.base_dir(), dir.path());
        assert_eq!(doc.title(), "notes.md");
    }

    #[test]
    fn test_resolve_falls_back_to_readme() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# r").unwrap();

        let doc = Document::resolve(None, dir.path(), false).unwrap();
        assert_eq!(doc.path(), dir.path().join("README.md"));
    }

    #[test]
    fn test_resolve_without_readme_fails() {
        let dir = TempDir::new().unwrap();
        let err = Document::resolve(None, dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("No README.md"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let doc = Document::new(dir.path().join("gone.md"), false);
        assert!(doc.load().is_err());
    }

    #[test]
    fn test_render_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# Hi\n![local](img.png)\n![remote](https://x/y.png)").unwrap();

        let doc = Document::new(path, true);
        let parsed = doc.load().unwrap();
        let page = String::from_utf8(doc.render_page(&parsed)).unwrap();

        assert!(page.contains("<h1 id=\"hi\">Hi</h1>"));
        assert!(page.contains("<img src=\"img.png\""));
        assert!(page.contains("<title>README.md</title>"));
        assert!(page.contains("/__reload"));
    }

    #[test]
    fn test_render_error_page_escapes_message() {
        let doc = Document::new(PathBuf::from("/tmp/x.md"), false);
        let page = doc.render_error_page(&anyhow!("bad <thing>"));
        let page = String::from_utf8(page).unwrap();

        assert!(page.contains("<p class=\"mdpeek-error\">"));
        assert!(page.contains("bad &lt;thing&gt;"));
    }
}
