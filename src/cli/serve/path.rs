//! Request path normalization and resource resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Decode, strip the query string, drop the leading `/`.
///
/// `None` when the decoded bytes are not UTF-8.
pub fn normalize_url(url: &str) -> Option<String> {
    let decoded = percent_decode_str(strip_query(url)).decode_utf8().ok()?;
    Some(decoded.trim_start_matches('/').to_string())
}

/// Undecoded request path without query string or leading `/`.
pub fn raw_path(url: &str) -> &str {
    strip_query(url).trim_start_matches('/')
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Map an allow-listed relative path to a file under `base_dir`.
///
/// Returns `None` when the target is missing, not a regular file, or escapes
/// `base_dir` once `..` and symlinks are resolved.
pub fn resolve_resource(base_dir: &Path, relative: &str) -> Option<PathBuf> {
    let canonical = base_dir.join(relative).canonicalize().ok()?;
    let root = base_dir.canonicalize().ok()?;

    if !canonical.starts_with(&root) {
        crate::debug!("serve"; "rejected path outside document dir: {}", relative);
        return None;
    }

    canonical.is_file().then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_url() {
        let normalize = |url| normalize_url(url).unwrap();
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize("/img.png"), "img.png");
        assert_eq!(normalize("/./img.png"), "./img.png");
        assert_eq!(normalize("/img.png?v=2"), "img.png");
        assert_eq!(normalize("/my%20pic.png"), "my pic.png");
        assert_eq!(normalize("/dir/a.png"), "dir/a.png");
    }

    #[test]
    fn test_normalize_url_rejects_invalid_utf8() {
        assert_eq!(normalize_url("/%FF"), None);
        assert_eq!(normalize_url("/%FFimg.png"), None);
        assert_eq!(normalize_url("/%C3%A9.png").as_deref(), Some("\u{e9}.png"));
    }

    #[test]
    fn test_raw_path_keeps_encoding() {
        assert_eq!(raw_path("/my%20pic.png?x"), "my%20pic.png");
        assert_eq!(raw_path("/"), "");
    }

    #[test]
    fn test_resolve_resource() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/a.png"), b"png").unwrap();

        let resolved = resolve_resource(dir.path(), "img/a.png").unwrap();
        assert!(resolved.ends_with("img/a.png"));
        assert!(resolve_resource(dir.path(), "./img/a.png").is_some());
        assert!(resolve_resource(dir.path(), "img/missing.png").is_none());
        // Directories are not served.
        assert!(resolve_resource(dir.path(), "img").is_none());
    }

    #[test]
    fn test_resolve_resource_rejects_escape() {
        let root = TempDir::new().unwrap();
        let docs = root.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(root.path().join("secret.txt"), b"secret").unwrap();

        assert!(resolve_resource(&docs, "../secret.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_resource_rejects_symlink_escape() {
        let root = TempDir::new().unwrap();
        let docs = root.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(root.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(root.path().join("secret.txt"), docs.join("link.txt")).unwrap();

        assert!(resolve_resource(&docs, "link.txt").is_none());
    }
}
