//! Default document lookup.

use std::fs;
use std::path::{Path, PathBuf};

/// Find a file named `readme.md` (any casing) directly inside `dir`.
///
/// When several casings exist, the first in byte order wins.
pub fn find_readme(dir: &Path) -> Option<PathBuf> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.eq_ignore_ascii_case("readme.md"))
        .collect();

    names.sort();
    names.into_iter().next().map(|name| dir.join(name))
}
