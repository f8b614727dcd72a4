//! Source file discovery.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "py";

/// Directory names never descended into: VCS metadata, caches, virtualenvs.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "__pycache__", "venv", ".venv", ".mypy_cache"];

fn is_excluded_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_DIRS.contains(&n))
}

/// True if any segment of `path` is an excluded directory name.
pub fn has_excluded_segment(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(segment) => is_excluded_name(segment),
        _ => false,
    })
}

/// Lazily yield `.py` files under `root`, in file-name order per directory.
///
/// Excluded directories are pruned while walking, and any path that still
/// carries an excluded segment (e.g. from the root itself) is dropped. A
/// `root` that is a single `.py` file yields just that file.
pub fn source_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_excluded_name(e.file_name())))
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let path = entry.into_path();
                let wanted = path.extension() == Some(OsStr::new(SOURCE_EXTENSION))
                    && path.is_file()
                    && !has_excluded_segment(&path);
                wanted.then_some(Ok(path))
            }
            Err(err) => Some(Err(err)),
        })
}
