//! Turns paths typed or dropped by the user into a link request's inputs.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{self, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Collects the files to link from user supplied paths.
///
/// Paths are canonicalized, so `.`, `..` and symlinked directories never
/// reach the relative path computation. Files are kept in the order given,
/// each only once. Directories are expanded into the files below them when
/// `recursive` is set and skipped otherwise. Paths that do not exist are
/// skipped with a warning.
pub fn collect_sources<I, P>(inputs: I, recursive: bool) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sources = Vec::new();
    let mut seen = HashSet::new();

    for input in inputs {
        let input = input.as_ref();
        let path = match canonical(input) {
            Ok(path) => path,
            Err(err) => {
                warn!(path = %input.display(), error = %err, "skipping missing source");
                continue;
            }
        };

        if path.is_file() {
            if seen.insert(path.clone()) {
                sources.push(path);
            }
        } else if path.is_dir() {
            if !recursive {
                warn!(path = %path.display(), "skipping directory, use --recursive to link its files");
                continue;
            }
            for file in files_below(&path)? {
                if seen.insert(file.clone()) {
                    sources.push(file);
                }
            }
        } else {
            warn!(path = %path.display(), "skipping source that is neither file nor directory");
        }
    }

    debug!(count = sources.len(), "sources collected");
    Ok(sources)
}

/// Regular files below `dir`, sorted by path.
fn files_below(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Resolves the destination directory to its canonical path.
///
/// A destination that does not exist is only made absolute; creating the
/// links reports it as missing.
pub fn resolve_destination(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        canonical(path).with_context(|| format!("failed to resolve {}", path.display()))
    } else {
        path::absolute(path).with_context(|| format!("failed to resolve {}", path.display()))
    }
}

/// `fs::canonicalize` without the `\\?\` prefix Windows adds, which link
/// scripts cannot use.
fn canonical(path: &Path) -> std::io::Result<PathBuf> {
    let resolved = fs::canonicalize(path)?;
    Ok(strip_verbatim(resolved))
}

fn strip_verbatim(path: PathBuf) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path;
    };
    if let Some(unc) = text.strip_prefix(r"\\?\UNC\") {
        PathBuf::from(format!(r"\\{unc}"))
    } else if let Some(local) = text.strip_prefix(r"\\?\") {
        PathBuf::from(local)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    /// A temp dir and its canonical path, which is what sources resolve to.
    fn canonical_tempdir() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        (dir, root)
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"test content").unwrap();
    }

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let (_dir, root) = canonical_tempdir();
        let (a, b, c) = (root.join("a"), root.join("b"), root.join("c"));
        for file in [&a, &b, &c] {
            touch(file);
        }

        let sources = collect_sources([&c, &a, &c, &b, &a], false).unwrap();
        assert_eq!(sources, vec![c, a, b]);
    }

    #[test]
    fn skips_missing_paths() {
        let (_dir, root) = canonical_tempdir();
        let present = root.join("present.txt");
        touch(&present);

        let sources = collect_sources([root.join("gone.txt"), present.clone()], false).unwrap();
        assert_eq!(sources, vec![present]);
    }

    #[test]
    fn skips_directories_unless_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("folder/inner.txt"));

        let sources = collect_sources([dir.path().join("folder")], false).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn recursive_expands_directories_in_name_order() {
        let (_dir, base) = canonical_tempdir();
        let root = base.join("folder");
        touch(&root.join("b.txt"));
        touch(&root.join("a.txt"));
        touch(&root.join("sub/c.txt"));

        let sources = collect_sources([&root, &root.join("a.txt")], true).unwrap();
        assert_eq!(
            sources,
            vec![root.join("a.txt"), root.join("b.txt"), root.join("sub/c.txt")]
        );
    }

    #[test]
    fn relative_inputs_become_absolute() {
        let sources = collect_sources(["Cargo.toml"], false).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].is_absolute());
        assert!(sources[0].ends_with("Cargo.toml"));
    }

    #[test]
    fn parent_components_are_resolved_before_deduping() {
        let (_dir, root) = canonical_tempdir();
        let file = root.join("a.txt");
        touch(&file);
        fs::create_dir_all(root.join("x")).unwrap();

        let sources = collect_sources([root.join("x/../a.txt"), file.clone()], false).unwrap();
        assert_eq!(sources, vec![file]);
    }

    #[test]
    fn existing_destination_is_canonical() {
        let (_dir, root) = canonical_tempdir();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("links")).unwrap();

        let dest = resolve_destination(&root.join("src/../links")).unwrap();
        assert_eq!(dest, root.join("links"));
    }

    #[test]
    fn verbatim_prefix_is_stripped() {
        assert_eq!(
            strip_verbatim(PathBuf::from(r"\\?\C:\Users\A")),
            PathBuf::from(r"C:\Users\A")
        );
        assert_eq!(
            strip_verbatim(PathBuf::from(r"\\?\UNC\server\share\f")),
            PathBuf::from(r"\\server\share\f")
        );
        assert_eq!(strip_verbatim(PathBuf::from("/srv/a")), PathBuf::from("/srv/a"));
    }

    #[test]
    fn destination_is_absolute() {
        let dest = resolve_destination(Path::new("some/dir")).unwrap();
        assert!(dest.is_absolute());
        assert!(dest.ends_with("some/dir"));
    }
}
