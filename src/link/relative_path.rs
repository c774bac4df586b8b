use crate::link::path_style::PathStyle;

const PARENT_DIR: &str = "..";

/// The path a generated link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A path relative to the destination directory
    Relative(String),
    /// The source path, verbatim
    Absolute(String),
}

impl LinkTarget {
    pub fn as_str(&self) -> &str {
        match self {
            LinkTarget::Relative(path) | LinkTarget::Absolute(path) => path,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, LinkTarget::Relative(_))
    }
}

/// Counts the leading segments two paths share.
pub fn common_prefix_len(a: &[&str], b: &[&str], style: PathStyle) -> usize {
    a.iter()
        .zip(b)
        .take_while(|(x, y)| style.segments_eq(x, y))
        .count()
}

/// Returns true when both paths start with the same drive, share or root.
pub fn shares_root(a: &[&str], b: &[&str], style: PathStyle) -> bool {
    let root = style.root_len(a);
    root > 0 && root == style.root_len(b) && common_prefix_len(a, b, style) >= root
}

/// Computes the path leading from a directory to a file.
///
/// # Arguments
///
/// * `from` - Segments of the directory the path is relative to
/// * `to` - Segments of the file, the last one being its name
/// * `style` - Separator and comparison rules for both paths
///
/// # Returns
///
/// * `String` - One `..` per `from` segment outside the common prefix,
///   followed by the rest of `to`
///
/// Only the directory part of `to` takes part in prefix matching, so the
/// file name always ends up in the result. Callers must check
/// [`shares_root`] first; paths on different drives have no relative form.
pub fn relative_path(from: &[&str], to: &[&str], style: PathStyle) -> String {
    let Some((file_name, to_dirs)) = to.split_last() else {
        return String::new();
    };

    let common = common_prefix_len(from, to_dirs, style);

    let mut parts: Vec<&str> = Vec::with_capacity(from.len() - common + to.len() - common);
    parts.extend(std::iter::repeat_n(PARENT_DIR, from.len() - common));
    parts.extend(&to_dirs[common..]);
    parts.push(file_name);

    style.join(&parts)
}

/// Picks the target for a link to `source` created inside `destination`.
///
/// Relative targets are only produced when requested and when both paths
/// share their root; otherwise the source path is used verbatim.
pub fn link_target(
    destination: &[&str],
    source: &str,
    use_relative_path: bool,
    style: PathStyle,
) -> LinkTarget {
    if use_relative_path {
        let source_segments = style.split(source);
        if shares_root(&source_segments, destination, style) {
            return LinkTarget::Relative(relative_path(destination, &source_segments, style));
        }
    }
    LinkTarget::Absolute(source.to_string())
}
