/// Separator and comparison rules for one family of absolute paths.
///
/// Link scripts are plain text, so paths are handled as strings split on a
/// single separator rather than through `std::path`, which only knows the
/// host's conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStyle {
    /// The character separating path segments
    pub separator: char,
    /// Whether two segments must match byte for byte to be considered equal
    pub case_sensitive: bool,
}

impl PathStyle {
    /// Drive-rooted, backslash separated, case-insensitive paths.
    pub const WINDOWS: PathStyle = PathStyle {
        separator: '\\',
        case_sensitive: false,
    };

    /// Slash separated, case-sensitive paths.
    pub const UNIX: PathStyle = PathStyle {
        separator: '/',
        case_sensitive: true,
    };

    /// The style of the platform this binary was built for.
    pub fn native() -> PathStyle {
        if cfg!(windows) {
            Self::WINDOWS
        } else {
            Self::UNIX
        }
    }

    /// Splits a path into its segments.
    ///
    /// A single trailing separator does not produce an empty final segment,
    /// so `C:\Dest\` and `C:\Dest` decompose identically. A leading
    /// separator (Unix roots) yields an empty first segment, which every
    /// absolute Unix path shares.
    pub fn split<'a>(&self, path: &'a str) -> Vec<&'a str> {
        let mut segments: Vec<&str> = path.split(self.separator).collect();
        if segments.len() > 1 && segments.last() == Some(&"") {
            segments.pop();
        }
        segments
    }

    /// Joins segments back into a path string.
    pub fn join(&self, segments: &[&str]) -> String {
        let separator = self.separator.to_string();
        segments.join(separator.as_str())
    }

    /// Compares two segments with the platform's native semantics.
    pub fn segments_eq(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a == b || a.to_uppercase() == b.to_uppercase()
        }
    }

    /// Number of leading segments forming the path's root.
    ///
    /// A UNC path `\\server\share\...` splits into two empty segments
    /// followed by the server and share names, and all four name the root.
    /// Every other path is rooted in its first segment.
    pub fn root_len(&self, segments: &[&str]) -> usize {
        let unc = self.separator == '\\' && segments.len() >= 2 && segments[..2] == ["", ""];
        if unc { segments.len().min(4) } else { segments.len().min(1) }
    }

    /// Strips exactly one trailing separator.
    ///
    /// Roots such as `C:\` or `/` are returned untouched: `C:` names the
    /// current directory of drive C rather than its root.
    pub fn trim_trailing_separator<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_suffix(self.separator) {
            Some(trimmed) if trimmed.contains(self.separator) => trimmed,
            _ => path,
        }
    }
}
