//! Display-name and relative-link helpers.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::Path;

/// Characters percent-encoded inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Compute a folder's display name.
///
/// The root folder maps to the configured homepage name; other folders use
/// their base name.
pub fn display_name(path: &Path, is_root: bool, homepage_name: &str) -> String {
    if is_root {
        homepage_name.to_owned()
    } else {
        path.file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

/// Percent-encode a single path segment or file name.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-encode a `/`-separated relative path, segment by segment.
pub fn encode_path(rel_path: &str) -> String {
    if rel_path.is_empty() {
        return String::new();
    }
    rel_path
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// `"../"` prefix climbing from a node at `depth` back to the tree root.
///
/// Depth is 1-based, so the root needs no prefix.
pub fn relative_prefix(depth: usize) -> String {
    "../".repeat(depth.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_uses_homepage_name() {
        assert_eq!(display_name(Path::new("/docs"), true, "Home"), "Home");
    }

    #[test]
    fn non_root_uses_base_name() {
        assert_eq!(
            display_name(Path::new("/docs/User Guide"), false, "Home"),
            "User Guide"
        );
    }

    #[test]
    fn encodes_spaces_and_reserved_chars() {
        assert_eq!(encode_segment("User Guide"), "User%20Guide");
        assert_eq!(encode_segment("a#b?c"), "a%23b%3Fc");
        assert_eq!(encode_segment("100%"), "100%25");
    }

    #[test]
    fn encodes_path_per_segment() {
        assert_eq!(encode_path("a b/c d"), "a%20b/c%20d");
        assert_eq!(encode_path(""), "");
        assert_eq!(encode_path("plain/path"), "plain/path");
    }

    #[test]
    fn relative_prefix_by_depth() {
        assert_eq!(relative_prefix(1), "");
        assert_eq!(relative_prefix(2), "../");
        assert_eq!(relative_prefix(4), "../../../");
        assert_eq!(relative_prefix(0), "");
    }
}
