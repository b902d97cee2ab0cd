use std::path::{Component, Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a decoded path is put back into a `Location` header.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
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

#[inline]
pub(crate) fn decode_percents(string: &str) -> String {
    percent_encoding::percent_decode_str(string)
        .decode_utf8_lossy()
        .into_owned()
}

#[inline]
pub(crate) fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Normalize an absolute URL path using POSIX rules.
///
/// Repeated slashes collapse, `.` segments vanish and `..` segments remove their parent. A `..`
/// at the root stays at the root. A trailing slash is kept. Applying this twice gives the same
/// result as applying it once.
pub fn normalize_url_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if segments.is_empty() || path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn sanitize_path(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut result, p| match p {
            Component::Normal(x) => {
                // Parse again to prevent a malicious component containing
                // a Windows drive letter, e.g.: `/anypath/c:/windows/win.ini`
                if Path::new(&x)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)))
                {
                    result.push(x);
                }
                result
            }
            Component::ParentDir => {
                result.pop();
                result
            }
            _ => result,
        })
}

/// Decoded request path, split into its canonical URL form and its filesystem lookup key.
pub struct RequestedPath {
    /// Canonical form of the decoded request path.
    pub normalized: String,
    /// Root-relative filesystem path, without the trailing slash.
    pub sanitized: PathBuf,
    /// Whether a directory was requested. (`normalized` ends with a slash.)
    pub is_dir_request: bool,
}

impl RequestedPath {
    /// Split a percent-decoded request path.
    pub fn resolve(decoded_path: &str) -> Self {
        let normalized = normalize_url_path(decoded_path);
        let is_dir_request = normalized.ends_with('/');
        let lookup = normalized.strip_suffix('/').unwrap_or(&normalized);
        RequestedPath {
            sanitized: sanitize_path(Path::new(lookup)),
            normalized,
            is_dir_request,
        }
    }

    /// Whether the request used a non-canonical form of its path.
    pub fn needs_redirect(&self, decoded_path: &str) -> bool {
        self.normalized != decoded_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_posix_paths() {
        assert_eq!(normalize_url_path("/"), "/");
        assert_eq!(normalize_url_path("/a//b"), "/a/b");
        assert_eq!(normalize_url_path("/a/./b/"), "/a/b/");
        assert_eq!(normalize_url_path("/a/b/.."), "/a");
        assert_eq!(normalize_url_path("/a/b/../"), "/a/");
        assert_eq!(normalize_url_path("/a/."), "/a");
        assert_eq!(normalize_url_path("//"), "/");
    }

    #[test]
    fn clamps_parent_segments_at_root() {
        assert_eq!(normalize_url_path("/.."), "/");
        assert_eq!(normalize_url_path("/../../etc/passwd"), "/etc/passwd");
        assert_eq!(normalize_url_path("/xxx/../../file1.html"), "/file1.html");
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        for path in ["/", "/a//b/", "/a/../..//c/./d", "/x/y/..", "/has space/", "/.a/..b/"] {
            let once = normalize_url_path(path);
            assert_eq!(normalize_url_path(&once), once, "{path}");
        }
    }

    #[test]
    fn strips_trailing_slash_for_lookup() {
        let requested = RequestedPath::resolve("/foo/");
        assert!(requested.is_dir_request);
        assert_eq!(requested.sanitized, PathBuf::from("foo"));

        let requested = RequestedPath::resolve("/foo");
        assert!(!requested.is_dir_request);
        assert_eq!(requested.sanitized, PathBuf::from("foo"));
    }

    #[test]
    fn detects_non_canonical_requests() {
        let requested = RequestedPath::resolve("/a//b");
        assert!(requested.needs_redirect("/a//b"));
        let requested = RequestedPath::resolve("/a/b/");
        assert!(!requested.needs_redirect("/a/b/"));
    }

    #[test]
    fn never_leaves_the_root() {
        let requested = RequestedPath::resolve("/../../secret");
        assert_eq!(requested.sanitized, PathBuf::from("secret"));
        let requested = RequestedPath::resolve("/");
        assert_eq!(requested.sanitized, PathBuf::new());
    }

    #[test]
    fn encodes_location_paths() {
        assert_eq!(encode_path("/has space.html"), "/has%20space.html");
        assert_eq!(encode_path("/a/b/"), "/a/b/");
        assert_eq!(encode_path("/100%?"), "/100%25%3F");
    }
}
