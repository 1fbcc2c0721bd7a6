//! Path and URL algebra for asset identifiers.
//!
//! Pure functions over strings. No side effects.
//!
//! Identifiers are not always valid URLs (search paths like `Foo.mdl` or
//! file-relative paths like `../tex/wood.png` appear verbatim inside scene
//! documents), so classification and normalization are done lexically and the
//! `url` crate is only consulted for well-formed scheme URLs.

/// Delimiter separating an identifier from its format-argument suffix.
///
/// Everything after this token configures the document format, not the asset
/// location, so cache keys and classification always strip it first.
pub const FORMAT_ARGS_DELIMITER: &str = ":SDF_FORMAT_ARGS:";

/// Extension associated with the wrapper document format.
///
/// Foreign 3D formats hosted on a remote service must be fetched to local
/// storage before their native reader can touch them; rewriting the extension
/// routes them through the wrapper format that does exactly that.
pub const WRAPPER_FORMAT_EXTENSION: &str = "wrap";

/// Foreign 3D formats that get the wrapper treatment when non-local.
const FOREIGN_FORMAT_EXTENSIONS: &[&str] = &[
    "abc", "fbx", "glb", "gltf", "obj", "ply", "sbsar", "spz", "stl",
];

// ============================================================================
// Classification
// ============================================================================

/// Check if a path is relative.
///
/// Absolute paths either start with `/` or have a colon before the first
/// slash (scheme URLs, or drive letters on Windows). Everything else is
/// relative. Empty paths are not relative.
pub fn is_relative(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') {
        return false;
    }
    match (path.find(':'), path.find('/')) {
        (Some(colon), Some(slash)) => colon > slash,
        (Some(_), None) => false,
        _ => true,
    }
}

/// Check if a path is explicitly anchored to "here" (`./` or `../`).
pub fn is_file_relative(path: &str) -> bool {
    path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with(".\\")
        || path.starts_with("..\\")
}

/// Check if a path is search-path-like: relative, but not explicitly
/// anchored. Such paths are ambiguous between "relative to the anchor" and
/// "resolved via configured search paths".
pub fn is_search_path(path: &str) -> bool {
    is_relative(path) && !is_file_relative(path)
}

/// Extract the scheme of a path, if it has one.
///
/// Single-character prefixes are treated as Windows drive letters, not
/// schemes, so `C:/work` has no scheme while `omniverse://host` does.
pub fn scheme_of(path: &str) -> Option<&str> {
    let colon = path.find(':')?;
    if colon < 2 {
        return None;
    }
    if let Some(slash) = path.find('/') {
        if slash < colon {
            return None;
        }
    }
    let candidate = &path[..colon];
    let mut chars = candidate.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(candidate)
}

/// Check if a path denotes a local file: relative, scheme-less, or `file:`.
pub fn is_local(path: &str) -> bool {
    match scheme_of(path) {
        None => true,
        Some(scheme) => scheme.eq_ignore_ascii_case("file"),
    }
}

/// Convert a local location to a plain filesystem path.
pub fn local_path(url: &str) -> String {
    url.strip_prefix("file://").unwrap_or(url).to_string()
}

// ============================================================================
// Format-argument suffix
// ============================================================================

/// Split a path into (location, format-argument suffix). The suffix keeps its
/// leading delimiter and is empty when absent.
pub fn split_format_args(path: &str) -> (&str, &str) {
    match path.find(FORMAT_ARGS_DELIMITER) {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    }
}

/// The cache key for an identifier: the identifier with any format-argument
/// suffix stripped. Identifiers differing only in that suffix share one
/// resolution.
pub fn strip_format_args(path: &str) -> &str {
    split_format_args(path).0
}

// ============================================================================
// Normalization & combination
// ============================================================================

/// Normalize a path or URL.
///
/// Removes `.` segments, folds `..` into the preceding segment, collapses
/// duplicate separators and converts backslashes. The scheme and authority of
/// a URL are preserved untouched, as is any format-argument suffix.
/// Idempotent: `normalize(normalize(p)) == normalize(p)`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let (body, args) = split_format_args(path);
    let body = body.replace('\\', "/");

    let (prefix, rest) = split_authority(&body);

    let absolute = rest.starts_with('/');
    // `a/.` and `a/..` name directories, so they keep a trailing slash just
    // like `a/` does
    let trailing = (rest.len() > 1 && rest.ends_with('/'))
        || rest.ends_with("/.")
        || rest.ends_with("/..");

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute && prefix.is_empty() {
                    segments.push("..");
                }
                // above the root: clamp
            }
            other => segments.push(other),
        }
    }

    let mut out = prefix.to_string();
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if trailing && !segments.is_empty() {
        out.push('/');
    }
    if out.is_empty() {
        // a relative path that reduced to nothing still names "here"
        out.push('.');
    }

    out.push_str(args);
    out
}

/// Combine an anchor location with a path.
///
/// An absolute path ignores the anchor entirely. Otherwise the path is
/// appended to the anchor's directory: an anchor with a trailing slash is
/// itself the directory, an anchor without one contributes everything up to
/// its last separator.
pub fn combine(anchor: &str, path: &str) -> String {
    if anchor.is_empty() || !is_relative(path) {
        return normalize(path);
    }
    let anchor = anchor.replace('\\', "/");
    let dir = match anchor.rfind('/') {
        Some(idx) => &anchor[..=idx],
        None => "",
    };
    normalize(&format!("{dir}{path}"))
}

/// Split a URL into its `scheme://authority` prefix and the path remainder.
/// Paths without a scheme split into `("", path)`.
fn split_authority(url: &str) -> (&str, &str) {
    if scheme_of(url).is_none() {
        return ("", url);
    }
    match url.find("://") {
        Some(idx) => {
            let after = idx + 3;
            let path_start = url[after..]
                .find('/')
                .map_or(url.len(), |slash| after + slash);
            url.split_at(path_start)
        }
        None => ("", url),
    }
}

/// Enumerate the parent-folder locations of a path, nearest first, excluding
/// the root itself. Each entry keeps its trailing slash.
pub fn parent_locations(url: &str) -> Vec<String> {
    let (prefix, path) = split_authority(url);
    let mut parents = Vec::new();
    let Some(mut end) = path.rfind('/') else {
        return parents;
    };
    while end > 0 {
        parents.push(format!("{prefix}{}", &path[..=end]));
        end = match path[..end].rfind('/') {
            Some(idx) => idx,
            None => break,
        };
    }
    parents
}

// ============================================================================
// Extensions
// ============================================================================

/// The lower-cased extension of a path, ignoring query strings and
/// format-argument suffixes.
///
/// Foreign 3D formats on non-local locations are rewritten to
/// [`WRAPPER_FORMAT_EXTENSION`] so they route through the wrapper document
/// format instead of their native reader.
pub fn extension_of(path: &str) -> String {
    let location = strip_format_args(path);
    let body = path_without_query(location);
    let name = body.rsplit(['/', '\\']).next().unwrap_or(&body);

    let extension = match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    };

    if !is_local(location) && FOREIGN_FORMAT_EXTENSIONS.contains(&extension.as_str()) {
        return WRAPPER_FORMAT_EXTENSION.to_string();
    }

    extension
}

/// Strip query string and fragment from a path.
fn path_without_query(path: &str) -> String {
    if scheme_of(path).is_some() {
        // Well-formed scheme URLs go through the url crate, which also
        // handles queries hidden inside odd authority forms
        if let Ok(parsed) = url::Url::parse(path) {
            return parsed.path().to_string();
        }
    }
    path.split(['?', '#']).next().unwrap_or(path).to_string()
}

// ============================================================================
// Tests
// ============================================================================
