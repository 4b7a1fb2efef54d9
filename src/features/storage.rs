use std::path::PathBuf;

/// Local filesystem path behind an absolute path or a `file://` uri.
/// Content-provider uris have no local path and yield `None`.
pub fn parse_file_uri_path(uri: &str) -> Option<PathBuf> {
    let uri = uri.trim();
    if let Some(rest) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if uri.starts_with('/') {
        return Some(PathBuf::from(uri));
    }
    None
}
