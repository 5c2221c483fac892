use std::env;
use std::path::{Path, PathBuf};
use urlencoding::decode;

/// Strip host-reporting artifacts from an executable path, as a plain string
/// transformation. Some hosts report `file://` URIs, and Windows paths come
/// through with a spurious leading slash (`/C:/Users/...`).
pub fn strip_host_artifacts(source_path: &str) -> String {
    let mut path_str = source_path.to_string();

    if let Some(rest) = path_str.strip_prefix("file://") {
        let decoded = decode(rest).unwrap_or_else(|_| rest.into());
        path_str = decoded.into_owned();
    }

    // /C:/ style
    if path_str.starts_with('/') {
        let mut chars = path_str.chars();
        chars.next();
        if chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.next() == Some(':') {
            path_str.remove(0);
        }
    }

    path_str
}

/// Normalize the path the host reports for the loaded program into an
/// absolute, simplified filesystem path.
pub fn normalize_program_path(source_path: &str) -> PathBuf {
    let path_str = strip_host_artifacts(source_path);

    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };

    // dunce resolves . and .. and avoids \\?\ paths on Windows
    dunce::canonicalize(&absolute).unwrap_or(absolute)
}
