//! Shared key helpers.
//!
//! Directories are matched by path segment, so `circle` does not contain
//! `circles/a.png`.

use std::path::Path;

/// `dir/rest`, tolerating stray slashes on either side of the join.
pub fn join(dir: &str, rest: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let rest = rest.trim_start_matches('/');
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

/// Whether `key` lies under directory `dir`.
pub fn is_under_dir(key: &str, dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        return false;
    }
    key.trim_start_matches('/')
        .strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
}

/// Last path segment of a key.
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Extension of a key's file name including the dot, or "" when none.
pub fn extension(key: &str) -> String {
    Path::new(base_name(key))
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Content type for a file extension, defaulting to octet-stream.
pub fn content_type_for(key: &str) -> &'static str {
    match extension(key).to_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".webp" => "image/webp",
        ".gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_under_dir_matches_whole_segments() {
        assert!(is_under_dir("circle/u1/a.png", "circle"));
        assert!(is_under_dir("circle/a.png", "circle/"));
        assert!(!is_under_dir("circles/a.png", "circle"));
        assert!(!is_under_dir("circle/", "circle"));
        assert!(!is_under_dir("a.png", ""));
        assert!(is_under_dir("a/b/c.png", "a/b"));
    }

    #[test]
    fn test_base_name_and_extension() {
        assert_eq!(base_name("migrated/c1.jpg"), "c1.jpg");
        assert_eq!(base_name("c1.jpg"), "c1.jpg");
        assert_eq!(extension("migrated/c1.jpg"), ".jpg");
        assert_eq!(extension("migrated.d/c1"), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("circle/", "/u1/a.png"), "circle/u1/a.png");
        assert_eq!(join("", "a.png"), "a.png");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.PNG"), "image/png");
        assert_eq!(content_type_for("a/b.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }
}
