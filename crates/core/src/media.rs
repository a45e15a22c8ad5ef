//! Image reference resolution.
//!
//! Stored image references are either absolute URLs (pasted by an admin) or
//! paths under `/uploads` produced by the upload endpoint.

/// Resolve a stored image reference to a URL a browser can load.
///
/// Absolute `http(s)` URLs and `data:` URIs are returned unchanged. Anything
/// else is treated as a server-relative path and prefixed with `base` when
/// one is configured; without a base the path is returned with a leading
/// slash so it resolves against the current origin.
#[must_use]
pub fn resolve_image_url(base: Option<&str>, reference: &str) -> String {
    let reference = reference.trim();
    if is_absolute(reference) {
        return reference.to_owned();
    }

    let path = if reference.starts_with('/') {
        reference.to_owned()
    } else {
        format!("/{reference}")
    };

    match base.map(|b| b.trim().trim_end_matches('/')) {
        Some(base) if !base.is_empty() => format!("{base}{path}"),
        _ => path,
    }
}

fn is_absolute(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_unchanged() {
        assert_eq!(
            resolve_image_url(Some("https://portal.example"), "https://cdn.example/a.png"),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_relative_path_prefixed() {
        assert_eq!(
            resolve_image_url(Some("https://portal.example/"), "/uploads/kegiatan/1-a.png"),
            "https://portal.example/uploads/kegiatan/1-a.png"
        );
        assert_eq!(
            resolve_image_url(Some("https://portal.example"), "uploads/hero/b.jpg"),
            "https://portal.example/uploads/hero/b.jpg"
        );
    }

    #[test]
    fn test_without_base_returns_rooted_path() {
        assert_eq!(resolve_image_url(None, "uploads/hero/b.jpg"), "/uploads/hero/b.jpg");
        assert_eq!(resolve_image_url(Some(""), "/uploads/hero/b.jpg"), "/uploads/hero/b.jpg");
    }
}
