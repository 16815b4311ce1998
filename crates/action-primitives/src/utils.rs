//! URL and text helpers used around dispatch

use url::{ParseError, Url};

/// Scheme of `raw`, or `None` when the string has no scheme at all
pub fn url_scheme(raw: &str) -> Option<String> {
    match Url::parse(raw.trim()) {
        Ok(parsed) => Some(parsed.scheme().to_ascii_lowercase()),
        Err(ParseError::RelativeUrlWithoutBase) => None,
        Err(_) => raw
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .filter(|scheme| {
                !scheme.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            }),
    }
}

/// Add `https://` to bare hosts; leave `http(s)://` and `file://` alone
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
    {
        return trimmed.to_string();
    }
    format!("https://{}", trimmed.trim_start_matches("//"))
}

/// Collapse whitespace runs and strip control characters
pub fn sanitize_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection() {
        assert_eq!(url_scheme("https://example.com").as_deref(), Some("https"));
        assert_eq!(url_scheme("javascript:alert(1)").as_deref(), Some("javascript"));
        assert_eq!(url_scheme("FILE:///etc/passwd").as_deref(), Some("file"));
        assert_eq!(url_scheme("example.com/path"), None);
    }

    #[test]
    fn normalizes_bare_hosts() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url(" http://a.test "), "http://a.test");
        assert_eq!(normalize_url("file:///tmp/x.html"), "file:///tmp/x.html");
    }

    #[test]
    fn sanitizes_whitespace() {
        assert_eq!(sanitize_text("  Hello\n\n  world\t!\u{0007} "), "Hello world !");
        assert_eq!(sanitize_text("\n\t"), "");
    }
}
