//! URL Normalization Module
//!
//! Turns whatever a link was given (full URL, custom-scheme deep link,
//! relative path) into one safe, canonical href. Two representations of the
//! same in-app page must end up as the same string, otherwise route matching
//! and "is this internal?" decisions disagree depending on how the link was
//! written.
//!
//! ## Forms handled
//!
//! 1. App URLs: `https://bsky.app/profile/alice/` → `/profile/alice`
//! 2. Custom schemes: `bluesky://profile/alice` → `/profile/alice`
//! 3. Protocol-relative URLs: `//bsky.app/search?q=rust` → `/search?q=rust`
//! 4. Relative paths: `profile//alice` → `/profile/alice`
//! 5. Everything else that parses keeps its original text
//!
//! Unsafe input never errors. Script-capable schemes and unparseable URLs
//! become [`BLANK_URL`], empty input stays empty.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;
use url::Url;

use crate::config::Config;

/// Inert href that unsafe input degrades to.
pub const BLANK_URL: &str = "about:blank";

const BLOCKED_SCHEMES: [&str; 3] = ["javascript", "data", "vbscript"];

/// Entities are decoded until stable, bounded so crafted input can't spin.
const MAX_ENTITY_PASSES: usize = 5;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("valid scheme regex"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));?|&(colon|tab|newline|amp|lt|gt|quot|apos);")
        .expect("valid entity regex")
});

#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    app_hosts: Vec<String>,
    app_schemes: Vec<String>,
    external_path_suffixes: Vec<String>,
}

impl UrlNormalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            app_hosts: config.app_hosts(),
            app_schemes: config.app_schemes(),
            external_path_suffixes: config.external_path_suffixes.clone(),
        }
    }

    /// Sanitize `raw` and rewrite in-app forms to a canonical path.
    pub fn normalize(&self, raw: &str) -> String {
        let sanitized = sanitize_url(raw);
        if sanitized.is_empty() || sanitized == BLANK_URL || sanitized.starts_with('#') {
            return sanitized;
        }

        // Protocol-relative URLs carry a host, treat them as https.
        if sanitized.starts_with("//") {
            return self.normalize_full_url(&format!("https:{}", sanitized), sanitized);
        }

        if is_relative(&sanitized) {
            return self.canonicalize_relative(&sanitized);
        }

        match scheme_of(&sanitized) {
            Some(scheme) if scheme == "http" || scheme == "https" => {
                let href = sanitized.clone();
                self.normalize_full_url(&href, sanitized)
            }
            Some(scheme) if self.app_schemes.contains(&scheme) => {
                self.normalize_app_scheme(&sanitized, &scheme)
            }
            Some(_) => sanitized,
            // No scheme and no leading slash, e.g. `profile/alice`.
            None => self.canonicalize_relative(&sanitized),
        }
    }

    /// Full app URL for sharing; external hrefs pass through untouched.
    pub fn to_share_url(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("https://{}{}", self.primary_host(), href)
        } else {
            href.to_string()
        }
    }

    pub fn is_app_host(&self, host: &str) -> bool {
        // Strip port if present
        let host_without_port = host.split(':').next().unwrap_or(host);
        self.app_hosts
            .iter()
            .any(|app_host| app_host.eq_ignore_ascii_case(host_without_port))
    }

    fn primary_host(&self) -> &str {
        self.app_hosts
            .first()
            .map(String::as_str)
            .unwrap_or(crate::config::DEFAULT_APP_HOST)
    }

    fn normalize_full_url(&self, url: &str, original: String) -> String {
        let Ok(parsed) = Url::parse(url) else {
            debug!(url, "unparseable url degraded to blank");
            return BLANK_URL.to_string();
        };

        let on_app_host = parsed.host_str().is_some_and(|host| self.is_app_host(host));
        if !on_app_host || self.is_external_path(parsed.path()) {
            return original;
        }

        canonical_path(parsed.path(), parsed.query(), parsed.fragment())
    }

    /// `bluesky://profile/alice` names the page in what would be the host
    /// position, so everything after the scheme is the path.
    fn normalize_app_scheme(&self, url: &str, scheme: &str) -> String {
        let rest = &url[scheme.len() + 1..];
        let rest = rest.trim_start_matches('/');
        self.canonicalize_relative(&format!("/{}", rest))
    }

    /// Resolve a relative reference against the app origin so it goes through
    /// the same encoding as a full app URL would.
    fn canonicalize_relative(&self, path: &str) -> String {
        let path = if path.starts_with('/') || path.starts_with('.') || path.starts_with('?') {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(format!("/{}", path))
        };

        let base = format!("https://{}/", self.primary_host());
        match Url::parse(&base).and_then(|base| base.join(&path)) {
            Ok(joined) => canonical_path(joined.path(), joined.query(), joined.fragment()),
            Err(err) => {
                debug!(path = %path, error = %err, "relative path degraded to blank");
                BLANK_URL.to_string()
            }
        }
    }

    fn is_external_path(&self, path: &str) -> bool {
        let trimmed = clean_path(path);
        self.external_path_suffixes
            .iter()
            .any(|suffix| trimmed.ends_with(suffix.trim_end_matches('/')))
    }
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Strip control and invisible characters, decode HTML entities and reject
/// script-capable schemes.
pub fn sanitize_url(raw: &str) -> String {
    let mut text = strip_invisible(raw);
    for _ in 0..MAX_ENTITY_PASSES {
        let decoded = decode_html_entities(&text);
        if decoded == text {
            break;
        }
        text = strip_invisible(&decoded);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if is_relative(trimmed) || trimmed.starts_with('#') {
        return trimmed.to_string();
    }

    // Percent-encoding can hide the scheme, e.g. `%6Aavascript:`. Escapes
    // that aren't UTF-8 are still valid URL text, so decode lossily.
    let decoded_bytes = urlencoding::decode_binary(trimmed.as_bytes());
    let decoded = strip_invisible(&String::from_utf8_lossy(&decoded_bytes));

    match scheme_of(&decoded) {
        Some(scheme) if BLOCKED_SCHEMES.contains(&scheme.as_str()) => {
            debug!(scheme = %scheme, "blocked scheme degraded to blank");
            BLANK_URL.to_string()
        }
        Some(_) if Url::parse(trimmed).is_err() => {
            debug!(url = trimmed, "unparseable url degraded to blank");
            BLANK_URL.to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Lower-cased scheme of an absolute URL, if any.
pub(crate) fn scheme_of(url: &str) -> Option<String> {
    SCHEME_RE
        .captures(url)
        .map(|caps| caps[1].to_ascii_lowercase())
}

pub(crate) fn is_relative(url: &str) -> bool {
    (url.starts_with('/') && !url.starts_with("//")) || url.starts_with('.') || url.starts_with('?')
}

fn is_invisible(c: char) -> bool {
    c <= '\x1f'
        || ('\x7f'..='\u{9f}').contains(&c)
        || ('\u{2000}'..='\u{200d}').contains(&c)
        || c == '\u{feff}'
}

fn strip_invisible(text: &str) -> String {
    text.chars().filter(|c| !is_invisible(*c)).collect()
}

fn decode_html_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            if let Some(hex) = caps.get(1) {
                return decode_code_point(u32::from_str_radix(hex.as_str(), 16).ok());
            }
            if let Some(dec) = caps.get(2) {
                return decode_code_point(dec.as_str().parse().ok());
            }
            let named = match &caps[3] {
                "colon" => ":",
                "tab" => "\t",
                "newline" => "\n",
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            };
            named.to_string()
        })
        .into_owned()
}

fn decode_code_point(code: Option<u32>) -> String {
    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
}

/// Join a cleaned path with its query and fragment.
fn canonical_path(path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
    let mut result = clean_path(path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        result.push('?');
        result.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        result.push('#');
        result.push_str(fragment);
    }
    result
}

/// Leading slash, no duplicate slashes, no trailing slash except for root.
fn clean_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        result.push('/');
        result.push_str(segment);
    }
    if result.is_empty() {
        result.push('/');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            app_hosts: vec!["bsky.app".to_string(), "staging.bsky.app".to_string()],
            app_schemes: vec!["bluesky".to_string()],
            external_path_suffixes: vec!["/rss".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn test_normalize_app_url() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.normalize("https://bsky.app/profile/alice"),
            "/profile/alice"
        );
        assert_eq!(
            normalizer.normalize("http://STAGING.bsky.app:8080/profile/alice/"),
            "/profile/alice"
        );
    }

    #[test]
    fn test_normalize_keeps_query_and_fragment() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.normalize("https://bsky.app/search?q=rust#top"),
            "/search?q=rust#top"
        );
    }

    #[test]
    fn test_normalize_app_root() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize("https://bsky.app"), "/");
        assert_eq!(normalizer.normalize("https://bsky.app/"), "/");
    }

    #[test]
    fn test_full_and_relative_forms_agree() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        let paths = [
            "/profile/alice",
            "/profile/alice/post/3k2",
            "/search?q=hello%20world",
            "/hashtag/rust",
            "/",
            "/profile/did:plc:abc123",
            "/profile/bob/",
            "/search?q=caf%E9",
        ];
        for path in paths {
            let relative = normalizer.normalize(path);
            let full = normalizer.normalize(&format!("https://bsky.app{}", path));
            let scheme = normalizer.normalize(&format!("bluesky:/{}", path));
            assert_eq!(relative, full, "full url form of {path}");
            assert_eq!(relative, scheme, "deep link form of {path}");
        }
    }

    #[test]
    fn test_normalize_custom_scheme() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.normalize("bluesky://profile/alice"),
            "/profile/alice"
        );
        assert_eq!(normalizer.normalize("BLUESKY://search?q=x"), "/search?q=x");
    }

    #[test]
    fn test_external_url_keeps_original_text() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize("https://other.com"), "https://other.com");
        assert_eq!(
            normalizer.normalize("  https://example.com/a//b/  "),
            "https://example.com/a//b/"
        );
        assert_eq!(
            normalizer.normalize("mailto:alice@example.com"),
            "mailto:alice@example.com"
        );
    }

    #[test]
    fn test_external_path_suffix_stays_full_url() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.normalize("https://bsky.app/profile/alice/rss"),
            "https://bsky.app/profile/alice/rss"
        );
    }

    #[test]
    fn test_protocol_relative() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize("//bsky.app/search?q=rust"), "/search?q=rust");
        assert_eq!(normalizer.normalize("//other.com/x"), "//other.com/x");
    }

    #[test]
    fn test_relative_path_cleanup() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize("profile//alice/"), "/profile/alice");
        assert_eq!(normalizer.normalize("/a/./b/../c"), "/a/c");
        assert_eq!(normalizer.normalize("#"), "#");
    }

    #[test]
    fn test_blocks_script_schemes() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize("javascript:alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("JaVaScRiPt:alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("java\tscript:alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("&#106;avascript:alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("&#x6A;avascript&colon;alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("%6Aavascript:alert(1)"), BLANK_URL);
        assert_eq!(normalizer.normalize("data:text/html,<b>hi</b>"), BLANK_URL);
        assert_eq!(normalizer.normalize("vbscript:msgbox"), BLANK_URL);
    }

    #[test]
    fn test_invalid_input_degrades() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   \u{200b}  "), "");
        assert_eq!(normalizer.normalize("https://exa mple.com"), BLANK_URL);
        assert_eq!(normalizer.normalize("https://%ff.com"), BLANK_URL);
    }

    #[test]
    fn test_non_utf8_escapes_are_kept() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.normalize("https://bsky.app/search?q=caf%E9"),
            "/search?q=caf%E9"
        );
        assert_eq!(
            normalizer.normalize("https://example.com/search?q=caf%E9"),
            "https://example.com/search?q=caf%E9"
        );
        assert_eq!(normalizer.normalize("https://example.com/%FF"), "https://example.com/%FF");
    }

    #[test]
    fn test_sanitize_strips_invisible_characters() {
        assert_eq!(
            sanitize_url("\u{feff}https://exa\u{200b}mple.com\x00"),
            "https://example.com"
        );
    }

    #[test]
    fn test_share_url() {
        let normalizer = UrlNormalizer::new(&create_test_config());

        assert_eq!(
            normalizer.to_share_url("/profile/alice"),
            "https://bsky.app/profile/alice"
        );
        assert_eq!(
            normalizer.to_share_url("https://other.com"),
            "https://other.com"
        );
    }
}
