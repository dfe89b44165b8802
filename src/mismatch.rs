//! Link text vs. target mismatch detection.
//!
//! A link whose visible text reads like a URL is expected to go where the
//! text says. When the text names one host and the href another, the press
//! is held for confirmation.
//!
//! This is a heuristic, not a security boundary. Internationalized domains
//! and short handles can both slip through or trip it.

use url::Url;

use crate::link::{Link, MismatchWarning};

/// Returns a warning when `link` opts into warnings, has literal text, is
/// external, and the text points at a different host than the href.
pub fn detect_mismatch(link: &Link) -> Option<MismatchWarning> {
    if !link.warn_on_mismatch || !link.is_external() {
        return None;
    }
    let text = link.label.as_ref()?.literal_text()?;

    if link_requires_warning(link.href(), text) {
        Some(MismatchWarning {
            display_text: text.to_string(),
            href: link.href().to_string(),
        })
    } else {
        None
    }
}

/// Compare the host a label appears to name with the host of `href`.
///
/// Labels that are not URL-shaped never warn.
pub fn link_requires_warning(href: &str, label: &str) -> bool {
    let Some(label_host) = label_to_host(label) else {
        return false;
    };
    if !is_url_shaped(label, &label_host) {
        return false;
    }

    match target_host(href) {
        Some(host) => host != label_host,
        None => true,
    }
}

/// Host a label would have if it were typed into an address bar.
///
/// Case-insensitive; scheme, path and trailing slash are ignored. A leading
/// `@` is dropped so handles compare like domains.
pub fn label_to_host(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label.chars().any(char::is_whitespace) {
        return None;
    }
    let label = label.strip_prefix('@').unwrap_or(label);

    if let Ok(url) = Url::parse(label) {
        if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
            return Some(host.to_ascii_lowercase());
        }
    }

    Url::parse(&format!("https://{}", label))
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

/// A label is URL-shaped if it spells out a web scheme or its host ends in
/// something that looks like a top-level domain.
fn is_url_shaped(label: &str, host: &str) -> bool {
    let lower = label.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }

    let Some((_, tld)) = host.trim_end_matches('.').rsplit_once('.') else {
        return false;
    };
    tld.len() >= 2 && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"))
}

/// Host of the actual target. `mailto:` hrefs use the address domain,
/// protocol-relative hrefs are read as https.
fn target_host(href: &str) -> Option<String> {
    let url = match href.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{}", rest)).ok()?,
        None => Url::parse(href).ok()?,
    };
    if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
        return Some(host.to_ascii_lowercase());
    }
    if url.scheme() == "mailto" {
        let address = url.path().split(',').next()?;
        let (_, domain) = address.rsplit_once('@')?;
        return Some(domain.to_ascii_lowercase());
    }
    None
}
