use crate::config::Config;
use crate::url_normalizer::{BLANK_URL, is_relative, scheme_of};

/// Decides whether a normalized href leaves the app.
#[derive(Debug, Clone, Default)]
pub struct OriginClassifier {
    app_schemes: Vec<String>,
}

impl OriginClassifier {
    pub fn new(config: &Config) -> Self {
        Self {
            app_schemes: config.app_schemes(),
        }
    }

    /// True for web addresses, `mailto:` and any other non-app scheme.
    ///
    /// Expects output of [`crate::UrlNormalizer::normalize`]: app URLs have
    /// already been rewritten to paths, so an `http(s)` href that is still a
    /// full URL is external even on an app host.
    pub fn is_external(&self, href: &str) -> bool {
        if href.is_empty() || href == BLANK_URL || href.starts_with('#') || is_relative(href) {
            return false;
        }
        if href.starts_with("//") {
            return true;
        }

        match scheme_of(href) {
            Some(scheme) => !self.app_schemes.contains(&scheme),
            None => false,
        }
    }
}
