//! Link data model shared by the normalizer, resolver and controller.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

pub type RouteParams = BTreeMap<String, String>;

/// What a link points at, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkTarget {
    /// An absolute URL, deep link or relative path.
    Href(String),
    /// A screen name plus params, turned into a path by the route table.
    Route(RouteDescriptor),
}

impl From<&str> for LinkTarget {
    fn from(href: &str) -> Self {
        LinkTarget::Href(href.to_string())
    }
}

impl From<String> for LinkTarget {
    fn from(href: String) -> Self {
        LinkTarget::Href(href)
    }
}

impl From<RouteDescriptor> for LinkTarget {
    fn from(route: RouteDescriptor) -> Self {
        LinkTarget::Route(route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub screen: String,
    #[serde(default)]
    pub params: RouteParams,
}

impl RouteDescriptor {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            params: RouteParams::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// The canonical, classified form of a [`LinkTarget`].
///
/// Only [`crate::LinkEngine::resolve`] builds these, so `is_external` always comes
/// from the origin classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    href: String,
    is_external: bool,
}

impl ResolvedLink {
    pub(crate) fn new(href: String, is_external: bool) -> Self {
        Self { href, is_external }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum NavigationAction {
    #[default]
    Push,
    Replace,
    Navigate,
}

impl NavigationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            NavigationAction::Push => "push",
            NavigationAction::Replace => "replace",
            NavigationAction::Navigate => "navigate",
        }
    }
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationAction {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "push" => Ok(NavigationAction::Push),
            "replace" => Ok(NavigationAction::Replace),
            "navigate" => Ok(NavigationAction::Navigate),
            _ => Err(LinkError::UnsupportedAction(s.to_string())),
        }
    }
}

impl TryFrom<String> for NavigationAction {
    type Error = LinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Visible content of a link. Only literal text can take part in mismatch
/// detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkLabel {
    Text(String),
    Composite,
}

impl LinkLabel {
    /// Returns the label text when it is non-empty literal text.
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            LinkLabel::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Shown when the visible text of a link points somewhere other than its href.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchWarning {
    pub display_text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PressOutcome {
    Cancelled,
    Warn(MismatchWarning),
    OpenExternal { href: String },
    Navigate { action: NavigationAction, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LongPressOutcome {
    Warn(MismatchWarning),
    Share { url: String },
}

/// A resolved link plus the per-link options a press needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub resolved: ResolvedLink,
    pub label: Option<LinkLabel>,
    pub action: NavigationAction,
    pub warn_on_mismatch: bool,
}

impl Link {
    pub fn new(resolved: ResolvedLink) -> Self {
        Self {
            resolved,
            label: None,
            action: NavigationAction::default(),
            warn_on_mismatch: true,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.label = Some(LinkLabel::Text(text.into()));
        self
    }

    pub fn with_label(mut self, label: LinkLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_action(mut self, action: NavigationAction) -> Self {
        self.action = action;
        self
    }

    pub fn without_mismatch_warning(mut self) -> Self {
        self.warn_on_mismatch = false;
        self
    }

    pub fn href(&self) -> &str {
        self.resolved.href()
    }

    pub fn is_external(&self) -> bool {
        self.resolved.is_external()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parses_case_insensitively() {
        assert_eq!("Push".parse::<NavigationAction>().unwrap(), NavigationAction::Push);
        assert_eq!(
            "replace".parse::<NavigationAction>().unwrap(),
            NavigationAction::Replace
        );
        assert_eq!(
            "NAVIGATE".parse::<NavigationAction>().unwrap(),
            NavigationAction::Navigate
        );
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let err = "pop".parse::<NavigationAction>().unwrap_err();
        assert!(matches!(err, LinkError::UnsupportedAction(ref value) if value == "pop"));
    }

    #[test]
    fn test_action_deserialize_rejects_unknown() {
        let ok: NavigationAction = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(ok, NavigationAction::Replace);

        let err = serde_json::from_str::<NavigationAction>("\"goBack\"").unwrap_err();
        assert!(err.to_string().contains("unsupported navigation action"));
    }

    #[test]
    fn test_literal_text_ignores_blank_and_composite() {
        assert_eq!(LinkLabel::Text("bsky.app".into()).literal_text(), Some("bsky.app"));
        assert_eq!(LinkLabel::Text("   ".into()).literal_text(), None);
        assert_eq!(LinkLabel::Composite.literal_text(), None);
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = PressOutcome::Navigate {
            action: NavigationAction::Push,
            href: "/profile/alice".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "navigate");
        assert_eq!(json["action"], "push");
        assert_eq!(json["href"], "/profile/alice");
    }
}
