//! Maps canonical paths to screens and back.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::link::{RouteDescriptor, RouteParams};

/// Screen plus params, ready to hand to a navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub screen: String,
    pub params: RouteParams,
}

pub trait RouteMatcher {
    /// Match a canonical internal path. Must be total: paths that match no
    /// route resolve to a fallback screen rather than failing.
    fn match_path(&self, path: &str) -> RouteMatch;

    /// Build the canonical path for a structured descriptor, or `None` when
    /// the screen is unknown or a required param is missing.
    fn build_path(&self, route: &RouteDescriptor) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// [`RouteMatcher`] backed by a `matchit` radix tree.
///
/// Patterns accept `:name` / `{name}` params and `*rest` / `{*rest}`
/// catch-alls, whole segments only.
#[derive(Clone)]
pub struct RouteTable {
    router: matchit::Router<String>,
    builders: HashMap<String, Vec<Segment>>,
    fallback_screen: String,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("screens", &self.builders.keys().collect::<Vec<_>>())
            .field("fallback_screen", &self.fallback_screen)
            .finish()
    }
}

impl RouteTable {
    pub fn new(fallback_screen: impl Into<String>) -> Self {
        Self {
            router: matchit::Router::new(),
            builders: HashMap::new(),
            fallback_screen: fallback_screen.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut table = Self::new(config.fallback_screen());
        for entry in &config.routes {
            table.insert(&entry.screen, &entry.path)?;
        }
        debug!(routes = config.routes.len(), "built route table");
        Ok(table)
    }

    /// Register `pattern` for `screen`. The first pattern registered for a
    /// screen is the one used to build paths.
    pub fn insert(&mut self, screen: &str, pattern: &str) -> Result<()> {
        let segments = parse_pattern(pattern);
        let route = render_pattern(&segments);

        self.router
            .insert(route.clone(), screen.to_string())
            .map_err(|source| LinkError::InvalidRoute {
                screen: screen.to_string(),
                pattern: pattern.to_string(),
                source,
            })?;

        self.builders.entry(screen.to_string()).or_insert(segments);
        Ok(())
    }

    pub fn fallback_screen(&self) -> &str {
        &self.fallback_screen
    }
}

impl RouteMatcher for RouteTable {
    fn match_path(&self, path: &str) -> RouteMatch {
        let without_fragment = path.split('#').next().unwrap_or(path);
        let (route_path, query) = match without_fragment.split_once('?') {
            Some((route_path, query)) => (route_path, Some(query)),
            None => (without_fragment, None),
        };
        let route_path = if route_path.is_empty() { "/" } else { route_path };

        let mut params = RouteParams::new();
        let screen = match self.router.at(route_path) {
            Ok(matched) => {
                for (key, value) in matched.params.iter() {
                    params.insert(key.to_string(), decode_param(value));
                }
                matched.value.clone()
            }
            Err(_) => {
                warn!(path, fallback = %self.fallback_screen, "no route matched path");
                self.fallback_screen.clone()
            }
        };

        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }

        RouteMatch { screen, params }
    }

    fn build_path(&self, route: &RouteDescriptor) -> Option<String> {
        let segments = self.builders.get(&route.screen)?;
        let mut used = HashSet::new();
        let mut path = String::new();

        for segment in segments {
            match segment {
                Segment::Static(text) => {
                    path.push('/');
                    path.push_str(text);
                }
                Segment::Param(name) => {
                    let value = route.params.get(name).filter(|v| !v.is_empty())?;
                    used.insert(name.as_str());
                    path.push('/');
                    path.push_str(&urlencoding::encode(value));
                }
                Segment::CatchAll(name) => {
                    let value = route.params.get(name).filter(|v| !v.is_empty())?;
                    used.insert(name.as_str());
                    for part in value.split('/').filter(|p| !p.is_empty()) {
                        path.push('/');
                        path.push_str(&urlencoding::encode(part));
                    }
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let extra: BTreeMap<&str, &str> = route
            .params
            .iter()
            .filter(|(key, _)| !used.contains(key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        if !extra.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extra)
                .finish();
            path.push('?');
            path.push_str(&query);
        }

        Some(path)
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = segment.strip_prefix('*') {
                Segment::CatchAll(name.to_string())
            } else if let Some(name) = segment
                .strip_prefix("{*")
                .and_then(|s| s.strip_suffix('}'))
            {
                Segment::CatchAll(name.to_string())
            } else if let Some(name) = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Segment::Param(name.to_string())
            } else {
                Segment::Static(segment.to_string())
            }
        })
        .collect()
}

/// `matchit` route syntax for parsed segments.
fn render_pattern(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut route = String::new();
    for segment in segments {
        route.push('/');
        match segment {
            Segment::Static(text) => route.push_str(text),
            Segment::Param(name) => route.push_str(&format!("{{{}}}", name)),
            Segment::CatchAll(name) => route.push_str(&format!("{{*{}}}", name)),
        }
    }
    route
}

fn decode_param(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
