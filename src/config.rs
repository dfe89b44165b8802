use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinkError, Result};
use crate::link::NavigationAction;

/// Host compiled in by build.rs, used when no config names an app host.
pub const DEFAULT_APP_HOST: &str = env!("LINKPRESS_DEFAULT_APP_HOST");

pub const DEFAULT_FALLBACK_SCREEN: &str = "NotFound";

/// Whether the current surface can report pointer buttons and modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Pointer,
    Touch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub screen: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hosts whose `http(s)` URLs are the app's own pages. The first one is
    /// used when building share URLs.
    #[serde(default)]
    #[serde(rename = "appHosts")]
    pub app_hosts: Vec<String>,
    /// Custom deep-link schemes, e.g. `bluesky` for `bluesky://profile/alice`.
    #[serde(default)]
    #[serde(rename = "appSchemes")]
    pub app_schemes: Vec<String>,
    /// Paths on an app host that still open outside the app, e.g. feeds.
    #[serde(default)]
    #[serde(rename = "externalPathSuffixes")]
    pub external_path_suffixes: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    #[serde(rename = "fallbackScreen")]
    pub fallback_screen: Option<String>,
    #[serde(default)]
    #[serde(rename = "defaultAction")]
    pub default_action: Option<NavigationAction>,
    #[serde(default)]
    pub surface: Option<Surface>,
    #[serde(default)]
    #[serde(rename = "warnOnMismatch")]
    pub warn_on_mismatch: Option<bool>,
}

impl Config {
    /// Read and merge every config file in order. List entries are unioned,
    /// scalar entries from later files win.
    pub fn new(file_paths: Vec<PathBuf>) -> Result<Self> {
        let mut merged_config = Config::default();
        for path in file_paths.iter() {
            let config_content =
                std::fs::read_to_string(path).map_err(|source| LinkError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
            let config = Config::from_json(&config_content).map_err(|source| {
                LinkError::ConfigParse {
                    path: path.clone(),
                    source,
                }
            })?;
            debug!(path = %path.display(), routes = config.routes.len(), "loaded config");

            merged_config.merge(config);
        }

        Ok(merged_config)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn merge(&mut self, other: Config) {
        extend_unique(&mut self.app_hosts, other.app_hosts);
        extend_unique(&mut self.app_schemes, other.app_schemes);
        extend_unique(
            &mut self.external_path_suffixes,
            other.external_path_suffixes,
        );
        for route in other.routes {
            if !self.routes.contains(&route) {
                self.routes.push(route);
            }
        }
        if other.fallback_screen.is_some() {
            self.fallback_screen = other.fallback_screen;
        }
        if other.default_action.is_some() {
            self.default_action = other.default_action;
        }
        if other.surface.is_some() {
            self.surface = other.surface;
        }
        if other.warn_on_mismatch.is_some() {
            self.warn_on_mismatch = other.warn_on_mismatch;
        }
    }

    /// Configured app hosts, lower-cased, or the build-time default.
    pub fn app_hosts(&self) -> Vec<String> {
        if self.app_hosts.is_empty() {
            return vec![DEFAULT_APP_HOST.to_ascii_lowercase()];
        }
        self.app_hosts
            .iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .collect()
    }

    pub fn app_schemes(&self) -> Vec<String> {
        self.app_schemes
            .iter()
            .map(|scheme| {
                scheme
                    .trim()
                    .trim_end_matches("://")
                    .trim_end_matches(':')
                    .to_ascii_lowercase()
            })
            .collect()
    }

    pub fn fallback_screen(&self) -> &str {
        self.fallback_screen
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_SCREEN)
    }

    pub fn default_action(&self) -> NavigationAction {
        self.default_action.unwrap_or_default()
    }

    pub fn surface(&self) -> Surface {
        self.surface.unwrap_or_default()
    }

    pub fn warn_on_mismatch(&self) -> bool {
        self.warn_on_mismatch.unwrap_or(true)
    }
}

fn extend_unique(target: &mut Vec<String>, values: Vec<String>) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}
