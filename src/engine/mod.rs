use tracing::{debug, info, warn};

use crate::config::{Config, Surface};
use crate::error::Result;
use crate::link::{
    Link, LinkTarget, LongPressOutcome, MismatchWarning, NavigationAction, PressOutcome,
    ResolvedLink,
};
use crate::origin_classifier::OriginClassifier;
use crate::press_resolver::{
    DefaultAction, Interceptor, PressEvent, resolve_long_press, resolve_press,
};
use crate::route_matcher::{RouteMatch, RouteMatcher, RouteTable};
use crate::url_normalizer::{BLANK_URL, UrlNormalizer};

mod host;
pub use host::{
    ExternalOpener, Modal, ModalControls, NavigationDispatcher, NavigationRequest, ShareSheet,
};

/// Ties normalization, classification, routing and press resolution
/// together for one app configuration.
///
/// Every method works synchronously on the caller's thread. The engine keeps
/// no per-press state, so two quick presses are resolved independently in
/// the order the host delivers them.
#[derive(Debug, Clone)]
pub struct LinkEngine<R = RouteTable> {
    normalizer: UrlNormalizer,
    classifier: OriginClassifier,
    routes: R,
    surface: Surface,
    default_action: NavigationAction,
    warn_on_mismatch: bool,
}

impl LinkEngine<RouteTable> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let routes = RouteTable::from_config(config)?;
        Ok(Self::with_routes(config, routes))
    }
}

impl<R: RouteMatcher> LinkEngine<R> {
    pub fn with_routes(config: &Config, routes: R) -> Self {
        Self {
            normalizer: UrlNormalizer::new(config),
            classifier: OriginClassifier::new(config),
            routes,
            surface: config.surface(),
            default_action: config.default_action(),
            warn_on_mismatch: config.warn_on_mismatch(),
        }
    }

    /// Normalize and classify a target. Never fails: unusable targets resolve
    /// to an inert internal href.
    pub fn resolve(&self, target: &LinkTarget) -> ResolvedLink {
        let href = match target {
            LinkTarget::Href(raw) => self.normalizer.normalize(raw),
            LinkTarget::Route(route) => match self.routes.build_path(route) {
                Some(path) => self.normalizer.normalize(&path),
                None => {
                    warn!(screen = %route.screen, "cannot build path for route descriptor");
                    BLANK_URL.to_string()
                }
            },
        };
        let is_external = self.classifier.is_external(&href);
        debug!(href = %href, is_external, "resolved link");

        ResolvedLink::new(href, is_external)
    }

    /// Resolve a target into a [`Link`] carrying the configured defaults.
    pub fn link(&self, target: impl Into<LinkTarget>) -> Link {
        let mut link = Link::new(self.resolve(&target.into())).with_action(self.default_action);
        link.warn_on_mismatch = self.warn_on_mismatch;
        link
    }

    pub fn resolve_press(
        &self,
        link: &Link,
        event: &PressEvent,
        default: &mut dyn DefaultAction,
        intercept: Option<&mut Interceptor<'_>>,
    ) -> PressOutcome {
        resolve_press(link, event, self.surface, default, intercept)
    }

    pub fn resolve_long_press(&self, link: &Link) -> LongPressOutcome {
        resolve_long_press(link, |href| self.normalizer.to_share_url(href))
    }

    pub fn match_route(&self, href: &str) -> RouteMatch {
        self.routes.match_path(href)
    }

    /// Resolve a press and carry out the outcome against `host`.
    pub fn press<H>(
        &self,
        host: &mut H,
        link: &Link,
        event: &PressEvent,
        default: &mut dyn DefaultAction,
        intercept: Option<&mut Interceptor<'_>>,
    ) -> PressOutcome
    where
        H: NavigationDispatcher + ModalControls + ExternalOpener,
    {
        let outcome = self.resolve_press(link, event, default, intercept);
        match &outcome {
            PressOutcome::Cancelled => {}
            PressOutcome::Warn(warning) => {
                host.open_modal(Modal::LinkWarning(warning.clone()));
            }
            PressOutcome::OpenExternal { href } => self.open_external(host, href),
            PressOutcome::Navigate { action, href } => self.navigate(host, *action, href),
        }
        outcome
    }

    pub fn long_press<H>(&self, host: &mut H, link: &Link) -> LongPressOutcome
    where
        H: ModalControls + ShareSheet,
    {
        let outcome = self.resolve_long_press(link);
        match &outcome {
            LongPressOutcome::Warn(warning) => host.open_modal(Modal::LinkWarning(warning.clone())),
            LongPressOutcome::Share { url } => host.share_url(url),
        }
        outcome
    }

    /// The user accepted a mismatch warning. Warnings only exist for external
    /// links, so this goes straight to the opener.
    pub fn confirm_warning<H: ExternalOpener>(&self, host: &mut H, warning: &MismatchWarning) {
        self.open_external(host, &warning.href);
    }

    fn open_external<H: ExternalOpener + ?Sized>(&self, host: &mut H, href: &str) {
        info!(href, "opening external url");
        host.open_url(href);
    }

    /// Close any overlay first so the new screen doesn't land under a stale
    /// dialog, then dispatch.
    fn navigate<H>(&self, host: &mut H, action: NavigationAction, href: &str)
    where
        H: NavigationDispatcher + ModalControls + ?Sized,
    {
        host.close_modal();
        let RouteMatch { screen, params } = self.routes.match_path(href);
        info!(%action, screen = %screen, href, "dispatching navigation");
        host.dispatch(NavigationRequest {
            action,
            screen,
            params,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteEntry;
    use crate::link::RouteDescriptor;
    use crate::press_resolver::DefaultActionFlag;

    #[derive(Debug, Default)]
    struct RecordingHost {
        events: Vec<String>,
        dispatched: Vec<NavigationRequest>,
    }

    impl NavigationDispatcher for RecordingHost {
        fn dispatch(&mut self, request: NavigationRequest) {
            self.events.push(format!("dispatch:{}", request.screen));
            self.dispatched.push(request);
        }
    }

    impl ModalControls for RecordingHost {
        fn open_modal(&mut self, modal: Modal) {
            self.events.push(format!("open:{}", modal.name()));
        }

        fn close_modal(&mut self) {
            self.events.push("close".to_string());
        }
    }

    impl ExternalOpener for RecordingHost {
        fn open_url(&mut self, href: &str) {
            self.events.push(format!("url:{}", href));
        }
    }

    impl ShareSheet for RecordingHost {
        fn share_url(&mut self, url: &str) {
            self.events.push(format!("share:{}", url));
        }
    }

    fn create_test_engine() -> LinkEngine {
        let config = Config {
            app_hosts: vec!["bsky.app".into()],
            routes: vec![
                RouteEntry {
                    screen: "Profile".into(),
                    path: "/profile/:name".into(),
                },
                RouteEntry {
                    screen: "Search".into(),
                    path: "/search".into(),
                },
            ],
            ..Config::default()
        };
        LinkEngine::from_config(&config).unwrap()
    }

    #[test]
    fn test_resolve_route_descriptor() {
        let engine = create_test_engine();

        let route = RouteDescriptor::new("Profile").param("name", "alice");
        let resolved = engine.resolve(&route.into());

        assert_eq!(resolved.href(), "/profile/alice");
        assert!(!resolved.is_external());
    }

    #[test]
    fn test_unknown_route_descriptor_is_inert() {
        let engine = create_test_engine();

        let resolved = engine.resolve(&RouteDescriptor::new("Nope").into());

        assert_eq!(resolved.href(), BLANK_URL);
        assert!(!resolved.is_external());
    }

    #[test]
    fn test_navigate_closes_overlay_before_dispatch() {
        let engine = create_test_engine();
        let mut host = RecordingHost::default();
        let link = engine.link("https://bsky.app/profile/alice");

        let outcome = engine.press(
            &mut host,
            &link,
            &PressEvent::primary(),
            &mut DefaultActionFlag::default(),
            None,
        );

        assert_eq!(
            outcome,
            PressOutcome::Navigate {
                action: NavigationAction::Push,
                href: "/profile/alice".into()
            }
        );
        assert_eq!(host.events, vec!["close", "dispatch:Profile"]);
        assert_eq!(host.dispatched[0].params["name"], "alice");
        assert_eq!(host.dispatched[0].action, NavigationAction::Push);
    }

    #[test]
    fn test_warning_then_confirm_opens_url() {
        let engine = create_test_engine();
        let mut host = RecordingHost::default();
        let link = engine.link("https://other.com").with_text("example.com");

        let outcome = engine.press(
            &mut host,
            &link,
            &PressEvent::primary(),
            &mut DefaultActionFlag::default(),
            None,
        );
        let PressOutcome::Warn(warning) = outcome.clone() else {
            panic!("expected warning, got {outcome:?}");
        };
        assert_eq!(host.events, vec!["open:link-warning"]);

        engine.confirm_warning(&mut host, &warning);
        assert_eq!(host.events, vec!["open:link-warning", "url:https://other.com"]);
    }

    #[test]
    fn test_long_press_shares_full_url() {
        let engine = create_test_engine();
        let mut host = RecordingHost::default();
        let link = engine.link("/search?q=rust");

        engine.long_press(&mut host, &link);

        assert_eq!(host.events, vec!["share:https://bsky.app/search?q=rust"]);
    }

    #[test]
    fn test_cancelled_touches_nothing() {
        let engine = create_test_engine();
        let mut host = RecordingHost::default();
        let link = engine.link("/profile/alice");
        let mut stop = |_: &PressEvent| crate::press_resolver::Intercept::Stop;

        let outcome = engine.press(
            &mut host,
            &link,
            &PressEvent::primary(),
            &mut DefaultActionFlag::default(),
            Some(&mut stop),
        );

        assert_eq!(outcome, PressOutcome::Cancelled);
        assert!(host.events.is_empty());
    }
}
