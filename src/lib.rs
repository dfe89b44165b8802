//! Link resolution and press dispatch.
//!
//! A link target (full URL, deep link, relative path or route descriptor) is
//! normalized and classified once, then every press on it resolves to exactly
//! one [`PressOutcome`]: cancel, warn about misleading text, open externally,
//! or navigate to an in-app screen.
//!
//! ```
//! use linkpress::{
//!     Config, DefaultActionFlag, LinkEngine, NavigationAction, PressEvent, PressOutcome,
//! };
//!
//! let config = Config::from_json(r#"{
//!     "appHosts": ["bsky.app"],
//!     "routes": [{"screen": "Profile", "path": "/profile/:name"}]
//! }"#).unwrap();
//! let engine = LinkEngine::from_config(&config).unwrap();
//!
//! let link = engine.link("https://bsky.app/profile/alice");
//! let mut default = DefaultActionFlag::default();
//! let outcome = engine.resolve_press(&link, &PressEvent::primary(), &mut default, None);
//!
//! assert_eq!(outcome, PressOutcome::Navigate {
//!     action: NavigationAction::Push,
//!     href: "/profile/alice".to_string(),
//! });
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod file_finder;
pub mod link;
pub mod mismatch;
pub mod origin_classifier;
pub mod press_resolver;
pub mod route_matcher;
pub mod url_normalizer;

pub use config::{Config, RouteEntry, Surface};
pub use engine::{
    ExternalOpener, LinkEngine, Modal, ModalControls, NavigationDispatcher, NavigationRequest,
    ShareSheet,
};
pub use error::{LinkError, Result};
pub use link::{
    Link, LinkLabel, LinkTarget, LongPressOutcome, MismatchWarning, NavigationAction,
    PressOutcome, ResolvedLink, RouteDescriptor, RouteParams,
};
pub use origin_classifier::OriginClassifier;
pub use press_resolver::{
    DefaultAction, DefaultActionFlag, Intercept, Interceptor, Modifiers, PointerButton,
    PressEvent,
};
pub use route_matcher::{RouteMatch, RouteMatcher, RouteTable};
pub use url_normalizer::{BLANK_URL, UrlNormalizer};
