//! Press resolution.
//!
//! Each press is one pass through a fixed priority order:
//!
//! 1. intercept says stop → [`PressOutcome::Cancelled`]
//! 2. label/target mismatch → [`PressOutcome::Warn`]
//! 3. external target or new-tab intent → [`PressOutcome::OpenExternal`]
//! 4. otherwise → [`PressOutcome::Navigate`]
//!
//! Nothing here touches a navigator or the platform; the caller executes the
//! outcome (see [`crate::LinkEngine::press`]).

use tracing::debug;

use crate::config::Surface;
use crate::link::{Link, LongPressOutcome, PressOutcome};
use crate::mismatch::detect_mismatch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.alt || self.ctrl || self.shift
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// An already-recognized press or click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressEvent {
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PressEvent {
    pub fn primary() -> Self {
        Self::default()
    }

    pub fn middle() -> Self {
        Self {
            button: PointerButton::Middle,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }
}

/// Verdict of a caller's pre-press hook. Only `Stop` cancels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intercept {
    #[default]
    Continue,
    Stop,
}

pub type Interceptor<'a> = dyn FnMut(&PressEvent) -> Intercept + 'a;

/// Handle for suppressing the platform's own link-following behavior.
pub trait DefaultAction {
    fn prevent_default(&mut self);
}

/// [`DefaultAction`] that just records whether it was prevented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultActionFlag {
    prevented: bool,
}

impl DefaultActionFlag {
    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

impl DefaultAction for DefaultActionFlag {
    fn prevent_default(&mut self) {
        self.prevented = true;
    }
}

/// Middle click, or primary click with a modifier held, on a pointer
/// surface. Hosts use this gesture for "open in new tab".
pub fn is_modifier_click(event: &PressEvent, surface: Surface) -> bool {
    if surface != Surface::Pointer {
        return false;
    }
    match event.button {
        PointerButton::Middle => true,
        PointerButton::Primary => event.modifiers.any(),
        PointerButton::Secondary => false,
    }
}

pub fn resolve_press(
    link: &Link,
    event: &PressEvent,
    surface: Surface,
    default: &mut dyn DefaultAction,
    intercept: Option<&mut Interceptor<'_>>,
) -> PressOutcome {
    if let Some(intercept) = intercept {
        if intercept(event) == Intercept::Stop {
            debug!(href = link.href(), "press cancelled by intercept");
            return PressOutcome::Cancelled;
        }
    }

    default.prevent_default();

    if let Some(warning) = detect_mismatch(link) {
        debug!(href = %warning.href, text = %warning.display_text, "link text mismatch");
        return PressOutcome::Warn(warning);
    }

    let href = link.href();
    let should_open_externally = link.is_external()
        || is_modifier_click(event, surface)
        || href.starts_with("http")
        || href.starts_with("mailto");

    if should_open_externally {
        debug!(href, "opening externally");
        PressOutcome::OpenExternal {
            href: href.to_string(),
        }
    } else {
        debug!(href, action = %link.action, "navigating");
        PressOutcome::Navigate {
            action: link.action,
            href: href.to_string(),
        }
    }
}

/// Long press shares the link, unless its text would mislead.
pub fn resolve_long_press(
    link: &Link,
    share_url: impl FnOnce(&str) -> String,
) -> LongPressOutcome {
    match detect_mismatch(link) {
        Some(warning) => LongPressOutcome::Warn(warning),
        None => LongPressOutcome::Share {
            url: share_url(link.href()),
        },
    }
}
