//! Platform collaborators the engine hands outcomes to.

use serde::Serialize;

use crate::link::{MismatchWarning, NavigationAction, RouteParams};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    pub action: NavigationAction,
    pub screen: String,
    pub params: RouteParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Modal {
    LinkWarning(MismatchWarning),
}

impl Modal {
    pub fn name(&self) -> &'static str {
        match self {
            Modal::LinkWarning(_) => "link-warning",
        }
    }
}

pub trait NavigationDispatcher {
    fn dispatch(&mut self, request: NavigationRequest);
}

pub trait ModalControls {
    fn open_modal(&mut self, modal: Modal);

    /// Close the active overlay. Must be a no-op when nothing is open.
    fn close_modal(&mut self);
}

/// Fire-and-forget handoff to the platform's URL opener.
pub trait ExternalOpener {
    fn open_url(&mut self, href: &str);
}

pub trait ShareSheet {
    fn share_url(&mut self, url: &str);
}
