//! Event kinds and the actions bound to them.
//!
//! Listeners are plain data stored on elements. The engine interprets the
//! action when an event is dispatched, so detaching everything is a matter of
//! clearing those lists.

use crate::dom::NodeId;

/// Events the host can deliver to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
}

impl EventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Input => "input",
        }
    }
}

/// Behaviour attached by an enhancement pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Check required fields of the form; block submission when any is empty.
    ValidateOnSubmit,
    /// Clear the invalid state once the field has a value.
    ClearInvalidOnInput,
    /// Smooth-scroll to the element named by the anchor's `href` fragment.
    SmoothScroll,
    /// Scroll to a generated navigation target and close the navigation.
    ScrollToHeading { heading: NodeId, nav: NodeId },
    ScrollToTop,
    ToggleTheme,
    /// Toggle `visible` on the generated navigation.
    ToggleNavigation,
    /// Toggle the modal with this id.
    ToggleModal { target: String },
    /// Toggle the menu with this id (falls back to `.mobile-menu`).
    ToggleMenu { target: String },
    /// Backdrop click: close the modal and drop the backdrop.
    DismissModal { modal: NodeId },
    /// Overlay click: close the menu and drop the overlay.
    DismissMenu { menu: NodeId },
}

/// Where a dispatched event asked the viewport to scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Element(NodeId),
}

/// Result of [`Engine::dispatch`](super::Engine::dispatch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// A listener cancelled the default browser action (navigation, submit).
    pub default_prevented: bool,
    pub scrolled_to: Option<ScrollTarget>,
}
