//! Host notifications and event dispatch.
//!
//! These are the engine's asynchronous delivery points. Each one runs to
//! completion with recording paused, so nothing the engine does in response
//! shows up in the next mutation batch.

use super::phases::{NAVIGATION_CLASS, SCROLL_TOP_CLASS};
use super::{Action, DispatchOutcome, Engine, EngineError, EngineEvent, EventKind, ScrollTarget};
use crate::dom::{Listener, NodeId};
use crate::marker::{self, Marker};
use crate::{debug, log, watch};

/// Scroll offset past which the scroll-to-top control shows.
pub const SCROLL_TOP_THRESHOLD: f64 = 300.0;

const PARALLAX_ATTR: &str = "data-uac-parallax";
const DEFAULT_PARALLAX_SPEED: f64 = 0.5;

const VISIBLE_CLASS: &str = "visible";
const ACTIVE_CLASS: &str = "active";
const BACKDROP_CLASS: &str = "modal-backdrop";
const OVERLAY_CLASS: &str = "menu-overlay";
const FALLBACK_MENU: &str = ".mobile-menu";

impl Engine {
    // ========================================================================
    // Mutations
    // ========================================================================

    /// Drain the pending mutation batch and re-enhance only what was added.
    /// One full feature detection follows every batch that added elements.
    pub fn process_mutations(&mut self) {
        let records = self.doc.take_records();
        if !self.listening || records.is_empty() {
            return;
        }
        if watch::added_roots(&self.doc, &records).is_empty() {
            return;
        }

        let plan = watch::plan(&self.doc, &records);
        debug!("watch"; "{} records, {} scoped passes", records.len(), plan.len());

        if self.options.auto_style {
            let result = self.quietly(|engine| {
                for scoped in &plan {
                    engine.enhance_scoped(scoped.root, scoped.passes)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                log!("error"; "re-enhancement failed: {}", e);
            }
        }
        self.detect();
    }

    // ========================================================================
    // Window notifications
    // ========================================================================

    /// The viewport changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.env.viewport.width = width;
        self.env.viewport.height = height;
        if !self.listening {
            return;
        }
        if let Err(e) = self.quietly(Self::handle_resize) {
            log!("error"; "resize handling failed: {}", e);
        }
    }

    fn handle_resize(&mut self) -> Result<(), EngineError> {
        let is_mobile = self.env.viewport.is_mobile();
        if is_mobile != self.is_mobile {
            if self.options.responsive {
                self.apply_breakpoint_classes()?;
            } else {
                self.is_mobile = is_mobile;
            }
            self.emit(EngineEvent::ResizeClassChanged {
                is_mobile,
                is_tablet: self.env.viewport.is_tablet(),
            });
        }
        self.check_lazy()
    }

    /// The page scrolled to `y`.
    pub fn scroll_to(&mut self, y: f64) {
        self.env.viewport.scroll_y = y.max(0.0);
        if !self.listening {
            return;
        }
        if let Err(e) = self.quietly(Self::handle_scroll) {
            log!("error"; "scroll handling failed: {}", e);
        }
    }

    fn handle_scroll(&mut self) -> Result<(), EngineError> {
        let y = self.env.viewport.scroll_y;
        let root = self.doc.root();

        if let Some(button) = self.doc.query(root, &format!(".{SCROLL_TOP_CLASS}")) {
            self.doc
                .toggle_class(button, VISIBLE_CLASS, Some(y > SCROLL_TOP_THRESHOLD))?;
        }

        if self.options.auto_enhance {
            for el in self.doc.query_all(root, &format!("[{PARALLAX_ATTR}]")) {
                let speed = self
                    .doc
                    .attr(el, PARALLAX_ATTR)
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|s| s.is_finite() && *s != 0.0)
                    .unwrap_or(DEFAULT_PARALLAX_SPEED);
                // + 0.0 turns -0 into 0
                let offset = -(y * speed) + 0.0;
                self.doc
                    .set_style(el, "transform", &format!("translateY({offset}px)"))?;
            }
        }
        self.check_lazy()
    }

    /// The system colour-scheme preference changed.
    pub fn set_system_dark(&mut self, dark: bool) {
        self.env.prefers_dark = dark;
        if !self.listening {
            return;
        }
        let result = self.quietly(|engine| {
            let now = engine.env.clock.now();
            Ok(engine.theme.on_preference_change(
                &mut engine.doc,
                engine.env.storage.as_ref(),
                engine.options.dark_mode,
                now,
                dark,
            )?)
        });
        match result {
            Ok(Some(dark)) => self.emit(EngineEvent::ThemeChanged { dark }),
            Ok(None) => {}
            Err(e) => log!("error"; "theme update failed: {}", e),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Deliver `kind` to `target`. The event bubbles to the root; every
    /// matching listener on the way runs in order.
    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if !self.doc.is_connected(target) {
            return outcome;
        }

        let mut jobs: Vec<(NodeId, Action)> = Vec::new();
        for node in std::iter::once(target).chain(self.doc.ancestors(target)) {
            for listener in self.doc.listeners(node) {
                if listener.event == kind {
                    jobs.push((node, listener.action.clone()));
                }
            }
        }
        if jobs.is_empty() {
            return outcome;
        }

        let result = self.quietly(|engine| {
            for (node, action) in jobs {
                engine.run_action(node, action, &mut outcome)?;
            }
            Ok(())
        });
        if let Err(e) = result {
            log!("error"; "{} handler failed: {}", kind.name(), e);
        }
        outcome
    }

    fn run_action(
        &mut self,
        node: NodeId,
        action: Action,
        outcome: &mut DispatchOutcome,
    ) -> Result<(), EngineError> {
        match action {
            Action::ValidateOnSubmit => {
                if !self.validate_form(node)? {
                    outcome.default_prevented = true;
                }
            }
            Action::ClearInvalidOnInput => self.revalidate_field(node)?,
            Action::SmoothScroll => {
                let target = self
                    .doc
                    .attr(node, "href")
                    .and_then(|href| href.strip_prefix('#'))
                    .filter(|id| !id.is_empty())
                    .and_then(|id| self.doc.get_element_by_id(id));
                if let Some(target) = target {
                    outcome.default_prevented = true;
                    self.scroll_into_view(target, outcome)?;
                }
            }
            Action::ScrollToHeading { heading, nav } => {
                outcome.default_prevented = true;
                if self.doc.is_connected(heading) {
                    self.scroll_into_view(heading, outcome)?;
                }
                if self.doc.is_element(nav) {
                    self.doc.remove_class(nav, VISIBLE_CLASS)?;
                }
            }
            Action::ScrollToTop => {
                self.env.viewport.scroll_y = 0.0;
                outcome.scrolled_to = Some(ScrollTarget::Top);
                self.handle_scroll()?;
            }
            Action::ToggleTheme => {
                self.toggle_dark_mode();
            }
            Action::ToggleNavigation => {
                let root = self.doc.root();
                if let Some(nav) = self.doc.query(root, &format!(".{NAVIGATION_CLASS}")) {
                    self.doc.toggle_class(nav, VISIBLE_CLASS, None)?;
                }
            }
            Action::ToggleModal { target } => {
                outcome.default_prevented = true;
                self.toggle_modal(&target)?;
            }
            Action::ToggleMenu { target } => {
                outcome.default_prevented = true;
                self.toggle_menu(&target)?;
            }
            Action::DismissModal { modal } => {
                if self.doc.is_element(modal) {
                    self.doc.remove_class(modal, ACTIVE_CLASS)?;
                }
                self.doc.remove(node)?;
                self.lock_body_scroll(false)?;
            }
            Action::DismissMenu { menu } => {
                if self.doc.is_element(menu) {
                    self.doc.remove_class(menu, ACTIVE_CLASS)?;
                }
                self.doc.remove(node)?;
            }
        }
        Ok(())
    }

    fn scroll_into_view(
        &mut self,
        target: NodeId,
        outcome: &mut DispatchOutcome,
    ) -> Result<(), EngineError> {
        if let Some(rect) = self.layout().rect(target) {
            self.env.viewport.scroll_y = rect.top.max(0.0);
        }
        outcome.scrolled_to = Some(ScrollTarget::Element(target));
        self.handle_scroll()
    }

    // ========================================================================
    // Modals and menus
    // ========================================================================

    fn toggle_modal(&mut self, target: &str) -> Result<(), EngineError> {
        let Some(modal) = self.doc.get_element_by_id(target) else {
            debug!("enhance"; "modal #{} not found", target);
            return Ok(());
        };
        let open = self.doc.toggle_class(modal, ACTIVE_CLASS, None)?;
        let dismiss = Listener::new(EventKind::Click, Action::DismissModal { modal });
        self.set_shade(BACKDROP_CLASS, open, dismiss)?;
        self.lock_body_scroll(open)
    }

    fn toggle_menu(&mut self, target: &str) -> Result<(), EngineError> {
        let root = self.doc.root();
        let menu = self
            .doc
            .get_element_by_id(target)
            .or_else(|| self.doc.query(root, FALLBACK_MENU));
        let Some(menu) = menu else {
            debug!("enhance"; "menu #{} not found", target);
            return Ok(());
        };
        let open = self.doc.toggle_class(menu, ACTIVE_CLASS, None)?;
        let dismiss = Listener::new(EventKind::Click, Action::DismissMenu { menu });
        self.set_shade(OVERLAY_CLASS, open, dismiss)
    }

    /// Keep exactly one backdrop/overlay while open, none while closed.
    fn set_shade(&mut self, class: &str, open: bool, dismiss: Listener) -> Result<(), EngineError> {
        let body = self.doc.body();
        let existing = self.doc.query(body, &format!(".{class}"));
        match (existing, open) {
            (None, true) => {
                let shade = self.build(body, "div", &[("class", class)], &[("display", "block")])?;
                marker::set(&mut self.doc, shade, Marker::Generated)?;
                self.doc.add_listener(shade, dismiss)?;
            }
            (Some(shade), false) => self.doc.remove(shade)?,
            _ => {}
        }
        Ok(())
    }

    fn lock_body_scroll(&mut self, lock: bool) -> Result<(), EngineError> {
        let body = self.doc.body();
        self.doc
            .set_style(body, "overflow", if lock { "hidden" } else { "" })?;
        Ok(())
    }
}
