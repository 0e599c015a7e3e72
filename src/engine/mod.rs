//! The enhancement engine and its public lifecycle.
//!
//! # Module Structure
//!
//! ```text
//! engine/
//! ├── mod.rs       # Engine handle, lifecycle, events (this file)
//! ├── action.rs    # EventKind, Action, DispatchOutcome
//! ├── error.rs     # EngineError
//! ├── events.rs    # dispatch + host notifications (resize, scroll, prefs, mutations)
//! ├── validate.rs  # submit-time form validation
//! ├── phases/      # setup → ui → optimize → scaffold
//! └── tests.rs     # end-to-end scenarios
//! ```
//!
//! # Pipeline
//!
//! | Phase | Gate                    | Work                                      |
//! |-------|-------------------------|-------------------------------------------|
//! | 1     | always                  | style block, viewport meta, detection     |
//! | 2     | `darkMode != off`       | init or mode change: restore + resolve    |
//! | 3     | `autoStyle`             | controls, cards, forms, tables, images... |
//! | 4     | `autoOptimize`          | lazy images, scripts, motion, layout      |
//! | 5     | `create*`               | scroll-top, header, navigation, sidebar   |
//!
//! Every phase is idempotent, so `refresh` simply runs them again, all but
//! the theme decision. Mutations the engine makes itself are never recorded,
//! so only host changes come back through [`Engine::process_mutations`].

pub mod action;
mod error;
mod events;
mod phases;
mod validate;

#[cfg(test)]
mod tests;

pub use action::{Action, DispatchOutcome, EventKind, ScrollTarget};
pub use error::EngineError;

use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::config::{Options, PartialOptions};
use crate::detect::{FeatureSnapshot, detect};
use crate::dom::{Document, NodeId};
use crate::embed::css::STYLE_ID;
use crate::lazy::LazyLoadController;
use crate::platform::{Environment, Layout};
use crate::theme::DarkModeScheduler;
use crate::watch::PassSet;
use crate::{debug, log, logger, marker};

/// Attribute that suppresses [`auto_start`].
pub const MANUAL_ATTR: &str = "data-uac-manual";

/// Lifecycle notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Initialization completed.
    Ready {
        features: FeatureSnapshot,
        config: Options,
    },
    /// The mobile/desktop breakpoint was crossed.
    ResizeClassChanged { is_mobile: bool, is_tablet: bool },
    /// The root dark-mode class changed.
    ThemeChanged { dark: bool },
}

/// Handle owning the document being enhanced.
pub struct Engine {
    options: Options,
    doc: Document,
    env: Environment,
    features: FeatureSnapshot,
    initialized: bool,
    /// Window-level listeners (resize, scroll, preference) active.
    listening: bool,
    is_mobile: bool,
    theme: DarkModeScheduler,
    lazy: LazyLoadController,
    subscribers: Vec<Sender<EngineEvent>>,
}

impl Engine {
    pub fn new(options: Options, doc: Document, env: Environment) -> Self {
        let is_mobile = env.viewport.is_mobile();
        Self {
            options,
            doc,
            env,
            features: FeatureSnapshot::default(),
            initialized: false,
            listening: false,
            is_mobile,
            theme: DarkModeScheduler::new(),
            lazy: LazyLoadController::new(),
            subscribers: Vec::new(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Run the pipeline and start listening. A second call is a no-op with a
    /// warning; a failure is logged and leaves the engine uninitialized.
    pub fn init(&mut self) -> &mut Self {
        if self.initialized {
            log!("warning"; "already initialized");
            return self;
        }
        if self.options.debug {
            logger::set_verbose(true);
        }

        debug!("enhance"; "starting initialization");
        match self.quietly(Self::run_init) {
            Ok(()) => {
                // Opened after the quiet section so recording starts live
                self.start_listening();
                self.initialized = true;
                debug!("enhance"; "ready, {} features detected", self.features.detected());
                self.emit(EngineEvent::Ready {
                    features: self.features.clone(),
                    config: self.options.clone(),
                });
            }
            Err(e) => {
                self.stop_listening();
                log!("error"; "init failed: {}", e);
            }
        }
        self
    }

    fn run_init(&mut self) -> Result<(), EngineError> {
        // Persisted theme first so nothing renders in the wrong one
        self.theme
            .restore(&mut self.doc, self.env.storage.as_ref(), self.options.dark_mode)?;
        self.setup()?;
        self.apply_theme()?;
        self.run_passes()
    }

    /// Every phase but the theme decision; a toggled theme survives refresh.
    fn run_refresh(&mut self) -> Result<(), EngineError> {
        self.setup()?;
        self.run_passes()
    }

    /// Phases 3-5 over the whole document, then a snapshot that includes
    /// the generated controls.
    fn run_passes(&mut self) -> Result<(), EngineError> {
        if self.options.auto_style {
            let root = self.doc.root();
            self.enhance_scoped(root, PassSet::all())?;
        }
        if self.options.auto_optimize {
            self.optimize()?;
        }
        self.scaffold()?;
        self.detect();
        Ok(())
    }

    /// Re-detect and re-run every phase but the theme decision. Already
    /// enhanced elements are left alone by their markers.
    pub fn refresh(&mut self) {
        debug!("enhance"; "refresh");
        if let Err(e) = self.quietly(Self::run_refresh) {
            log!("error"; "refresh failed: {}", e);
        }
    }

    /// Run the UI passes over one subtree only.
    pub fn enhance_subtree(&mut self, root: NodeId) {
        if !self.doc.contains_node(root) {
            return;
        }
        if let Err(e) = self.quietly(|engine| engine.enhance_scoped(root, PassSet::all())) {
            log!("error"; "enhancing {} failed: {}", root, e);
        }
    }

    /// Merge `partial` into a new options record and refresh. Invalid
    /// options are rejected and the current ones kept.
    pub fn update_config(&mut self, partial: PartialOptions) {
        let next = self.options.merge(&partial);
        if let Err(e) = next.validate() {
            log!("error"; "rejected config update: {}", e);
            return;
        }
        if next.debug {
            logger::set_verbose(true);
        }
        let mode_changed = next.dark_mode != self.options.dark_mode;
        self.options = next;
        if mode_changed && let Err(e) = self.quietly(Self::apply_theme) {
            log!("error"; "theme update failed: {}", e);
        }
        self.refresh();
    }

    /// Disconnect every observer and listener, drop the style block, the
    /// generated controls and the idempotency markers. A later `init` builds
    /// everything again.
    pub fn destroy(&mut self) {
        self.stop_listening();
        self.doc.clear_listeners();

        if let Some(style) = self.doc.get_element_by_id(STYLE_ID)
            && let Err(e) = self.doc.remove(style)
        {
            log!("warning"; "could not remove style block: {}", e);
        }
        let removed = self.remove_generated();
        if removed > 0 {
            debug!("enhance"; "removed {} generated elements", removed);
        }
        let cleared = marker::clear_all(&mut self.doc);

        self.initialized = false;
        debug!("enhance"; "destroyed, {} elements unmarked", cleared);
    }

    /// Flip dark mode and persist the choice. Returns the new state.
    pub fn toggle_dark_mode(&mut self) -> bool {
        match self.theme.toggle(&mut self.doc, self.env.storage.as_ref()) {
            Ok(dark) => {
                self.emit(EngineEvent::ThemeChanged { dark });
                dark
            }
            Err(e) => {
                log!("error"; "toggle dark mode failed: {}", e);
                crate::theme::is_dark(&self.doc)
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Copy of the effective options.
    pub fn config(&self) -> Options {
        self.options.clone()
    }

    pub fn features(&self) -> &FeatureSnapshot {
        &self.features
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host-side access. Changes made here are recorded for
    /// [`Engine::process_mutations`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Receive lifecycle events from now on.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn emit(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Run `f` with mutation recording paused.
    fn quietly<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let was = self.doc.set_recording(false);
        let result = f(self);
        self.doc.set_recording(was);
        result
    }

    /// Detach every outermost generated element. Returns how many.
    fn remove_generated(&mut self) -> usize {
        let root = self.doc.root();
        let roots: Vec<NodeId> = self
            .doc
            .query_all(root, "[data-uac-generated]")
            .into_iter()
            .filter(|&n| {
                self.doc
                    .parent(n)
                    .is_none_or(|parent| !phases::in_generated(&self.doc, parent))
            })
            .collect();
        for &node in &roots {
            if let Err(e) = self.doc.remove(node) {
                log!("warning"; "could not remove generated element: {}", e);
            }
        }
        roots.len()
    }

    fn start_listening(&mut self) {
        self.listening = true;
        let body = self.doc.body();
        self.doc.observe(body);
    }

    fn stop_listening(&mut self) {
        self.listening = false;
        self.doc.disconnect();
        self.lazy.disconnect();
        self.theme.unsubscribe();
    }

    fn detect(&mut self) {
        self.features = detect(&self.doc, self.doc.root(), self.env.probe.as_ref());
    }

    fn layout(&self) -> Layout {
        self.env.geometry.layout(&self.doc)
    }

    fn apply_theme(&mut self) -> Result<(), EngineError> {
        let now = self.env.clock.now();
        let changed = self.theme.apply(
            &mut self.doc,
            self.env.storage.as_ref(),
            self.options.dark_mode,
            now,
            self.env.prefers_dark,
        )?;
        if let Some(dark) = changed {
            self.emit(EngineEvent::ThemeChanged { dark });
        }
        Ok(())
    }

    /// Promote deferred images that are now within reach.
    fn check_lazy(&mut self) -> Result<(), EngineError> {
        if !self.lazy.is_connected() || self.lazy.observed().is_empty() {
            return Ok(());
        }
        let layout = self.layout();
        let promoted = self.lazy.check(&mut self.doc, &self.env.viewport, &layout)?;
        if !promoted.is_empty() {
            debug!("enhance"; "loaded {} deferred images", promoted.len());
        }
        Ok(())
    }

    /// First `prefix-N` id not already in the document.
    fn unique_id(&self, prefix: &str, start: usize) -> String {
        (start..)
            .map(|n| format!("{prefix}-{n}"))
            .find(|id| self.doc.get_element_by_id(id).is_none())
            .unwrap_or_else(|| format!("{prefix}-{start}"))
    }

    /// Create an element under `parent` with attributes and inline styles.
    fn build(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        styles: &[(&str, &str)],
    ) -> Result<NodeId, EngineError> {
        let node = self.doc.create_element_with(tag, attrs);
        self.doc.set_styles(node, styles)?;
        self.doc.append_child(parent, node)?;
        Ok(node)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("initialized", &self.initialized)
            .field("listening", &self.listening)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Whether the document asks for manual initialization.
pub fn is_manual(doc: &Document) -> bool {
    doc.query(doc.root(), &format!("[{MANUAL_ATTR}]")).is_some()
}

/// Initialize an engine with default options unless the document opts out
/// with `data-uac-manual`.
pub fn auto_start(doc: Document, env: Environment) -> Engine {
    let manual = is_manual(&doc);
    let mut engine = Engine::new(Options::default(), doc, env);
    if manual {
        debug!("enhance"; "manual mode, skipping auto start");
    } else {
        engine.init();
    }
    engine
}
