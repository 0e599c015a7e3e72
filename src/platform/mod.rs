//! The host environment the engine runs against.
//!
//! Everything a browser would answer implicitly (window size, media queries,
//! wall-clock time, `localStorage`, element rectangles, global library
//! symbols) is an explicit, swappable collaborator here.

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use chrono::{NaiveTime, Timelike};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::dom::{Document, NodeId};

/// Widths at or below this are mobile.
pub const MOBILE_MAX_WIDTH: u32 = 768;
/// Widths above mobile and at or below this are tablet.
pub const TABLET_MAX_WIDTH: u32 = 1024;

// ============================================================================
// Viewport
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Vertical scroll offset in CSS pixels.
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    pub const fn is_mobile(&self) -> bool {
        self.width <= MOBILE_MAX_WIDTH
    }

    pub const fn is_tablet(&self) -> bool {
        self.width > MOBILE_MAX_WIDTH && self.width <= TABLET_MAX_WIDTH
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveTime;

    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Clock stuck at one time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Clock at `hour:00`; out-of-range hours wrap into 0..24.
    pub fn at_hour(hour: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Vertical extent of an element, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Element rectangles for one document state.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rects: FxHashMap<NodeId, Rect>,
}

impl Layout {
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.rects.get(&node).copied()
    }

    pub fn insert(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Answers `getBoundingClientRect` for the engine.
pub trait Geometry {
    fn layout(&self, doc: &Document) -> Layout;
}

/// Estimates a single-column block flow from the markup alone.
///
/// Replaced elements use their `height` attribute (150px otherwise), headings
/// and text leaves get a line box, containers span their children.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowGeometry;

const FLOW_SKIP: &[&str] = &["head", "script", "style", "template", "noscript"];
const LINE_HEIGHT: f64 = 24.0;
const REPLACED_HEIGHT: f64 = 150.0;

impl FlowGeometry {
    fn place(&self, doc: &Document, node: NodeId, top: f64, layout: &mut Layout) -> f64 {
        let Some(tag) = doc.tag(node) else {
            return 0.0;
        };
        let hidden = FLOW_SKIP.contains(&tag)
            || doc.has_attr(node, "hidden")
            || doc.style(node, "display").as_deref() == Some("none");
        if hidden {
            layout.insert(node, Rect::new(top, 0.0));
            return 0.0;
        }

        let children: Vec<NodeId> = doc.element_children(node).collect();
        let height = if children.is_empty() {
            Self::leaf_height(doc, node, tag)
        } else {
            let mut cursor = top;
            for child in children {
                cursor += self.place(doc, child, cursor, layout);
            }
            cursor - top
        };

        layout.insert(node, Rect::new(top, height));
        height
    }

    fn leaf_height(doc: &Document, node: NodeId, tag: &str) -> f64 {
        match tag {
            "img" | "video" | "iframe" | "canvas" | "svg" => doc
                .attr(node, "height")
                .and_then(|h| h.trim().trim_end_matches("px").parse::<f64>().ok())
                .unwrap_or(REPLACED_HEIGHT),
            "h1" => 40.0,
            "h2" | "h3" | "h4" | "h5" | "h6" => 32.0,
            "input" | "button" | "select" | "textarea" => 40.0,
            "hr" => 1.0,
            "br" => 0.0,
            _ if !doc.text_content(node).trim().is_empty() => LINE_HEIGHT,
            _ => 0.0,
        }
    }
}

impl Geometry for FlowGeometry {
    fn layout(&self, doc: &Document) -> Layout {
        let mut layout = Layout::default();
        self.place(doc, doc.body(), 0.0, &mut layout);
        layout
    }
}

/// Explicit rectangles; anything not listed sits at the top.
#[derive(Debug, Clone, Default)]
pub struct FixedGeometry {
    rects: FxHashMap<NodeId, Rect>,
}

impl FixedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node: NodeId, rect: Rect) -> Self {
        self.rects.insert(node, rect);
        self
    }

    pub fn set(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }
}

impl Geometry for FixedGeometry {
    fn layout(&self, doc: &Document) -> Layout {
        let mut layout = Layout::default();
        for node in doc.descendants(doc.root()) {
            if doc.is_element(node) {
                let rect = self.rects.get(&node).copied().unwrap_or(Rect::new(0.0, 0.0));
                layout.insert(node, rect);
            }
        }
        layout
    }
}

// ============================================================================
// Capability probe
// ============================================================================

/// Third-party runtime libraries present on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub jquery: bool,
    pub react: bool,
    pub vue: bool,
}

pub trait CapabilityProbe {
    fn probe(&self, doc: &Document) -> Capabilities;
}

/// Infers libraries from `<script src>` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSourceProbe;

impl CapabilityProbe for ScriptSourceProbe {
    fn probe(&self, doc: &Document) -> Capabilities {
        let mut caps = Capabilities::default();
        for script in doc.query_all(doc.root(), "script[src]") {
            let src = doc.attr(script, "src").unwrap_or_default().to_ascii_lowercase();
            caps.jquery |= src.contains("jquery");
            caps.react |= src.contains("react");
            caps.vue |= src.contains("vue");
        }
        caps
    }
}

/// Always reports the same capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe(pub Capabilities);

impl CapabilityProbe for StaticProbe {
    fn probe(&self, _doc: &Document) -> Capabilities {
        self.0
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Everything the engine asks of its host.
pub struct Environment {
    pub viewport: Viewport,
    pub prefers_dark: bool,
    pub prefers_reduced_motion: bool,
    pub clock: Box<dyn Clock>,
    pub storage: Box<dyn Storage>,
    pub geometry: Box<dyn Geometry>,
    pub probe: Box<dyn CapabilityProbe>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            prefers_dark: false,
            prefers_reduced_motion: false,
            clock: Box::new(SystemClock),
            storage: Box::new(MemoryStorage::new()),
            geometry: Box::new(FlowGeometry),
            probe: Box::new(ScriptSourceProbe),
        }
    }
}

impl Environment {
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    pub fn with_prefers_dark(mut self, dark: bool) -> Self {
        self.prefers_dark = dark;
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.prefers_reduced_motion = reduced;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    pub fn with_geometry(mut self, geometry: impl Geometry + 'static) -> Self {
        self.geometry = Box::new(geometry);
        self
    }

    pub fn with_probe(mut self, probe: impl CapabilityProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("viewport", &self.viewport)
            .field("prefers_dark", &self.prefers_dark)
            .field("prefers_reduced_motion", &self.prefers_reduced_motion)
            .finish_non_exhaustive()
    }
}
