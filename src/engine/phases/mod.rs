//! Pipeline phases, each an `impl Engine` block.
//!
//! | Module     | Phase | Entry point                    |
//! |------------|-------|--------------------------------|
//! | `setup`    | 1     | `Engine::setup`                |
//! | `ui`       | 3     | `Engine::enhance_scoped`       |
//! | `optimize` | 4     | `Engine::optimize`             |
//! | `scaffold` | 5     | `Engine::scaffold`             |
//!
//! Phase 2 (theme) lives on the engine itself.

mod optimize;
mod scaffold;
mod setup;
mod ui;

pub(super) use scaffold::{NAVIGATION_CLASS, SCROLL_TOP_CLASS};
pub(super) use ui::FIELD_SELECTOR;

use crate::dom::{Document, NodeId};
use crate::marker::{self, Marker};

/// Whether `node` lies inside an element the engine generated.
pub(super) fn in_generated(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .any(|n| marker::has(doc, n, Marker::Generated))
}
