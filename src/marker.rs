//! Idempotency markers.
//!
//! Markers are attributes on the element itself, so they live and die with
//! it. Every one-time side effect checks [`has`] first and calls [`set`] last.

use crate::dom::{Document, DomError, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Control or card styling applied.
    Styled,
    /// Form, table, image or anchor enhanced.
    Enhanced,
    /// Submit validator bound to a form.
    Validated,
    /// Deferred image promoted.
    Loaded,
    /// Element created by the engine.
    Generated,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Self::Styled,
        Self::Enhanced,
        Self::Validated,
        Self::Loaded,
        Self::Generated,
    ];

    pub const fn attr(self) -> &'static str {
        match self {
            Self::Styled => "data-uac-styled",
            Self::Enhanced => "data-uac-enhanced",
            Self::Validated => "data-uac-validated",
            Self::Loaded => "data-loaded",
            Self::Generated => "data-uac-generated",
        }
    }
}

pub fn has(doc: &Document, node: NodeId, marker: Marker) -> bool {
    doc.has_attr(node, marker.attr())
}

/// Idempotent: setting twice is the same as setting once.
pub fn set(doc: &mut Document, node: NodeId, marker: Marker) -> Result<(), DomError> {
    if has(doc, node, marker) {
        return Ok(());
    }
    doc.set_attr(node, marker.attr(), "true")
}

/// Remove the pass markers (styled, enhanced, validated) from every element.
/// `data-loaded` and `data-uac-generated` describe content, not engine
/// bookkeeping, and stay. Returns how many elements were touched.
pub fn clear_all(doc: &mut Document) -> usize {
    let pass_markers = [Marker::Styled, Marker::Enhanced, Marker::Validated];
    let nodes: Vec<NodeId> = doc
        .descendants(doc.root())
        .filter(|&n| pass_markers.iter().any(|m| has(doc, n, *m)))
        .collect();
    for &node in &nodes {
        for marker in pass_markers {
            doc.remove_attr(node, marker.attr());
        }
    }
    nodes.len()
}
