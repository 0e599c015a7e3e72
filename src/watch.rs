//! Mutation batch planning.
//!
//! Turns one batch of [`MutationRecord`]s into a list of scoped passes: which
//! added subtree to revisit and which UI sub-passes apply to it. The whole
//! document is never revisited for a batch.

use crate::dom::{Document, MutationRecord, NodeId};

/// Controls the button sub-pass cares about.
pub const BUTTON_SELECTOR: &str = r#"button, input[type="button"], input[type="submit"], .btn"#;

/// UI sub-passes to run over a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSet {
    pub buttons: bool,
    pub cards: bool,
    pub forms: bool,
    pub tables: bool,
    pub images: bool,
    pub anchors: bool,
    pub toggles: bool,
}

impl PassSet {
    pub const fn all() -> Self {
        Self {
            buttons: true,
            cards: true,
            forms: true,
            tables: true,
            images: true,
            anchors: true,
            toggles: true,
        }
    }

    pub const fn is_empty(&self) -> bool {
        !(self.buttons
            || self.cards
            || self.forms
            || self.tables
            || self.images
            || self.anchors
            || self.toggles)
    }
}

/// One re-enhancement triggered by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedPass {
    pub root: NodeId,
    pub passes: PassSet,
}

/// Which sub-passes a newly added element needs.
pub fn passes_for(doc: &Document, node: NodeId) -> PassSet {
    let inclusive = |selector: &str| !doc.query_all_inclusive(node, selector).is_empty();
    let in_form = doc.closest(node, "form").is_some();

    PassSet {
        buttons: inclusive(BUTTON_SELECTOR),
        forms: inclusive("form")
            || (in_form && inclusive("input, textarea, select")),
        images: inclusive("img"),
        ..PassSet::default()
    }
}

/// Added element nodes of the batch, in order, without duplicates, without
/// nodes that are no longer connected, and without nodes whose ancestor was
/// added in the same batch.
pub fn added_roots(doc: &Document, records: &[MutationRecord]) -> Vec<NodeId> {
    let mut added: Vec<NodeId> = Vec::new();
    for node in records.iter().flat_map(|r| r.added.iter().copied()) {
        if doc.is_element(node) && doc.is_connected(node) && !added.contains(&node) {
            added.push(node);
        }
    }

    added
        .iter()
        .copied()
        .filter(|&node| {
            !added
                .iter()
                .any(|&other| other != node && doc.is_inclusive_ancestor(other, node))
        })
        .collect()
}

/// Plan the scoped passes for one batch. Text-only batches plan nothing.
pub fn plan(doc: &Document, records: &[MutationRecord]) -> Vec<ScopedPass> {
    added_roots(doc, records)
        .into_iter()
        .map(|root| ScopedPass {
            root,
            passes: passes_for(doc, root),
        })
        .filter(|scoped| !scoped.passes.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(doc: &mut Document, parent: NodeId, html: &str) -> Vec<MutationRecord> {
        let fragment = Document::parse(html);
        doc.observe(doc.body());
        graft(doc, &fragment, fragment.body(), parent);
        doc.take_records()
    }

    /// Copy `from`'s children under `to`, one insertion per top-level node.
    fn graft(doc: &mut Document, src: &Document, from: NodeId, to: NodeId) {
        for &child in src.children(from) {
            let copy = match src.element(child) {
                Some(el) => {
                    let attrs: Vec<(&str, &str)> = el.attrs().collect();
                    doc.create_element_with(el.tag(), &attrs)
                }
                None => doc.create_text(&src.text_content(child)),
            };
            graft(doc, src, child, copy);
            doc.append_child(to, copy).unwrap();
        }
    }

    #[test]
    fn test_single_button_plans_button_pass_only() {
        let mut doc = Document::parse("<div id=\"app\"></div>");
        let app = doc.get_element_by_id("app").unwrap();
        let records = batch(&mut doc, app, "<button>Save</button>");
        let plan = plan(&doc, &records);
        assert_eq!(plan.len(), 1);
        assert_eq!(doc.tag(plan[0].root), Some("button"));
        assert_eq!(
            plan[0].passes,
            PassSet {
                buttons: true,
                ..PassSet::default()
            }
        );
    }

    #[test]
    fn test_descendant_of_added_node_is_skipped() {
        let mut doc = Document::new();
        doc.observe(doc.body());
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        let button = doc.create_element("button");
        doc.append_child(div, button).unwrap();
        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert_eq!(added_roots(&doc, &records), vec![div]);
        assert!(passes_for(&doc, div).buttons);
    }

    #[test]
    fn test_subtree_passes_follow_content() {
        let mut doc = Document::new();
        let body = doc.body();
        let records = batch(
            &mut doc,
            body,
            r#"<section><form><input placeholder="Email"></form><img src="a.png"></section>"#,
        );
        let roots = added_roots(&doc, &records);
        assert_eq!(roots.len(), 1);
        let passes = passes_for(&doc, roots[0]);
        assert!(passes.forms && passes.images);
        assert!(!passes.buttons);
    }

    #[test]
    fn test_field_added_inside_form() {
        let mut doc = Document::parse("<form id=\"f\"></form>");
        let form = doc.get_element_by_id("f").unwrap();
        let records = batch(&mut doc, form, r#"<input placeholder="Name">"#);
        let plan = plan(&doc, &records);
        assert_eq!(plan.len(), 1);
        assert!(plan[0].passes.forms);
    }

    #[test]
    fn test_text_and_detached_nodes_are_ignored() {
        let mut doc = Document::new();
        doc.observe(doc.body());
        let text = doc.create_text("hello");
        doc.append_child(doc.body(), text).unwrap();
        let gone = doc.create_element("button");
        doc.append_child(doc.body(), gone).unwrap();
        doc.remove(gone).unwrap();
        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert!(plan(&doc, &records).is_empty());
    }

    #[test]
    fn test_plain_element_plans_nothing() {
        let mut doc = Document::new();
        let body = doc.body();
        let records = batch(&mut doc, body, "<p>just text</p>");
        assert!(plan(&doc, &records).is_empty());
    }
}
