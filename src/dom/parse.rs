//! HTML text -> [`Document`], using `scraper` (html5ever).
//!
//! html5ever already produces the `html > head + body` tree, decodes
//! entities and keeps `script`/`style` bodies raw; this module copies that
//! tree into the arena.

use scraper::{ElementRef, Html, Node};

use super::{Document, NodeId, NodeKind};

pub(super) fn parse_document(input: &str) -> Document {
    let html = Html::parse_document(input);

    let mut doc = Document::new();
    doc.doctype = html.tree.root().children().find_map(|child| match child.value() {
        Node::Doctype(doctype) => Some(format!("<!DOCTYPE {}>", doctype.name())),
        _ => None,
    });

    let (html_node, head, body) = (doc.html, doc.head, doc.body);
    let root = html.root_element();
    copy_attrs(&mut doc, root, html_node);
    for child in root.children() {
        let Some(section) = ElementRef::wrap(child) else {
            continue;
        };
        match section.value().name() {
            "head" => {
                copy_attrs(&mut doc, section, head);
                copy_children(&mut doc, section, head);
            }
            "body" | "frameset" => {
                copy_attrs(&mut doc, section, body);
                copy_children(&mut doc, section, body);
            }
            _ => {
                let node = convert(&mut doc, section);
                doc.link(body, node, None);
            }
        }
    }

    trim_gaps(&mut doc, head, true);
    trim_gaps(&mut doc, body, false);
    doc
}

fn copy_attrs(doc: &mut Document, from: ElementRef<'_>, to: NodeId) {
    for (name, value) in from.value().attrs() {
        let _ = doc.set_attr(to, name, value);
    }
}

fn copy_children(doc: &mut Document, from: ElementRef<'_>, to: NodeId) {
    for child in from.children() {
        let node = match child.value() {
            Node::Text(text) => doc.create_text(text),
            Node::Element(_) => match ElementRef::wrap(child) {
                Some(el) => convert(doc, el),
                None => continue,
            },
            // Comments and processing instructions are dropped
            _ => continue,
        };
        doc.link(to, node, None);
    }
}

/// Copy an element and its subtree into the arena (unattached).
fn convert(doc: &mut Document, el: ElementRef<'_>) -> NodeId {
    let node = doc.create_element(el.value().name());
    copy_attrs(doc, el, node);
    copy_children(doc, el, node);
    node
}

/// Drop the whitespace html5ever keeps at the edges of `head` and `body`
/// (all of it in `head`), so render -> parse is stable.
fn trim_gaps(doc: &mut Document, parent: NodeId, all: bool) {
    let children = doc.children(parent).to_vec();
    let blank = |doc: &Document, node: NodeId| {
        matches!(doc.kind(node), Some(NodeKind::Text(text)) if text.trim().is_empty())
    };
    let keep_from = children.iter().position(|&n| !blank(doc, n)).unwrap_or(children.len());
    let keep_to = children.iter().rposition(|&n| !blank(doc, n)).map_or(0, |i| i + 1);
    for (i, &node) in children.iter().enumerate() {
        if blank(doc, node) && (all || i < keep_from || i >= keep_to) {
            doc.unlink(node);
        }
    }
}
