//! In-memory HTML document the engine enhances.
//!
//! An arena of nodes addressed by [`NodeId`]. The tree always carries an
//! `html > head + body` skeleton; those three nodes cannot be removed.
//!
//! # Module Structure
//!
//! ```text
//! dom/
//! ├── mod.rs       # Document, NodeId, ElementRef, mutation records (this file)
//! ├── parse.rs     # HTML text -> Document (scraper)
//! ├── render.rs    # Document -> HTML text
//! ├── selector.rs  # CSS selector subset
//! └── style.rs     # inline style attribute editing
//! ```
//!
//! Query helpers take selector strings. An invalid or unsupported selector
//! never fails the caller: it matches nothing.

mod parse;
mod render;
pub mod selector;
pub mod style;

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::engine::action::{Action, EventKind};
pub use selector::{SelectorError, SelectorList};

// ============================================================================
// Types
// ============================================================================

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot insert {child} into {parent}")]
    Hierarchy { parent: NodeId, child: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// A listener bound to an element: what to do when `event` reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub event: EventKind,
    pub action: Action,
}

impl Listener {
    pub fn new(event: EventKind, action: Action) -> Self {
        Self { event, action }
    }
}

#[derive(Debug, Clone)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    listeners: SmallVec<[Listener; 2]>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            listeners: SmallVec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attrs
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.attrs.len() < before
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Child-list change delivered to the mutation watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent that received the nodes.
    pub target: NodeId,
    /// Nodes added, in insertion order.
    pub added: SmallVec<[NodeId; 1]>,
}

#[derive(Debug, Clone)]
struct Observer {
    target: NodeId,
    recording: bool,
    queue: Vec<MutationRecord>,
}

/// Mutable HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    doctype: Option<String>,
    observer: Option<Observer>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Document {
    /// Empty document with the `html > head + body` skeleton.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: vec![Slot {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            html: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            doctype: Some("<!DOCTYPE html>".to_string()),
            observer: None,
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(doc.root, html, None);
        doc.link(html, head, None);
        doc.link(html, body, None);
        doc.html = html;
        doc.head = head;
        doc.body = body;
        doc
    }

    /// Parse HTML text. Never fails: unparseable input becomes body text.
    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    /// Serialize back to HTML text.
    pub fn to_html(&self) -> String {
        render::render_document(self)
    }

    /// Serialize a single node and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        render::render_node(self, node)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create an element with attributes in one go.
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attr(name, value);
        }
        self.alloc(NodeKind::Element(data))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }
}

// ============================================================================
// Navigation
// ============================================================================

impl Document {
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<html>` element.
    #[inline]
    pub fn document_element(&self) -> NodeId {
        self.html
    }

    #[inline]
    pub fn head(&self) -> NodeId {
        self.head
    }

    #[inline]
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Text of the first `<title>`, trimmed.
    pub fn title(&self) -> Option<String> {
        let title = self.query(self.head, "title")?;
        let text = self.text_content(title);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.0 < self.slots.len()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.slots.get(node.0).map(|slot| &slot.kind)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element(_)))
    }

    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        match self.kind(node)? {
            NodeKind::Element(data) => Some(ElementRef {
                doc: self,
                id: node,
                data,
            }),
            _ => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.data.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slots.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.slots
            .get(node.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// Ancestors from the parent upwards (exclusive).
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// Descendants in document order (exclusive).
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// The node followed by its descendants in document order.
    pub fn inclusive_descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![node],
        }
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is attached to the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    /// Connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.root)
            .find(|&n| self.attr(n, "id") == Some(id))
    }
}

/// Pre-order traversal iterator.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}

// ============================================================================
// Tree mutation
// ============================================================================

impl Document {
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert(parent, child, None)
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let first = self.children(parent).first().copied();
        self.insert(parent, child, first)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.insert(parent, child, Some(reference))
    }

    /// Detach a node from its parent. The skeleton cannot be removed.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        if [self.root, self.html, self.head, self.body].contains(&node) {
            return Err(DomError::Hierarchy {
                parent: self.parent(node).unwrap_or(self.root),
                child: node,
            });
        }
        self.unlink(node);
        Ok(())
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.check_element(node)?;
        for child in self.children(node).to_vec() {
            self.unlink(child);
        }
        let text = self.create_text(text);
        self.insert(node, text, None)
    }

    fn insert(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        let parent_ok = matches!(
            self.kind(parent),
            Some(NodeKind::Document | NodeKind::Element(_))
        );
        if !parent_ok
            || child == self.root
            || self.is_inclusive_ancestor(child, parent)
        {
            return Err(DomError::Hierarchy { parent, child });
        }

        self.unlink(child);
        self.link(parent, child, before);
        self.record(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let children = &mut self.slots[parent.0].children;
        let pos = before
            .and_then(|b| children.iter().position(|&c| c == b))
            .unwrap_or(children.len());
        children.insert(pos, child);
        self.slots[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.slots[node.0].parent.take() {
            self.slots[parent.0].children.retain(|&c| c != node);
        }
    }

    fn check(&self, node: NodeId) -> Result<(), DomError> {
        if self.contains_node(node) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(node))
        }
    }

    fn check_element(&self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        if self.is_element(node) {
            Ok(())
        } else {
            Err(DomError::NotAnElement(node))
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match self.slots.get_mut(node.0).map(|slot| &mut slot.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::UnknownNode(node)),
        }
    }
}

// ============================================================================
// Attributes, classes, inline style, text
// ============================================================================

impl Document {
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.data.attr(name)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> bool {
        self.element_mut(node)
            .map(|data| data.remove_attr(name))
            .unwrap_or(false)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.toggle_class(node, class, Some(true)).map(|_| ())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.toggle_class(node, class, Some(false)).map(|_| ())
    }

    /// Toggle a class, or force it on/off. Returns whether it is now present.
    pub fn toggle_class(
        &mut self,
        node: NodeId,
        class: &str,
        force: Option<bool>,
    ) -> Result<bool, DomError> {
        let data = self.element_mut(node)?;
        let mut classes: Vec<String> = data
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let present = classes.iter().any(|c| c == class);
        let want = force.unwrap_or(!present);

        if want == present {
            return Ok(present);
        }
        if want {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }

        if classes.is_empty() {
            data.remove_attr("class");
        } else {
            data.set_attr("class", &classes.join(" "));
        }
        Ok(want)
    }

    pub fn style(&self, node: NodeId, prop: &str) -> Option<String> {
        style::get(self.attr(node, "style")?, prop)
    }

    /// Set one inline style property; an empty value removes it.
    pub fn set_style(&mut self, node: NodeId, prop: &str, value: &str) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        let next = style::set(data.attr("style").unwrap_or_default(), prop, value);
        if next.is_empty() {
            data.remove_attr("style");
        } else {
            data.set_attr("style", &next);
        }
        Ok(())
    }

    /// Set several inline style properties in order.
    pub fn set_styles(&mut self, node: NodeId, decls: &[(&str, &str)]) -> Result<(), DomError> {
        for (prop, value) in decls {
            self.set_style(node, prop, value)?;
        }
        Ok(())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for n in self.inclusive_descendants(node) {
            if let Some(NodeKind::Text(text)) = self.kind(n) {
                out.push_str(text);
            }
        }
        out
    }
}

// ============================================================================
// Listeners
// ============================================================================

impl Document {
    pub fn add_listener(&mut self, node: NodeId, listener: Listener) -> Result<(), DomError> {
        self.element_mut(node)?.listeners.push(listener);
        Ok(())
    }

    pub fn listeners(&self, node: NodeId) -> &[Listener] {
        self.element(node)
            .map(|el| el.data.listeners.as_slice())
            .unwrap_or(&[])
    }

    /// Drop every listener on every element. Returns how many were removed.
    pub fn clear_listeners(&mut self) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            if let NodeKind::Element(data) = &mut slot.kind {
                removed += data.listeners.len();
                data.listeners.clear();
            }
        }
        removed
    }
}

// ============================================================================
// Selector queries
// ============================================================================

impl Document {
    fn compile(selector: &str) -> Option<SelectorList> {
        match SelectorList::parse(selector) {
            Ok(list) => Some(list),
            Err(e) => {
                crate::debug!("dom"; "ignoring selector `{}`: {}", selector, e);
                None
            }
        }
    }

    /// First matching descendant of `scope` (exclusive).
    pub fn query(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let list = Self::compile(selector)?;
        self.descendants(scope).find(|&n| list.matches(self, n))
    }

    /// All matching descendants of `scope` (exclusive), in document order.
    pub fn query_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(list) = Self::compile(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .filter(|&n| list.matches(self, n))
            .collect()
    }

    /// Like [`Document::query_all`], but `scope` itself may match.
    pub fn query_all_inclusive(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(list) = Self::compile(selector) else {
            return Vec::new();
        };
        self.inclusive_descendants(scope)
            .filter(|&n| list.matches(self, n))
            .collect()
    }

    pub fn count(&self, scope: NodeId, selector: &str) -> usize {
        let Some(list) = Self::compile(selector) else {
            return 0;
        };
        self.descendants(scope)
            .filter(|&n| list.matches(self, n))
            .count()
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        Self::compile(selector).is_some_and(|list| list.matches(self, node))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let list = Self::compile(selector)?;
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| list.matches(self, n))
    }
}

// ============================================================================
// Mutation observation
// ============================================================================

impl Document {
    /// Start recording child-list additions beneath `target`.
    pub fn observe(&mut self, target: NodeId) {
        self.observer = Some(Observer {
            target,
            recording: true,
            queue: Vec::new(),
        });
    }

    /// Stop recording and drop anything still queued.
    pub fn disconnect(&mut self) {
        self.observer = None;
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    /// Pause or resume recording. Returns the previous state.
    pub fn set_recording(&mut self, recording: bool) -> bool {
        match &mut self.observer {
            Some(observer) => std::mem::replace(&mut observer.recording, recording),
            None => false,
        }
    }

    /// Drain the pending batch.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observer
            .as_mut()
            .map(|observer| std::mem::take(&mut observer.queue))
            .unwrap_or_default()
    }

    fn record(&mut self, parent: NodeId, child: NodeId) {
        let Some(observer) = &self.observer else {
            return;
        };
        if !observer.recording || !self.is_inclusive_ancestor(observer.target, parent) {
            return;
        }

        let Some(observer) = &mut self.observer else {
            return;
        };
        match observer.queue.last_mut() {
            Some(last) if last.target == parent => last.added.push(child),
            _ => observer.queue.push(MutationRecord {
                target: parent,
                added: SmallVec::from_elem(child, 1),
            }),
        }
    }
}

// ============================================================================
// Element view
// ============================================================================

/// Borrowed view of an element.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &'a str {
        &self.data.tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.data.attr(name).is_some()
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.data
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.data.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn text(&self) -> String {
        self.doc.text_content(self.id)
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.data.tag)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
