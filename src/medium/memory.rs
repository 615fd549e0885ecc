//! In-memory document - a DOM-shaped arena used as the bundled medium.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Detached nodes are
//! never freed; a document lives as long as its root.
//!
//! Serialization is deterministic: attributes are written in name order, so
//! two documents holding the same tree produce the same HTML regardless of
//! the order mutations happened in.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::Medium;
use crate::types::{EventHandler, PropValue};

/// Handle of a node in a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        fields: BTreeMap<String, PropValue>,
        listeners: Vec<(String, EventHandler)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed node tree implementing [`Medium`].
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    mutations: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached `root` element to mount into.
    pub fn create_container(&mut self) -> NodeId {
        self.create_element("root")
    }

    /// Number of mutating calls made so far (creation excluded).
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn field(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { fields, .. } => fields.get(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        match self.nodes.get(node.0).map(|data| &data.kind) {
            Some(NodeKind::Element { listeners, .. }) => {
                listeners.iter().filter(|(name, _)| name == event).count()
            }
            _ => 0,
        }
    }

    /// Concatenated text of every text node below `node`, in tree order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// First element with `tag` below `node` (depth-first, `node` excluded).
    pub fn find_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.find_all_by_tag(node, tag).into_iter().next()
    }

    /// Every element with `tag` below `node`, in document order.
    pub fn find_all_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.tag(current) == Some(tag) {
                found.push(current);
            }
            stack.extend(self.child_ids(current).iter().rev().copied());
        }
        found
    }

    /// Serialize the children of `node` as HTML.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.child_ids(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize `node` itself as HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element { tag, attributes, .. } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                    }
                }
                out.push('>');
                for &child in &data.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn child_ids(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|data| data.children.as_slice())
            .unwrap_or_default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn element_mut(&mut self, node: NodeId) -> Option<ElementParts<'_>> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element {
                attributes,
                fields,
                listeners,
                ..
            } => Some(ElementParts {
                attributes,
                fields,
                listeners,
            }),
            NodeKind::Text(_) => None,
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(child.0).and_then(|data| data.parent) else {
            return;
        };
        if let Some(data) = self.nodes.get_mut(parent.0) {
            data.children.retain(|&c| c != child);
        }
        if let Some(data) = self.nodes.get_mut(child.0) {
            data.parent = None;
        }
    }
}

struct ElementParts<'a> {
    attributes: &'a mut BTreeMap<String, String>,
    fields: &'a mut BTreeMap<String, PropValue>,
    listeners: &'a mut Vec<(String, EventHandler)>,
}

impl Medium for MemoryDocument {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            fields: BTreeMap::new(),
            listeners: Vec::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if let Some(NodeKind::Text(current)) = self.nodes.get_mut(node.0).map(|d| &mut d.kind) {
            *current = text.to_string();
            self.mutations += 1;
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(parts) = self.element_mut(*node) {
            parts.attributes.insert(name.to_string(), value.to_string());
            self.mutations += 1;
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(parts) = self.element_mut(*node) {
            parts.attributes.remove(name);
            self.mutations += 1;
        }
    }

    fn set_field(&mut self, node: &NodeId, name: &str, value: &PropValue) {
        if let Some(parts) = self.element_mut(*node) {
            parts.fields.insert(name.to_string(), value.clone());
            self.mutations += 1;
        }
    }

    fn remove_field(&mut self, node: &NodeId, name: &str) {
        if let Some(parts) = self.element_mut(*node) {
            parts.fields.remove(name);
            self.mutations += 1;
        }
    }

    fn add_event_listener(&mut self, node: &NodeId, event: &str, handler: EventHandler) {
        if let Some(parts) = self.element_mut(*node) {
            parts.listeners.push((event.to_string(), handler));
            self.mutations += 1;
        }
    }

    fn remove_event_listener(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        if let Some(parts) = self.element_mut(*node) {
            let position = parts
                .listeners
                .iter()
                .position(|(name, bound)| name == event && bound.ptr_eq(handler));
            if let Some(position) = position {
                parts.listeners.remove(position);
                self.mutations += 1;
            }
        }
    }

    fn listeners(&self, node: &NodeId, event: &str) -> Vec<EventHandler> {
        match self.nodes.get(node.0).map(|data| &data.kind) {
            Some(NodeKind::Element { listeners, .. }) => listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, handler)| handler.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
        if self.nodes.get(parent.0).is_none() || self.nodes.get(child.0).is_none() {
            return;
        }
        self.detach(*child);

        let Some(data) = self.nodes.get_mut(parent.0) else {
            return;
        };
        let position = reference
            .and_then(|reference| data.children.iter().position(|c| c == reference))
            .unwrap_or(data.children.len());
        data.children.insert(position, *child);

        if let Some(data) = self.nodes.get_mut(child.0) {
            data.parent = Some(*parent);
        }
        self.mutations += 1;
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        let is_child = self
            .nodes
            .get(child.0)
            .is_some_and(|data| data.parent == Some(*parent));
        if is_child {
            self.detach(*child);
            self.mutations += 1;
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.child_ids(*node).to_vec()
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_build_and_serialize() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_container();
        let div = doc.create_element("div");
        let text = doc.create_text("a < b");
        doc.set_attribute(&div, "title", "say \"hi\"");
        doc.set_attribute(&div, "class", "box");
        doc.set_attribute(&div, "hidden", "");
        doc.append_child(&root, &div);
        doc.append_child(&div, &text);

        assert_eq!(
            doc.to_html(root),
            "<div class=\"box\" hidden title=\"say &quot;hi&quot;\">a &lt; b</div>"
        );
        assert_eq!(doc.outer_html(text), "a &lt; b");
        assert_eq!(doc.outer_html(root), format!("<root>{}</root>", doc.to_html(root)));
        assert_eq!(doc.text_content(root), "a < b");
        assert_eq!(doc.find_by_tag(root, "div"), Some(div));
        assert_eq!(doc.parent(&text), Some(div));
    }

    #[test]
    fn test_insert_before_and_move() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_container();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        let c = doc.create_text("c");
        doc.append_child(&root, &a);
        doc.append_child(&root, &c);
        doc.insert_before(&root, &b, Some(&c));
        assert_eq!(doc.to_html(root), "abc");

        doc.insert_before(&root, &c, Some(&a));
        assert_eq!(doc.to_html(root), "cab");
        assert_eq!(doc.children(&root).len(), 3);
    }

    #[test]
    fn test_remove_child_requires_parent() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_container();
        let other = doc.create_element("div");
        let a = doc.create_text("a");
        doc.append_child(&root, &a);

        doc.remove_child(&other, &a);
        assert_eq!(doc.to_html(root), "a");

        doc.remove_child(&root, &a);
        assert_eq!(doc.to_html(root), "");
        assert_eq!(doc.parent(&a), None);
    }

    #[test]
    fn test_listeners_by_identity() {
        let mut doc = MemoryDocument::new();
        let button = doc.create_element("button");
        let hits = Rc::new(Cell::new(0));
        let handler = {
            let hits = hits.clone();
            EventHandler::new(move |_| hits.set(hits.get() + 1))
        };

        doc.add_event_listener(&button, "click", handler.clone());
        assert_eq!(doc.listener_count(button, "click"), 1);
        for bound in doc.listeners(&button, "click") {
            bound.call(&Event::new("click"));
        }
        assert_eq!(hits.get(), 1);

        doc.remove_event_listener(&button, "click", &EventHandler::new(|_| {}));
        assert_eq!(doc.listener_count(button, "click"), 1);
        doc.remove_event_listener(&button, "click", &handler);
        assert_eq!(doc.listener_count(button, "click"), 0);
    }

    #[test]
    fn test_fields_are_not_serialized() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_container();
        let input = doc.create_element("input");
        doc.append_child(&root, &input);
        doc.set_field(&input, "value", &PropValue::from("typed"));

        assert_eq!(doc.to_html(root), "<input></input>");
        assert_eq!(doc.field(input, "value"), Some(&PropValue::from("typed")));
    }
}
