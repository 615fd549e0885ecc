//! Render nodes and pointer-addressed snapshots.
//!
//! A snapshot is the rendered tree of one pass. Each entry records only the
//! node itself; its child slots live at `pointer + [i]`:
//!
//! ```text
//! []      Component(App)
//! [0]     Host(div, children: 2)
//! [0, 0]  Primitive("Count: ")
//! [0, 1]  Host(button, children: 1)
//! [0, 1, 0] Primitive("+")
//! ```
//!
//! Components own exactly one child slot (`[0]`) holding their output and are
//! never materialized in the medium.

use std::collections::HashMap;

use super::pointer::RenderPointer;
use crate::types::{Attributes, ComponentId, Primitive};

/// One node of a render tree.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    Host {
        tag: String,
        attributes: Attributes,
        children: usize,
    },
    Component {
        component: ComponentId,
    },
    Primitive(Primitive),
}

impl RenderNode {
    /// Number of child slots below this node.
    pub fn child_count(&self) -> usize {
        match self {
            RenderNode::Host { children, .. } => *children,
            RenderNode::Component { .. } => 1,
            RenderNode::Primitive(_) => 0,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, RenderNode::Primitive(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, RenderNode::Component { .. })
    }

    /// True when both nodes have the same type: same tag, same component
    /// identity, or both primitive.
    pub fn same_type(&self, other: &RenderNode) -> bool {
        match (self, other) {
            (RenderNode::Host { tag: a, .. }, RenderNode::Host { tag: b, .. }) => a == b,
            (
                RenderNode::Component { component: a },
                RenderNode::Component { component: b },
            ) => a == b,
            (RenderNode::Primitive(_), RenderNode::Primitive(_)) => true,
            _ => false,
        }
    }
}

/// Pointer -> node mapping captured once per pass.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    nodes: HashMap<RenderPointer, RenderNode>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pointer: RenderPointer, node: RenderNode) {
        self.nodes.insert(pointer, node);
    }

    pub fn get(&self, pointer: &RenderPointer) -> Option<&RenderNode> {
        self.nodes.get(pointer)
    }

    pub fn contains(&self, pointer: &RenderPointer) -> bool {
        self.nodes.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn pointers(&self) -> impl Iterator<Item = &RenderPointer> {
        self.nodes.keys()
    }

    /// Follow component chains from `pointer` down to the first host or
    /// primitive node.
    ///
    /// Returns `None` if the chain runs into a missing slot.
    pub fn resolve(&self, pointer: &RenderPointer) -> Option<RenderPointer> {
        let mut current = pointer.clone();
        loop {
            match self.nodes.get(&current)? {
                RenderNode::Component { .. } => current = current.child(0),
                _ => return Some(current),
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
