//! Target medium - the live node tree kept in sync with the render tree.
//!
//! The patch applier only talks to the medium through the [`Medium`] trait,
//! so any tree that can create nodes, edit attributes/text/listeners and
//! insert/remove children can be driven. [`MemoryDocument`] is the bundled
//! in-memory implementation.

mod memory;

pub use memory::{MemoryDocument, NodeId};

use std::fmt;

use crate::types::{EventHandler, PropValue};

/// Contract the patch applier depends on.
pub trait Medium {
    /// Handle to one physical node.
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&mut self, tag: &str) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;
    fn set_text(&mut self, node: &Self::Node, text: &str);

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Assign a direct field on the node (e.g. an input's live `value`).
    fn set_field(&mut self, node: &Self::Node, name: &str, value: &PropValue);
    fn remove_field(&mut self, node: &Self::Node, name: &str);

    fn add_event_listener(&mut self, node: &Self::Node, event: &str, handler: EventHandler);
    fn remove_event_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Handlers currently bound for `event` on `node`, in binding order.
    fn listeners(&self, node: &Self::Node, event: &str) -> Vec<EventHandler>;

    /// Insert `child` into `parent` before `reference`, or append when
    /// `reference` is `None`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    );
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) {
        self.insert_before(parent, child, None);
    }

    /// Whether the medium can represent the style pair `name: value`.
    fn accepts_style(&self, name: &str, value: &str) -> bool {
        is_valid_style(name, value)
    }
}

/// Default style validation: a dashed identifier name and a non-empty value
/// that cannot break out of the declaration.
pub fn is_valid_style(name: &str, value: &str) -> bool {
    let name_ok = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let value_ok = !value.trim().is_empty()
        && !value.contains([';', '{', '}', '<', '>', '\n', '\r']);
    name_ok && value_ok
}
