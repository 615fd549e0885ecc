//! Patch applier - mirrors sorted diff entries into the medium.
//!
//! The applier keeps a [`NodeIndex`] from render pointer to physical node.
//! Every pointer that has been materialized is recorded; components and
//! primitives that produce nothing are recorded with no node, so removal
//! can still find the physical nodes below them.
//!
//! Entries must arrive sorted (see [`sort_entries`](super::sort_entries)):
//! all removals run before any insertion, which keeps sibling scans from
//! seeing nodes that are about to disappear.
//!
//! [`Patcher::check`] validates every style the entries would write without
//! touching the medium. Run it before [`Patcher::apply`] to reject a cycle
//! whole instead of half-applied.

use std::collections::HashMap;

use super::diff::{Change, DiffEntry, PropChange};
use super::props::{check_prop, remove_prop, set_prop};
use crate::error::PatchError;
use crate::medium::Medium;
use crate::tree::{find_root_pointers, RenderNode, RenderPointer, Snapshot};
use crate::types::Primitive;

// =============================================================================
// Node Index
// =============================================================================

/// Render pointer -> physical node map.
#[derive(Debug)]
pub struct NodeIndex<N> {
    entries: HashMap<RenderPointer, Option<N>>,
}

impl<N> Default for NodeIndex<N> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<N> NodeIndex<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what `pointer` materialized to (`None` for nothing).
    pub fn record(&mut self, pointer: RenderPointer, node: Option<N>) {
        self.entries.insert(pointer, node);
    }

    /// Physical node at `pointer`, if it materialized to one.
    pub fn node(&self, pointer: &RenderPointer) -> Option<&N> {
        self.entries.get(pointer)?.as_ref()
    }

    pub fn contains(&self, pointer: &RenderPointer) -> bool {
        self.entries.contains_key(pointer)
    }

    /// Drop `pointer` and everything below it.
    pub fn purge(&mut self, pointer: &RenderPointer) {
        self.entries.retain(|key, _| !key.is_within(pointer));
    }

    pub fn pointers(&self) -> impl Iterator<Item = &RenderPointer> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Patcher
// =============================================================================

/// Applies one cycle's entries against the current tree.
pub struct Patcher<'a, M: Medium> {
    medium: &'a mut M,
    container: &'a M::Node,
    index: &'a mut NodeIndex<M::Node>,
    tree: &'a Snapshot,
    trace: bool,
}

impl<'a, M: Medium> Patcher<'a, M> {
    pub fn new(
        medium: &'a mut M,
        container: &'a M::Node,
        index: &'a mut NodeIndex<M::Node>,
        tree: &'a Snapshot,
    ) -> Self {
        Self {
            medium,
            container,
            index,
            tree,
            trace: false,
        }
    }

    /// Log every applied entry at trace level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Validate every style map the entries would write. Touches nothing.
    pub fn check(&self, entries: &[DiffEntry]) -> Result<(), PatchError> {
        for entry in entries {
            match &entry.change {
                Change::Added { .. } | Change::Replaced { .. } => {
                    self.check_subtree(&entry.pointer)?;
                }
                Change::PropertiesChanged(changes) => {
                    for (key, change) in changes {
                        if let PropChange::Updated { new, .. } = change {
                            check_prop(&*self.medium, &entry.pointer, key, new)?;
                        }
                    }
                }
                Change::Removed | Change::PrimitiveUpdated { .. } => {}
            }
        }
        Ok(())
    }

    fn check_subtree(&self, pointer: &RenderPointer) -> Result<(), PatchError> {
        match self.tree.get(pointer) {
            Some(RenderNode::Host {
                attributes,
                children,
                ..
            }) => {
                for (key, value) in attributes {
                    check_prop(&*self.medium, pointer, key, value)?;
                }
                for index in 0..*children {
                    self.check_subtree(&pointer.child(index))?;
                }
                Ok(())
            }
            Some(RenderNode::Component { .. }) => self.check_subtree(&pointer.child(0)),
            Some(RenderNode::Primitive(_)) | None => Ok(()),
        }
    }

    /// Apply sorted entries in order. Stops at the first failure; earlier
    /// mutations stay applied.
    pub fn apply(&mut self, entries: &[DiffEntry]) -> Result<(), PatchError> {
        for entry in entries {
            if self.trace {
                tracing::trace!(pointer = %entry.pointer, kind = ?entry.kind(), "patch");
            }
            let pointer = &entry.pointer;
            match &entry.change {
                Change::Removed => self.remove(pointer),
                Change::Added { parent, .. } => self.add(pointer, parent.as_ref())?,
                Change::Replaced { parent, .. } => {
                    self.remove(pointer);
                    self.add(pointer, parent.as_ref())?;
                }
                Change::PrimitiveUpdated { value } => self.update_primitive(pointer, value)?,
                Change::PropertiesChanged(changes) => self.update_properties(pointer, changes)?,
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    fn remove(&mut self, pointer: &RenderPointer) {
        if let Some(node) = self.index.node(pointer).cloned() {
            if let Some(parent) = self.medium.parent(&node) {
                self.medium.remove_child(&parent, &node);
            }
            self.index.purge(pointer);
            return;
        }

        // Nothing physical here; detach the topmost tracked nodes below.
        let below: Vec<RenderPointer> = self
            .index
            .pointers()
            .filter(|key| key.is_descendant_of(pointer))
            .cloned()
            .collect();
        for root in find_root_pointers(&below) {
            self.remove(&root);
        }
        self.index.purge(pointer);
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    fn add(
        &mut self,
        pointer: &RenderPointer,
        parent: Option<&RenderPointer>,
    ) -> Result<(), PatchError> {
        let parent_node = self.parent_node(pointer, parent)?;
        if let Some(node) = self.materialize(pointer)? {
            let reference = self.insertion_reference(pointer, parent, &parent_node);
            self.medium.insert_before(&parent_node, &node, reference.as_ref());
        }
        Ok(())
    }

    fn parent_node(
        &self,
        pointer: &RenderPointer,
        parent: Option<&RenderPointer>,
    ) -> Result<M::Node, PatchError> {
        match parent {
            None => Ok(self.container.clone()),
            Some(parent) => self.index.node(parent).cloned().ok_or_else(|| {
                PatchError::MissingParent {
                    pointer: pointer.clone(),
                    parent: parent.clone(),
                }
            }),
        }
    }

    /// Build the physical subtree for `pointer` from the current tree and
    /// record every pointer in it.
    fn materialize(&mut self, pointer: &RenderPointer) -> Result<Option<M::Node>, PatchError> {
        let tree = self.tree;
        let node = tree.get(pointer).ok_or_else(|| PatchError::MissingNode {
            pointer: pointer.clone(),
        })?;

        match node {
            RenderNode::Primitive(value) => {
                let text = value.to_text().map(|text| self.medium.create_text(&text));
                self.index.record(pointer.clone(), text.clone());
                Ok(text)
            }
            RenderNode::Component { .. } => {
                self.index.record(pointer.clone(), None);
                self.materialize(&pointer.child(0))
            }
            RenderNode::Host {
                tag,
                attributes,
                children,
            } => {
                let element = self.medium.create_element(tag);
                for (key, value) in attributes {
                    set_prop(&mut *self.medium, &element, pointer, key, None, value)?;
                }
                self.index.record(pointer.clone(), Some(element.clone()));
                for index in 0..*children {
                    if let Some(child) = self.materialize(&pointer.child(index))? {
                        self.medium.append_child(&element, &child);
                    }
                }
                Ok(Some(element))
            }
        }
    }

    /// First tracked node after `pointer`'s slot inside its parent host.
    fn insertion_reference(
        &self,
        pointer: &RenderPointer,
        parent: Option<&RenderPointer>,
        parent_node: &M::Node,
    ) -> Option<M::Node> {
        let parent = parent?;
        let slot = *pointer.indices().get(parent.depth())?;
        let count = self.tree.get(parent)?.child_count();

        (slot + 1..count).find_map(|sibling| {
            let resolved = self.tree.resolve(&parent.child(sibling))?;
            let node = self.index.node(&resolved)?;
            (self.medium.parent(node).as_ref() == Some(parent_node)).then(|| node.clone())
        })
    }

    // -------------------------------------------------------------------------
    // In-place updates
    // -------------------------------------------------------------------------

    fn update_primitive(
        &mut self,
        pointer: &RenderPointer,
        value: &Primitive,
    ) -> Result<(), PatchError> {
        match (self.index.node(pointer).cloned(), value.to_text()) {
            (Some(node), Some(text)) => self.medium.set_text(&node, &text),
            (Some(node), None) => {
                if let Some(parent) = self.medium.parent(&node) {
                    self.medium.remove_child(&parent, &node);
                }
                self.index.record(pointer.clone(), None);
            }
            (None, Some(_)) => {
                let parent = self.host_parent(pointer);
                self.add(pointer, parent.as_ref())?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn update_properties(
        &mut self,
        pointer: &RenderPointer,
        changes: &[(String, PropChange)],
    ) -> Result<(), PatchError> {
        let node = self
            .index
            .node(pointer)
            .cloned()
            .ok_or_else(|| PatchError::MissingNode {
                pointer: pointer.clone(),
            })?;

        for (key, change) in changes {
            match change {
                PropChange::Updated { old, new } => {
                    set_prop(&mut *self.medium, &node, pointer, key, old.as_ref(), new)?;
                }
                PropChange::Removed { old } => remove_prop(&mut *self.medium, &node, key, old),
            }
        }
        Ok(())
    }

    /// Nearest host ancestor of `pointer` in the current tree.
    fn host_parent(&self, pointer: &RenderPointer) -> Option<RenderPointer> {
        let mut current = pointer.parent()?;
        loop {
            if let Some(RenderNode::Host { .. }) = self.tree.get(&current) {
                return Some(current);
            }
            current = current.parent()?;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
