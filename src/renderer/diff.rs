//! Diff engine - compares two snapshots pointer by pointer.
//!
//! The diff never touches the medium. It walks both snapshots from the root
//! pointer and describes each difference as a [`DiffEntry`]:
//!
//! 1. slot only in current: `Added`, stop
//! 2. slot only in previous: `Removed`, stop
//! 3. different node type: `Replaced`, stop
//! 4. two primitives: `PrimitiveUpdated` if the values differ
//! 5. two hosts with the same tag: one `PropertiesChanged` bundling every
//!    changed key, then each child slot in turn
//! 6. two components with the same identity: their rendered child
//!
//! Entries come out in tree-walk order. [`sort_entries`] puts them in the
//! order the patch applier needs: every removal first, then additions,
//! replacements, text updates and property changes.

use crate::tree::{RenderNode, RenderPointer, Snapshot};
use crate::types::{Attributes, Primitive, PropValue};

// =============================================================================
// Entries
// =============================================================================

/// Change to a single property key.
#[derive(Clone, Debug, PartialEq)]
pub enum PropChange {
    /// Key is new or its value changed.
    Updated {
        old: Option<PropValue>,
        new: PropValue,
    },
    /// Key is gone from the current node.
    Removed { old: PropValue },
}

/// What changed at one pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Removed,
    Added {
        parent: Option<RenderPointer>,
        node: RenderNode,
    },
    Replaced {
        parent: Option<RenderPointer>,
        old: RenderNode,
        new: RenderNode,
    },
    PrimitiveUpdated {
        value: Primitive,
    },
    PropertiesChanged(Vec<(String, PropChange)>),
}

impl Change {
    pub fn kind(&self) -> DiffKind {
        match self {
            Change::Removed => DiffKind::Removed,
            Change::Added { .. } => DiffKind::Added,
            Change::Replaced { .. } => DiffKind::Replaced,
            Change::PrimitiveUpdated { .. } => DiffKind::PrimitiveUpdated,
            Change::PropertiesChanged(_) => DiffKind::PropertiesChanged,
        }
    }
}

/// Change kind; the derived order is the application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffKind {
    Removed,
    Added,
    Replaced,
    PrimitiveUpdated,
    PropertiesChanged,
}

/// One described change between two snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffEntry {
    pub pointer: RenderPointer,
    pub change: Change,
}

impl DiffEntry {
    pub fn kind(&self) -> DiffKind {
        self.change.kind()
    }
}

// =============================================================================
// Diff
// =============================================================================

/// Describe how to turn `previous` into `current`.
pub fn diff(current: &Snapshot, previous: &Snapshot) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    walk(current, previous, RenderPointer::root(), None, &mut entries);
    entries
}

/// Stable sort into application order.
pub fn sort_entries(entries: &mut [DiffEntry]) {
    entries.sort_by_key(DiffEntry::kind);
}

fn walk(
    current: &Snapshot,
    previous: &Snapshot,
    pointer: RenderPointer,
    parent: Option<&RenderPointer>,
    out: &mut Vec<DiffEntry>,
) {
    let (now, before) = match (current.get(&pointer), previous.get(&pointer)) {
        (None, None) => return,
        (Some(node), None) => {
            out.push(DiffEntry {
                pointer,
                change: Change::Added {
                    parent: parent.cloned(),
                    node: node.clone(),
                },
            });
            return;
        }
        (None, Some(_)) => {
            out.push(DiffEntry {
                pointer,
                change: Change::Removed,
            });
            return;
        }
        (Some(now), Some(before)) => (now, before),
    };

    if !now.same_type(before) {
        out.push(DiffEntry {
            pointer,
            change: Change::Replaced {
                parent: parent.cloned(),
                old: before.clone(),
                new: now.clone(),
            },
        });
        return;
    }

    match (now, before) {
        (RenderNode::Primitive(value), RenderNode::Primitive(old)) => {
            if value != old {
                out.push(DiffEntry {
                    pointer,
                    change: Change::PrimitiveUpdated {
                        value: value.clone(),
                    },
                });
            }
        }
        (
            RenderNode::Host {
                attributes,
                children,
                ..
            },
            RenderNode::Host {
                attributes: old_attributes,
                children: old_children,
                ..
            },
        ) => {
            let changes = diff_attributes(attributes, old_attributes);
            if !changes.is_empty() {
                out.push(DiffEntry {
                    pointer: pointer.clone(),
                    change: Change::PropertiesChanged(changes),
                });
            }

            for index in 0..(*children).max(*old_children) {
                let child = pointer.child(index);
                if index >= *children {
                    out.push(DiffEntry {
                        pointer: child,
                        change: Change::Removed,
                    });
                } else {
                    walk(current, previous, child, Some(&pointer), out);
                }
            }
        }
        (RenderNode::Component { .. }, RenderNode::Component { .. }) => {
            walk(current, previous, pointer.child(0), parent, out);
        }
        _ => {}
    }
}

/// Per-key changes between two property maps, current keys first.
fn diff_attributes(current: &Attributes, previous: &Attributes) -> Vec<(String, PropChange)> {
    let mut changes = Vec::new();

    for (key, value) in current {
        let old = previous.get(key);
        if old != Some(value) {
            changes.push((
                key.clone(),
                PropChange::Updated {
                    old: old.cloned(),
                    new: value.clone(),
                },
            ));
        }
    }
    for (key, old) in previous {
        if !current.contains_key(key) {
            changes.push((key.clone(), PropChange::Removed { old: old.clone() }));
        }
    }
    changes
}

// =============================================================================
// Tests
// =============================================================================
