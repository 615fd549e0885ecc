//! Render pointers - structural addresses inside a render tree.
//!
//! A pointer is the path of child indices from the root to a node:
//!
//! ```text
//! []        root element
//! [0]       first child slot of the root (or the output of a root component)
//! [0, 2]    third child slot of [0]
//! ```
//!
//! Descendant checks compare the integer sequences directly, so `[1, 2]` is
//! never mistaken for an ancestor of `[1, 20]`.

use std::fmt;

/// Path of child indices identifying a node's structural position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPointer(Vec<usize>);

impl RenderPointer {
    /// The root pointer `[]`.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a pointer from explicit indices.
    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// Pointer of child slot `index` below this one.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Pointer of the enclosing slot, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    /// Index of this pointer within its parent, `None` for the root.
    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` lies strictly below `ancestor`.
    ///
    /// Every pointer except the root itself descends from the root.
    pub fn is_descendant_of(&self, ancestor: &RenderPointer) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    /// True if `self` equals `other` or descends from it.
    pub fn is_within(&self, other: &RenderPointer) -> bool {
        self == other || self.is_descendant_of(other)
    }
}

impl fmt::Display for RenderPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for RenderPointer {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for RenderPointer {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

/// Reduce a set of pointers to the ones with no ancestor inside the set.
///
/// Removing only these roots removes every pointer of the set exactly once.
/// Order of first appearance is preserved.
pub fn find_root_pointers<'a, I>(pointers: I) -> Vec<RenderPointer>
where
    I: IntoIterator<Item = &'a RenderPointer>,
{
    let mut roots: Vec<RenderPointer> = Vec::new();
    for pointer in pointers {
        if roots.iter().any(|root| pointer.is_within(root)) {
            continue;
        }
        roots.retain(|root| !root.is_descendant_of(pointer));
        roots.push(pointer.clone());
    }
    roots
}

// =============================================================================
// Tests
// =============================================================================
