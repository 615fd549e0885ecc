//! Error types.
//!
//! Render and patch errors abort the current update cycle. Nothing is rolled
//! back: the medium keeps whatever mutations were applied before the failure.

use thiserror::Error;

use crate::tree::RenderPointer;

/// Failure while turning element descriptions into render nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A host element whose tag is not a usable tag identifier.
    #[error("element at {pointer} has no usable type (tag {tag:?})")]
    UntypedElement { pointer: RenderPointer, tag: String },
}

/// Failure while mutating the medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The medium rejected a style name/value pair.
    #[error("invalid style `{name}: {value}` at {pointer}")]
    InvalidStyle {
        pointer: RenderPointer,
        name: String,
        value: String,
    },

    /// A node's parent host has no physical node to attach to.
    #[error("parent {parent} of {pointer} is not materialized")]
    MissingParent {
        pointer: RenderPointer,
        parent: RenderPointer,
    },

    /// A diff entry refers to a pointer absent from the current tree.
    #[error("no render node at {pointer}")]
    MissingNode { pointer: RenderPointer },
}

/// Top-level error of an update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    /// State kept changing for more back-to-back cycles than allowed.
    #[error("state did not settle after {passes} update passes")]
    UpdateLoop { passes: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
