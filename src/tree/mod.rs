//! Render tree - pointers, nodes and snapshots.
//!
//! Every rendered node is addressed by a [`RenderPointer`], the path of child
//! indices from the root. A [`Snapshot`] maps pointers to [`RenderNode`]s for
//! one render pass; the pipeline keeps the previous snapshot to diff against.

mod pointer;
mod snapshot;

pub use pointer::*;
pub use snapshot::*;
