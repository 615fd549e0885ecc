//! # spark-vdom
//!
//! Declarative UI renderer with hooks.
//!
//! Describe the UI as an [`Element`] tree, hand it to a [`Root`], and the root
//! keeps a target [`Medium`] in sync with it. State changes never rebuild the
//! medium: each update renders a new pointer-addressed snapshot, diffs it
//! against the previous one and applies only the differences.
//!
//! ## Architecture
//!
//! ```text
//! Element -> Renderer -> Snapshot -> diff -> sort -> Patcher -> Medium
//!               ^                                        |
//!               +-- SlotManager (state, effects) <-------+-- effects after patch
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Element descriptions, props, events
//! - [`tree`] - Render pointers, render nodes, snapshots
//! - [`hooks`] - Per-component state and effect slots
//! - [`renderer`] - Render, diff, patch, property classification
//! - [`medium`] - Target medium trait and the in-memory document
//! - [`pipeline`] - Roots, update cycles, configuration
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```ignore
//! use spark_vdom::*;
//!
//! fn counter(cx: &mut Scope<'_>, _props: &Props) -> Element {
//!     let (count, set_count) = cx.declare_state(0);
//!     h("button")
//!         .on("onClick", move |_| set_count.update(|c| c + 1))
//!         .child(format!("Clicked {count} times"))
//!         .into()
//! }
//!
//! let mut doc = MemoryDocument::new();
//! let container = doc.create_container();
//! let root = create_root(doc, container);
//! root.render(Component::new(counter))?;
//! ```

pub mod error;
pub mod hooks;
pub mod medium;
pub mod pipeline;
pub mod renderer;
pub mod tree;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, PatchError, RenderError, Result};

pub use tree::{find_root_pointers, RenderNode, RenderPointer, Snapshot};

pub use hooks::{IntoCleanup, Scope, Setter, SlotManager, UpdateTrigger};

pub use renderer::{
    diff, render_root, sort_entries, Change, DiffEntry, DiffKind, NodeIndex, Patcher, PropChange,
    PropFlags,
};

pub use medium::{Medium, MemoryDocument, NodeId};

pub use pipeline::{create_root, create_root_with_config, Root, RootConfig};
