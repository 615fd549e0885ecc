//! Renderer pipeline stages.
//!
//! One update cycle flows through these in order:
//!
//! ```text
//! Element --render--> Snapshot --diff--> Vec<DiffEntry> --sort--> Patcher --> Medium
//!                        |                   ^
//!                        +--- previous ------+
//! ```
//!
//! - [`render`] - element descriptions to a pointer-addressed [`Snapshot`](crate::tree::Snapshot)
//! - [`diff`] - snapshot comparison and application order
//! - [`patch`] - physical node index and medium mutation
//! - [`props`] - how property keys reach the medium

mod diff;
mod patch;
mod props;
mod render;

pub use diff::{diff, sort_entries, Change, DiffEntry, DiffKind, PropChange};
pub use patch::{NodeIndex, Patcher};
pub use props::{
    attribute_name, check_prop, classify, event_name, remove_prop, serialize_style, set_prop,
    PropFlags,
};
pub use render::{render_root, Renderer};
