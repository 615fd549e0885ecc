//! Update pipeline
//!
//! Connects the renderer stages to a medium through a [`Root`].
//!
//! # Cycle
//!
//! ```text
//! Root::render / Setter::set
//!        |
//!        v
//! render_root -> diff -> sort_entries -> Patcher::apply -> clean_hooks
//!                                                             |
//!                               cleanups, then queued effects <+
//! ```
//!
//! ## Key Design Principles
//!
//! - **One owner**: a root owns its medium, snapshots, node index and slots
//! - **No nesting**: setters fired during a cycle schedule another pass
//! - **Effects last**: effects only see a medium that is fully patched

pub mod config;
pub mod root;

pub use config::{RootConfig, DEFAULT_MAX_UPDATE_PASSES};
pub use root::{create_root, create_root_with_config, Root};
