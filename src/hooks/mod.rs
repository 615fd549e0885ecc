//! Hooks - persistent component memory.
//!
//! Component functions are plain functions; everything they remember between
//! renders lives in the [`SlotManager`], keyed by the component's render
//! pointer and the call order of its hooks:
//!
//! - [`Scope::declare_state`] - a value plus a [`Setter`] that schedules a new
//!   update cycle when the value actually changes
//! - [`Scope::declare_effect`] - a callback run after the patch step when its
//!   dependencies change, with optional cleanup
//!
//! # Rules
//!
//! Call hooks unconditionally and in the same order on every render. The slot
//! of a hook is its position in that order.

mod effects;
mod scope;
mod slots;

pub use effects::{EffectQueue, IntoCleanup, PendingEffect};
pub use scope::{Scope, Setter};
pub use slots::{HookSlots, SlotManager, UpdateTrigger};
