//! Slot manager - persistent per-pointer hook memory.
//!
//! Each component pointer owns an ordered arena of state cells and one of
//! effect cells. A cell is found by its call-order index inside the
//! component, so a component must call `declare_state` / `declare_effect`
//! the same number of times in the same order on every render. That rule is
//! not enforced: breaking it misaligns slots (a slot whose stored type no
//! longer matches is re-initialized with a warning).
//!
//! ```text
//! slots[[0, 1]] = { states: [count, open], effects: [title_effect] }
//! slots[[0, 2]] = { states: [draft],       effects: [] }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::rc::Weak;

use super::effects::{EffectQueue, EffectSlot};
use super::scope::Scope;
use crate::tree::RenderPointer;
use crate::types::Cleanup;

// =============================================================================
// Update Trigger
// =============================================================================

/// Receiver of "state changed, run another cycle" requests.
pub trait UpdateTrigger {
    fn request_update(&self);
}

/// Trigger used when no root is attached; requests go nowhere.
struct Detached;

impl UpdateTrigger for Detached {
    fn request_update(&self) {}
}

// =============================================================================
// Cells
// =============================================================================

/// Type-erased `Setter<T>`; the setter owns the value cell.
pub(crate) struct StateCell(pub(crate) Box<dyn Any>);

/// Ordered hook arenas of one pointer.
#[derive(Default)]
pub struct HookSlots {
    pub(crate) states: Vec<StateCell>,
    pub(crate) effects: Vec<EffectSlot>,
}

impl HookSlots {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Take every outstanding effect cleanup out of this arena.
    fn take_cleanups(self) -> impl Iterator<Item = Cleanup> {
        self.effects.into_iter().filter_map(|slot| {
            let cleanup = slot.borrow_mut().cleanup.take();
            cleanup
        })
    }
}

// =============================================================================
// Slot Manager
// =============================================================================

/// Owner of every hook arena of one root.
pub struct SlotManager {
    slots: HashMap<RenderPointer, HookSlots>,
    queue: EffectQueue,
    discarded: Vec<Cleanup>,
    trigger: Weak<dyn UpdateTrigger>,
}

impl SlotManager {
    /// Create a manager whose setters notify `trigger`.
    pub fn new(trigger: Weak<dyn UpdateTrigger>) -> Self {
        Self {
            slots: HashMap::new(),
            queue: EffectQueue::new(),
            discarded: Vec::new(),
            trigger,
        }
    }

    /// Create a manager whose setters notify nobody.
    pub fn detached() -> Self {
        let trigger: Weak<dyn UpdateTrigger> = Weak::<Detached>::new();
        Self::new(trigger)
    }

    /// Open the render context for the component at `pointer`.
    ///
    /// On a first render (new pointer or new identity at the pointer) any old
    /// arena is dropped and its effect cleanups are kept for the end of the
    /// cycle.
    pub fn begin_scope(&mut self, pointer: &RenderPointer, is_first_render: bool) -> Scope<'_> {
        if is_first_render {
            if let Some(old) = self.slots.remove(pointer) {
                self.discarded.extend(old.take_cleanups());
            }
        }
        let slots = self.slots.entry(pointer.clone()).or_default();
        Scope::new(pointer.clone(), slots, &mut self.queue, &self.trigger)
    }

    /// Unmount sweep: drop the arenas of every pointer that is no longer
    /// mounted and hand back all cleanups that must now run.
    ///
    /// Cleanups from identity resets during the pass come first.
    pub fn clean_hooks(
        &mut self,
        is_still_mounted: impl Fn(&RenderPointer) -> bool,
    ) -> Vec<Cleanup> {
        let mut cleanups = std::mem::take(&mut self.discarded);

        let mut unmounted: Vec<RenderPointer> = self
            .slots
            .keys()
            .filter(|pointer| !is_still_mounted(pointer))
            .cloned()
            .collect();
        unmounted.sort();

        for pointer in unmounted {
            if let Some(slots) = self.slots.remove(&pointer) {
                tracing::trace!(%pointer, "dropping hook slots");
                cleanups.extend(slots.take_cleanups());
            }
        }
        cleanups
    }

    /// Take the effects queued during the last pass.
    pub fn take_pending(&mut self) -> EffectQueue {
        std::mem::take(&mut self.queue)
    }

    /// Forget effects queued by an aborted pass.
    pub fn discard_pending(&mut self) {
        self.queue.clear();
    }

    pub fn pending_effects(&self) -> usize {
        self.queue.len()
    }

    pub fn slots(&self, pointer: &RenderPointer) -> Option<&HookSlots> {
        self.slots.get(pointer)
    }

    pub fn has_slots(&self, pointer: &RenderPointer) -> bool {
        self.slots.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
