//! Render context handed to component functions.
//!
//! A [`Scope`] is bound to one component pointer for the duration of one
//! render of that component. It carries the pointer's hook arenas and two
//! call-order counters, one for state and one for effects.
//!
//! # Example
//!
//! ```ignore
//! fn counter(cx: &mut Scope<'_>, _props: &Props) -> Element {
//!     let (count, set_count) = cx.declare_state(0);
//!
//!     cx.declare_effect(
//!         move || println!("count is now {count}"),
//!         vec![count],
//!     );
//!
//!     h("button")
//!         .on("onClick", move |_| set_count.update(|c| c + 1))
//!         .child(count)
//!         .into()
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::effects::{EffectQueue, EffectSlot, IntoCleanup, PendingEffect};
use super::slots::{HookSlots, StateCell, UpdateTrigger};
use crate::tree::RenderPointer;

// =============================================================================
// Setter
// =============================================================================

/// Handle that replaces the value of one state cell.
///
/// The same setter (shared identity) is returned on every render of the
/// owning component.
pub struct Setter<T> {
    value: Rc<RefCell<T>>,
    trigger: Weak<dyn UpdateTrigger>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            trigger: self.trigger.clone(),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setter({:p})", Rc::as_ptr(&self.value))
    }
}

impl<T: PartialEq + 'static> Setter<T> {
    /// Replace the value.
    pub fn set(&self, next: T) {
        self.update(move |_| next);
    }

    /// Compute the next value from the previous one.
    ///
    /// Equal values (by `PartialEq`, so deep for derived types) are dropped
    /// without scheduling a cycle.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = {
            let current = self.value.borrow();
            f(&current)
        };
        if *self.value.borrow() == next {
            return;
        }
        *self.value.borrow_mut() = next;

        if let Some(trigger) = self.trigger.upgrade() {
            trigger.request_update();
        }
    }

    /// Current stored value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }
}

impl<T> Setter<T> {
    pub fn ptr_eq(&self, other: &Setter<T>) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Render context of the component currently rendering.
pub struct Scope<'a> {
    pointer: RenderPointer,
    slots: &'a mut HookSlots,
    queue: &'a mut EffectQueue,
    trigger: &'a Weak<dyn UpdateTrigger>,
    state_index: usize,
    effect_index: usize,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        pointer: RenderPointer,
        slots: &'a mut HookSlots,
        queue: &'a mut EffectQueue,
        trigger: &'a Weak<dyn UpdateTrigger>,
    ) -> Self {
        Self {
            pointer,
            slots,
            queue,
            trigger,
            state_index: 0,
            effect_index: 0,
        }
    }

    /// Pointer of the component this scope belongs to.
    pub fn pointer(&self) -> &RenderPointer {
        &self.pointer
    }

    /// Declare a state cell initialized with `initial` on first render.
    ///
    /// Later renders return the stored value and the same setter.
    pub fn declare_state<T>(&mut self, initial: T) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        self.declare_state_with(move || initial)
    }

    /// Lazy form of [`Scope::declare_state`]: `init` only runs when the cell
    /// is created.
    pub fn declare_state_with<T, F>(&mut self, init: F) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
        F: FnOnce() -> T,
    {
        let index = self.state_index;
        self.state_index += 1;

        if let Some(cell) = self.slots.states.get(index) {
            if let Some(setter) = cell.0.downcast_ref::<Setter<T>>() {
                return (setter.get(), setter.clone());
            }
            tracing::warn!(
                pointer = %self.pointer,
                index,
                "state slot changed type between renders; hook order is not stable"
            );
        }

        let setter = Setter {
            value: Rc::new(RefCell::new(init())),
            trigger: self.trigger.clone(),
        };
        let cell = StateCell(Box::new(setter.clone()));
        if index < self.slots.states.len() {
            self.slots.states[index] = cell;
        } else {
            self.slots.states.push(cell);
        }
        (setter.get(), setter)
    }

    /// Declare an effect that runs after the patch step of this cycle.
    ///
    /// The callback is scheduled on first render and whenever `deps` differs
    /// from the previous render's `deps`. Before it runs, the cleanup left by
    /// its previous run is invoked. Returning a closure from the callback sets
    /// the new cleanup; returning `()` leaves none.
    pub fn declare_effect<D, F, C>(&mut self, callback: F, deps: D)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> C + 'static,
        C: IntoCleanup,
    {
        let index = self.effect_index;
        self.effect_index += 1;

        let slot = match self.slots.effects.get(index) {
            Some(slot) => {
                let unchanged = slot
                    .borrow()
                    .deps
                    .as_ref()
                    .and_then(|prev| prev.downcast_ref::<D>())
                    .is_some_and(|prev| *prev == deps);
                if unchanged {
                    return;
                }
                slot.clone()
            }
            None => {
                let slot = EffectSlot::default();
                self.slots.effects.push(slot.clone());
                slot
            }
        };

        self.queue.push(PendingEffect::new(
            self.pointer.clone(),
            slot,
            Box::new(deps),
            move || callback().into_cleanup(),
        ));
    }
}

// =============================================================================
// Tests
// =============================================================================
