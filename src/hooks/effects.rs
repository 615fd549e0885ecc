//! Deferred effect queue.
//!
//! Effects declared during a pass are not run inline. They are queued in
//! declaration order and drained once, after the patch step of the cycle.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::tree::RenderPointer;
use crate::types::Cleanup;

/// Values an effect callback may return.
///
/// `()` means no cleanup; any `FnOnce()` closure becomes the cleanup.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl<F: FnOnce() + 'static> IntoCleanup for F {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(Box::new(self))
    }
}

/// What the last executed run of one effect left behind.
#[derive(Default)]
pub(crate) struct EffectRecord {
    /// Dependencies of that run; `None` until the effect has run once.
    pub(crate) deps: Option<Box<dyn Any>>,
    pub(crate) cleanup: Option<Cleanup>,
}

/// Record shared between an effect slot and its queued run.
pub(crate) type EffectSlot = Rc<RefCell<EffectRecord>>;

/// One scheduled effect run.
///
/// The dependencies it was scheduled for are only recorded when it runs, so
/// a run dropped with an aborted pass is scheduled again next time.
pub struct PendingEffect {
    pointer: RenderPointer,
    slot: EffectSlot,
    deps: Box<dyn Any>,
    callback: Box<dyn FnOnce() -> Option<Cleanup>>,
}

impl PendingEffect {
    pub(crate) fn new(
        pointer: RenderPointer,
        slot: EffectSlot,
        deps: Box<dyn Any>,
        callback: impl FnOnce() -> Option<Cleanup> + 'static,
    ) -> Self {
        Self {
            pointer,
            slot,
            deps,
            callback: Box::new(callback),
        }
    }

    /// Record the dependencies, run the previous cleanup of this slot, then
    /// the callback, and store the callback's cleanup for next time.
    pub fn run(self) {
        tracing::trace!(pointer = %self.pointer, "running effect");
        let previous = {
            let mut record = self.slot.borrow_mut();
            record.deps = Some(self.deps);
            record.cleanup.take()
        };
        if let Some(cleanup) = previous {
            cleanup();
        }
        let next = (self.callback)();
        self.slot.borrow_mut().cleanup = next;
    }
}

/// FIFO queue of effects waiting for the end of a cycle.
#[derive(Default)]
pub struct EffectQueue {
    pending: VecDeque<PendingEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: PendingEffect) {
        self.pending.push_back(effect);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Run every queued effect in declaration order.
    pub fn flush(mut self) {
        while let Some(effect) = self.pending.pop_front() {
            effect.run();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
