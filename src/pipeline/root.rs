//! Root API - mounting a tree and running update cycles.
//!
//! A [`Root`] owns one subscription: the medium, the container node, the
//! physical node index, the previous snapshot and the hook slots. Every
//! cycle runs the same steps:
//!
//! ```text
//! render -> diff -> sort -> patch -> unmount sweep -> cleanups -> effects
//! ```
//!
//! A cycle that fails leaves no trace. Render errors and rejected styles are
//! caught before the medium is touched, so the previous tree stays. Any other
//! patch failure empties the container and the next cycle mounts afresh.
//!
//! Cycles are synchronous. A setter that fires while a cycle is running (in a
//! component body or an effect) does not start a nested cycle; it marks the
//! root dirty and the running loop goes around once more.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{create_root, h, Component, MemoryDocument};
//!
//! let mut doc = MemoryDocument::new();
//! let container = doc.create_container();
//! let root = create_root(doc, container);
//!
//! root.render(h("div").child(Component::new(counter)))?;
//! let html = root.with_medium(|doc| doc.to_html(root.container()));
//!
//! root.unmount()?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::config::RootConfig;
use crate::error::{Error, Result};
use crate::hooks::{EffectQueue, SlotManager, UpdateTrigger};
use crate::medium::Medium;
use crate::renderer::{diff, render_root, sort_entries, DiffEntry, NodeIndex, Patcher};
use crate::tree::{RenderNode, RenderPointer, Snapshot};
use crate::types::{Cleanup, Element, Event};

// =============================================================================
// Runtime
// =============================================================================

/// Everything one cycle mutates.
struct Runtime<M: Medium> {
    medium: M,
    container: M::Node,
    index: NodeIndex<M::Node>,
    previous: Snapshot,
    slots: SlotManager,
    last_diff: Vec<DiffEntry>,
    cycles: usize,
}

impl<M: Medium> Runtime<M> {
    /// Render `element` (or nothing), patch the medium and sweep unmounted
    /// slots. Returns the cleanups and effects to run once the runtime is no
    /// longer borrowed.
    fn update(
        &mut self,
        element: Option<&Element>,
        config: &RootConfig,
        pass: usize,
    ) -> Result<(Vec<Cleanup>, EffectQueue)> {
        let current = match element {
            Some(element) => match render_root(element, &self.previous, &mut self.slots) {
                Ok(current) => current,
                Err(err) => {
                    self.slots.discard_pending();
                    return Err(err.into());
                }
            },
            None => Snapshot::new(),
        };

        let mut entries = diff(&current, &self.previous);
        sort_entries(&mut entries);
        tracing::debug!(
            pass,
            entries = entries.len(),
            nodes = current.len(),
            "update cycle"
        );

        let mut patcher =
            Patcher::new(&mut self.medium, &self.container, &mut self.index, &current)
                .with_trace(config.trace_patches);
        if let Err(err) = patcher.check(&entries) {
            self.slots.discard_pending();
            return Err(err.into());
        }
        if let Err(err) = patcher.apply(&entries) {
            self.slots.discard_pending();
            self.resync();
            return Err(err.into());
        }

        let cleanups = self
            .slots
            .clean_hooks(|pointer| current.get(pointer).is_some_and(RenderNode::is_component));

        self.previous = current;
        self.last_diff = entries;
        self.cycles += 1;
        Ok((cleanups, self.slots.take_pending()))
    }

    /// Forget a half-applied cycle: empty the container and the index so the
    /// next cycle mounts from scratch.
    fn resync(&mut self) {
        tracing::warn!("patch failed mid-cycle; remounting on the next cycle");
        for child in self.medium.children(&self.container) {
            self.medium.remove_child(&self.container, &child);
        }
        self.index.clear();
        self.previous = Snapshot::new();
    }
}

// =============================================================================
// Root
// =============================================================================

struct RootInner<M: Medium> {
    runtime: RefCell<Runtime<M>>,
    element: RefCell<Option<Rc<Element>>>,
    running: Cell<bool>,
    pending: Cell<bool>,
    config: RootConfig,
}

impl<M: Medium> RootInner<M> {
    /// Run cycles until no setter marks the root dirty.
    fn run(&self) -> Result<()> {
        if self.running.get() {
            self.pending.set(true);
            return Ok(());
        }

        self.running.set(true);
        let result = self.run_passes();
        self.running.set(false);
        self.pending.set(false);
        result
    }

    fn run_passes(&self) -> Result<()> {
        let mut passes = 0;
        loop {
            if passes >= self.config.max_update_passes {
                return Err(Error::UpdateLoop { passes });
            }
            passes += 1;
            self.pending.set(false);

            let element = self.element.borrow().clone();
            let (cleanups, effects) =
                self.runtime
                    .borrow_mut()
                    .update(element.as_deref(), &self.config, passes)?;

            for cleanup in cleanups {
                cleanup();
            }
            effects.flush();

            if !self.pending.get() {
                return Ok(());
            }
        }
    }
}

impl<M: Medium> UpdateTrigger for RootInner<M> {
    fn request_update(&self) {
        if let Err(err) = self.run() {
            tracing::error!(error = %err, "state-triggered update failed");
        }
    }
}

/// Handle to a mounted tree.
pub struct Root<M: Medium + 'static> {
    inner: Rc<RootInner<M>>,
}

/// Create a root rendering into `container` with default settings.
pub fn create_root<M: Medium + 'static>(medium: M, container: M::Node) -> Root<M> {
    create_root_with_config(medium, container, RootConfig::default())
}

/// Create a root rendering into `container`.
pub fn create_root_with_config<M: Medium + 'static>(
    medium: M,
    container: M::Node,
    config: RootConfig,
) -> Root<M> {
    let inner = Rc::new_cyclic(|weak: &Weak<RootInner<M>>| {
        let trigger: Weak<dyn UpdateTrigger> = weak.clone();
        RootInner {
            runtime: RefCell::new(Runtime {
                medium,
                container,
                index: NodeIndex::new(),
                previous: Snapshot::new(),
                slots: SlotManager::new(trigger),
                last_diff: Vec::new(),
                cycles: 0,
            }),
            element: RefCell::new(None),
            running: Cell::new(false),
            pending: Cell::new(false),
            config,
        }
    });
    Root { inner }
}

impl<M: Medium + 'static> Root<M> {
    /// Render `element`, replacing whatever was rendered before.
    ///
    /// The first call mounts; later calls diff against the previous tree.
    /// Called from inside a cycle, the new element is picked up by the next
    /// pass of the running loop.
    pub fn render(&self, element: impl Into<Element>) -> Result<()> {
        *self.inner.element.borrow_mut() = Some(Rc::new(element.into()));
        self.inner.run()
    }

    /// Remove everything this root rendered and run every outstanding
    /// effect cleanup. The root can be rendered into again afterwards.
    pub fn unmount(&self) -> Result<()> {
        *self.inner.element.borrow_mut() = None;
        self.inner.run()
    }

    /// Call every handler bound for `event.name` on `node`.
    ///
    /// Returns how many handlers ran. Setters fired by the handlers run their
    /// update cycles before this returns.
    pub fn dispatch_event(&self, node: &M::Node, event: &Event) -> usize {
        let handlers = match self.inner.runtime.try_borrow() {
            Ok(runtime) => runtime.medium.listeners(node, &event.name),
            Err(_) => {
                tracing::warn!(event = %event.name, "cannot dispatch while rendering");
                return 0;
            }
        };
        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    /// Read the medium.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a component function.
    pub fn with_medium<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.inner.runtime.borrow().medium)
    }

    pub fn container(&self) -> M::Node {
        self.inner.runtime.borrow().container.clone()
    }

    /// Physical node a pointer materialized to.
    pub fn node(&self, pointer: &RenderPointer) -> Option<M::Node> {
        self.inner.runtime.borrow().index.node(pointer).cloned()
    }

    /// Sorted entries applied by the most recent successful cycle.
    pub fn last_diff(&self) -> Vec<DiffEntry> {
        self.inner.runtime.borrow().last_diff.clone()
    }

    /// Number of completed update cycles.
    pub fn cycle_count(&self) -> usize {
        self.inner.runtime.borrow().cycles
    }

    pub fn config(&self) -> RootConfig {
        self.inner.config
    }
}

// =============================================================================
// Tests
// =============================================================================
