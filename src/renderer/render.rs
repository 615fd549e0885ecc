//! Renderer - element descriptions to a pointer-addressed snapshot.
//!
//! Walks an [`Element`] tree depth-first, calling component functions through
//! the [`SlotManager`] and registering one [`RenderNode`] per pointer.
//!
//! ```text
//! h("div").child(Counter).child("!")
//!
//! []        Host(div, children: 2)
//! [0]       Component(Counter)
//! [0, 0]    Host(button, children: 1)   <- what Counter returned
//! [0, 0, 0] Primitive(3)
//! [1]       Primitive("!")
//! ```

use crate::error::RenderError;
use crate::hooks::SlotManager;
use crate::tree::{RenderNode, RenderPointer, Snapshot};
use crate::types::{ComponentElement, Element, HostElement};

/// One render pass.
pub struct Renderer<'a> {
    previous: &'a Snapshot,
    current: Snapshot,
    slots: &'a mut SlotManager,
}

impl<'a> Renderer<'a> {
    /// Start a pass against the snapshot of the previous pass.
    pub fn new(previous: &'a Snapshot, slots: &'a mut SlotManager) -> Self {
        Self {
            previous,
            current: Snapshot::new(),
            slots,
        }
    }

    /// Render `element` at `pointer`.
    ///
    /// Returns the pointer of the host or primitive node the element resolved
    /// to; components are transparent.
    pub fn render(
        &mut self,
        element: &Element,
        pointer: RenderPointer,
    ) -> Result<RenderPointer, RenderError> {
        match element {
            Element::Primitive(value) => {
                self.current
                    .insert(pointer.clone(), RenderNode::Primitive(value.clone()));
                Ok(pointer)
            }
            Element::Host(host) => self.render_host(host, pointer),
            Element::Component(component) => self.render_component(component, pointer),
        }
    }

    fn render_host(
        &mut self,
        host: &HostElement,
        pointer: RenderPointer,
    ) -> Result<RenderPointer, RenderError> {
        if !is_valid_tag(&host.tag) {
            return Err(RenderError::UntypedElement {
                pointer,
                tag: host.tag.clone(),
            });
        }

        let children = host.props.children();
        self.current.insert(
            pointer.clone(),
            RenderNode::Host {
                tag: host.tag.clone(),
                attributes: host.props.attributes().clone(),
                children: children.len(),
            },
        );
        for (index, child) in children.iter().enumerate() {
            self.render(child, pointer.child(index))?;
        }
        Ok(pointer)
    }

    fn render_component(
        &mut self,
        element: &ComponentElement,
        pointer: RenderPointer,
    ) -> Result<RenderPointer, RenderError> {
        let id = element.component.id();
        let is_first_render = !matches!(
            self.previous.get(&pointer),
            Some(RenderNode::Component { component }) if *component == id
        );

        let output = {
            let mut cx = self.slots.begin_scope(&pointer, is_first_render);
            element.component.call(&mut cx, &element.props)
        };

        self.current
            .insert(pointer.clone(), RenderNode::Component { component: id });
        self.render(&output, pointer.child(0))
    }

    /// Finish the pass and hand over the current snapshot.
    pub fn finish(self) -> Snapshot {
        self.current
    }
}

/// Render a whole tree at the root pointer.
pub fn render_root(
    element: &Element,
    previous: &Snapshot,
    slots: &mut SlotManager,
) -> Result<Snapshot, RenderError> {
    let mut renderer = Renderer::new(previous, slots);
    renderer.render(element, RenderPointer::root())?;
    Ok(renderer.finish())
}

/// Tag identifiers start with a letter and continue with letters, digits,
/// `-`, `_`, `.` or `:`.
fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

// =============================================================================
// Tests
// =============================================================================
