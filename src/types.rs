//! Core types - element descriptions, properties, events.
//!
//! An [`Element`] describes *what* to render. It is never materialized
//! directly: the renderer turns it into render nodes, and the patch applier
//! mirrors those into a [`Medium`](crate::medium::Medium).
//!
//! ```ignore
//! use spark_vdom::{h, Component, Element, Props, Scope};
//!
//! fn greeting(_cx: &mut Scope<'_>, props: &Props) -> Element {
//!     let name = props.get_str("name").unwrap_or("world");
//!     h("p").child(format!("Hello, {name}!")).into()
//! }
//!
//! let tree: Element = h("div")
//!     .prop("className", "app")
//!     .child(Component::new(greeting).with_props(Props::new().with("name", "spark")))
//!     .child(false)
//!     .into();
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::hooks::Scope;

// =============================================================================
// Callback Types
// =============================================================================

/// Cleanup function returned by effects.
///
/// Runs before the effect re-runs and when its component unmounts.
pub type Cleanup = Box<dyn FnOnce()>;

/// Event passed to handlers bound through `on*` properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Medium event name (e.g. "click", "change").
    pub name: String,
    /// Current value of the target, for input-like nodes.
    pub value: Option<String>,
    /// Checked state of the target, for checkbox-like nodes.
    pub checked: Option<bool>,
    /// Key name for keyboard events.
    pub key: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Shared event callback.
///
/// Equality is identity: two handlers are equal only if they are clones of
/// the same `Rc`. Reusing a handler across renders therefore produces no
/// property diff, while a freshly built closure always does.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Property Values
// =============================================================================

/// Inline style mapping (style name -> value), kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style(IndexMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Opaque value carried through component props.
///
/// Compared by identity, like a handler.
#[derive(Clone)]
pub struct SharedValue(Rc<dyn Any>);

impl SharedValue {
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedValue(..)")
    }
}

/// A single property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
    Style(Style),
    Handler(EventHandler),
    Shared(SharedValue),
}

impl PropValue {
    /// Attribute text for scalar values, `None` for everything else.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropValue::Text(s) => Some(s.clone()),
            PropValue::Number(n) => Some(format_number(*n)),
            PropValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Loose truthiness used for boolean attributes.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Bool(b) => *b,
            PropValue::Null => false,
            PropValue::Text(s) => !s.is_empty(),
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            _ => true,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl From<SharedValue> for PropValue {
    fn from(value: SharedValue) -> Self {
        PropValue::Shared(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Null, Into::into)
    }
}

/// Property mapping without the reserved children entry.
pub type Attributes = IndexMap<String, PropValue>;

/// Properties of a host or component element.
///
/// `children` is the reserved entry; it is always an ordered list, a single
/// child is wrapped on insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attributes: Attributes,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`Props::push_child`].
    pub fn with_child(mut self, child: impl Into<Element>) -> Self {
        self.push_child(child);
        self
    }

    pub fn with_children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        if key == "children" {
            tracing::warn!("`children` is reserved; use push_child instead");
            return;
        }
        self.attributes.insert(key, value.into());
    }

    pub fn push_child(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.attributes.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key)? {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key)? {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_handler(&self, key: &str) -> Option<&EventHandler> {
        self.attributes.get(key)?.as_handler()
    }

    /// Downcast an opaque [`SharedValue`] property.
    pub fn get_shared<T: 'static>(&self, key: &str) -> Option<&T> {
        match self.attributes.get(key)? {
            PropValue::Shared(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

// =============================================================================
// Element Descriptions
// =============================================================================

/// Scalar element value.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl Primitive {
    /// Text a primitive materializes to; booleans and null produce nothing.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Primitive::Text(s) => Some(s.clone()),
            Primitive::Number(n) => Some(format_number(*n)),
            Primitive::Bool(_) | Primitive::Null => None,
        }
    }

    pub fn materializes(&self) -> bool {
        matches!(self, Primitive::Text(_) | Primitive::Number(_))
    }
}

/// Identity of a component function.
///
/// Two components are the same type when they were built from the same
/// function item or closure definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentId {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

type RenderFn = dyn Fn(&mut Scope<'_>, &Props) -> Element;

/// A component function.
#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Scope<'_>, &Props) -> Element + 'static,
    {
        Self {
            id: ComponentId {
                type_id: TypeId::of::<F>(),
                name: std::any::type_name::<F>(),
            },
            render: Rc::new(render),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Invoke the component with its render context.
    pub fn call(&self, cx: &mut Scope<'_>, props: &Props) -> Element {
        (self.render)(cx, props)
    }

    /// Pair this component with its props.
    pub fn with_props(self, props: Props) -> ComponentElement {
        ComponentElement {
            component: self,
            props,
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.id.name).finish()
    }
}

/// Tag-typed element under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct HostElement {
    pub tag: String,
    pub props: Props,
}

impl HostElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Props::new(),
        }
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.set(key, value);
        self
    }

    /// Bind an `on*` event property.
    pub fn on(self, key: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.prop(key, EventHandler::new(handler))
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.props.push_child(child);
        self
    }

    pub fn children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.props = self.props.with_children(children);
        self
    }
}

/// Function-typed element.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentElement {
    pub component: Component,
    pub props: Props,
}

impl ComponentElement {
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.set(key, value);
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.props.push_child(child);
        self
    }
}

/// Declarative description of what to render.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Primitive(Primitive),
    Host(HostElement),
    Component(ComponentElement),
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element::Primitive(Primitive::Text(text.into()))
    }

    pub fn number(value: f64) -> Self {
        Element::Primitive(Primitive::Number(value))
    }

    pub fn null() -> Self {
        Element::Primitive(Primitive::Null)
    }
}

/// Shorthand for [`HostElement::new`].
pub fn h(tag: impl Into<String>) -> HostElement {
    HostElement::new(tag)
}

impl From<HostElement> for Element {
    fn from(value: HostElement) -> Self {
        Element::Host(value)
    }
}

impl From<ComponentElement> for Element {
    fn from(value: ComponentElement) -> Self {
        Element::Component(value)
    }
}

impl From<Component> for Element {
    fn from(value: Component) -> Self {
        Element::Component(value.with_props(Props::new()))
    }
}

impl From<Primitive> for Element {
    fn from(value: Primitive) -> Self {
        Element::Primitive(value)
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::text(value)
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::number(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Element::number(value as f64)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::number(value as f64)
    }
}

impl From<usize> for Element {
    fn from(value: usize) -> Self {
        Element::number(value as f64)
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Element::Primitive(Primitive::Bool(value))
    }
}

impl<T: Into<Element>> From<Option<T>> for Element {
    fn from(value: Option<T>) -> Self {
        value.map_or(Element::null(), Into::into)
    }
}

/// Format a number the way it reads in text: integral values drop the
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// =============================================================================
// Tests
// =============================================================================
