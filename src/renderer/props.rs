//! Property classification and application.
//!
//! Host properties are not all attributes. Each key is classified once
//! against fixed tables and the flags decide how a value reaches the medium:
//!
//! | Flags     | Example            | Written as                                |
//! |-----------|--------------------|-------------------------------------------|
//! | `EVENT`   | `onClick`          | listener for `click`                      |
//! | `BOOLEAN` | `disabled`         | empty attribute when truthy, else removed |
//! | `FIELD`   | `value`            | node field, plus the attribute            |
//! | `STYLE`   | `style`            | `name: value; ...` attribute              |
//! | none      | `className`, `id`  | plain attribute (`class`, `id`)           |

use crate::error::PatchError;
use crate::medium::Medium;
use crate::tree::RenderPointer;
use crate::types::{PropValue, Style};

bitflags::bitflags! {
    /// How a property key reaches the medium.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropFlags: u8 {
        const NONE = 0;
        const EVENT = 1 << 0;
        const BOOLEAN = 1 << 1;
        const FIELD = 1 << 2;
        const STYLE = 1 << 3;
    }
}

/// Event properties and the medium event each binds.
const EVENTS: &[(&str, &str)] = &[
    ("onClick", "click"),
    ("onDoubleClick", "dblclick"),
    ("onChange", "change"),
    ("onInput", "input"),
    ("onSubmit", "submit"),
    ("onKeyDown", "keydown"),
    ("onKeyUp", "keyup"),
    ("onKeyPress", "keypress"),
    ("onFocus", "focus"),
    ("onBlur", "blur"),
    ("onMouseDown", "mousedown"),
    ("onMouseUp", "mouseup"),
    ("onMouseEnter", "mouseenter"),
    ("onMouseLeave", "mouseleave"),
    ("onMouseOver", "mouseover"),
    ("onMouseOut", "mouseout"),
    ("onScroll", "scroll"),
];

const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "checked",
    "disabled",
    "selected",
    "readonly",
    "required",
    "hidden",
    "autofocus",
    "multiple",
    "open",
    "novalidate",
    "formnovalidate",
    "async",
    "defer",
    "autoplay",
    "controls",
    "loop",
    "muted",
];

const FIELDS: &[&str] = &["value", "checked", "selected"];

const RENAMES: &[(&str, &str)] = &[("className", "class"), ("htmlFor", "for")];

/// Classify a property key.
pub fn classify(key: &str) -> PropFlags {
    let mut flags = PropFlags::NONE;
    if event_name(key).is_some() {
        flags |= PropFlags::EVENT;
    }
    if BOOLEAN_ATTRIBUTES.contains(&key) {
        flags |= PropFlags::BOOLEAN;
    }
    if FIELDS.contains(&key) {
        flags |= PropFlags::FIELD;
    }
    if key == "style" {
        flags |= PropFlags::STYLE;
    }
    flags
}

/// Medium event bound by an event property.
pub fn event_name(key: &str) -> Option<&'static str> {
    EVENTS
        .iter()
        .find(|(prop, _)| *prop == key)
        .map(|(_, event)| *event)
}

/// Attribute name a property key is written under.
pub fn attribute_name(key: &str) -> &str {
    RENAMES
        .iter()
        .find(|(prop, _)| *prop == key)
        .map_or(key, |(_, attribute)| *attribute)
}

/// Serialize a style map to `name: value; ...` after validating every pair
/// against the medium.
pub fn serialize_style<M: Medium + ?Sized>(
    medium: &M,
    pointer: &RenderPointer,
    style: &Style,
) -> Result<String, PatchError> {
    let mut declarations = Vec::new();
    for (name, value) in style.iter() {
        if !medium.accepts_style(name, value) {
            return Err(PatchError::InvalidStyle {
                pointer: pointer.clone(),
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        declarations.push(format!("{name}: {value}"));
    }
    Ok(declarations.join("; "))
}

/// Fail if writing `value` for `key` would be rejected by the medium.
pub fn check_prop<M: Medium + ?Sized>(
    medium: &M,
    pointer: &RenderPointer,
    key: &str,
    value: &PropValue,
) -> Result<(), PatchError> {
    match value {
        PropValue::Style(style) if classify(key).contains(PropFlags::STYLE) => {
            serialize_style(medium, pointer, style).map(drop)
        }
        _ => Ok(()),
    }
}

/// Write `value` for `key` onto `node`, replacing `old` if there was one.
pub fn set_prop<M: Medium + ?Sized>(
    medium: &mut M,
    node: &M::Node,
    pointer: &RenderPointer,
    key: &str,
    old: Option<&PropValue>,
    value: &PropValue,
) -> Result<(), PatchError> {
    let flags = classify(key);
    let name = attribute_name(key);

    if flags.contains(PropFlags::EVENT) {
        let event = event_name(key).unwrap_or(key);
        if let Some(previous) = old.and_then(PropValue::as_handler) {
            medium.remove_event_listener(node, event, previous);
        }
        match value {
            PropValue::Handler(handler) => medium.add_event_listener(node, event, handler.clone()),
            PropValue::Null => {}
            other => tracing::trace!(%pointer, key, ?other, "ignoring non-handler event property"),
        }
        return Ok(());
    }

    if flags.contains(PropFlags::BOOLEAN) {
        let on = value.is_truthy();
        if on {
            medium.set_attribute(node, name, "");
        } else {
            medium.remove_attribute(node, name);
        }
        if flags.contains(PropFlags::FIELD) {
            medium.set_field(node, name, &PropValue::Bool(on));
        }
        return Ok(());
    }

    if flags.contains(PropFlags::STYLE) {
        if let PropValue::Style(style) = value {
            let text = serialize_style(medium, pointer, style)?;
            if text.is_empty() {
                medium.remove_attribute(node, name);
            } else {
                medium.set_attribute(node, name, &text);
            }
            return Ok(());
        }
    }

    if flags.contains(PropFlags::FIELD) {
        match value {
            PropValue::Null => medium.remove_field(node, name),
            other => medium.set_field(node, name, other),
        }
    }

    match value {
        PropValue::Null => medium.remove_attribute(node, name),
        PropValue::Handler(_) => {
            tracing::trace!(%pointer, key, "ignoring handler on non-event property")
        }
        other => match other.as_text() {
            Some(text) => medium.set_attribute(node, name, &text),
            None => tracing::trace!(%pointer, key, ?other, "ignoring non-scalar property value"),
        },
    }
    Ok(())
}

/// Undo `old` for `key` on `node`.
pub fn remove_prop<M: Medium + ?Sized>(
    medium: &mut M,
    node: &M::Node,
    key: &str,
    old: &PropValue,
) {
    let flags = classify(key);
    let name = attribute_name(key);

    if flags.contains(PropFlags::EVENT) {
        if let Some(handler) = old.as_handler() {
            medium.remove_event_listener(node, event_name(key).unwrap_or(key), handler);
        }
        return;
    }
    if flags.contains(PropFlags::FIELD) {
        medium.remove_field(node, name);
    }
    medium.remove_attribute(node, name);
}

// =============================================================================
// Tests
// =============================================================================
