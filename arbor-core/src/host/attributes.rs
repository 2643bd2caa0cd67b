//! Property Conversion
//!
//! Turns element props into host attributes and listener registrations, and
//! diffs two prop sets into the minimal list of host operations.
//!
//! # Conventions
//!
//! - `children` is never forwarded.
//! - `on*` names with a callable value register listeners. The event type is
//!   the rest of the name lower-cased; a `Capture` suffix selects the capture
//!   phase (`onClickCapture` → `click`, capture).
//! - `className` (any case) becomes `class`.
//! - A `style` mapping becomes one inline declaration string.
//! - `true` is a bare attribute, `false` and `Null` are absent.

use indexmap::IndexMap;
use tracing::debug;

use super::HostAdapter;
use crate::element::{PropValue, Props};

const CHILDREN: &str = "children";
const EVENT_PREFIX: &str = "on";
const CAPTURE_SUFFIX: &str = "Capture";

/// A parsed event prop name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub event_type: String,
    pub capture: bool,
}

impl EventBinding {
    /// Parse an `on*` prop name. Returns `None` for anything that is not a
    /// usable event name, including the bare name `on`.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(EVENT_PREFIX)?;
        let (rest, capture) = match rest.strip_suffix(CAPTURE_SUFFIX) {
            Some(stripped) if !stripped.is_empty() => (stripped, true),
            _ => (rest, false),
        };
        if rest.is_empty() {
            return None;
        }
        Some(Self {
            event_type: rest.to_lowercase(),
            capture,
        })
    }
}

/// Whether a prop name falls in the event namespace.
pub fn is_event(name: &str) -> bool {
    name.starts_with(EVENT_PREFIX)
}

fn is_attribute(name: &str) -> bool {
    name != CHILDREN && !is_event(name)
}

/// Host attribute name for a prop name.
pub fn attribute_name(name: &str) -> &str {
    if name.eq_ignore_ascii_case("className") {
        "class"
    } else {
        name
    }
}

/// How a prop value appears on the host node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Set the attribute to this string.
    Present(String),
    /// The attribute must not exist.
    Absent,
    /// The value has no attribute form and is left alone.
    Unsupported,
}

/// Convert a prop value for the (already converted) attribute `name`.
pub fn attribute_value(name: &str, value: &PropValue) -> Attribute {
    match value {
        PropValue::Null | PropValue::Bool(false) => Attribute::Absent,
        PropValue::Bool(true) => Attribute::Present(String::new()),
        PropValue::Int(i) => Attribute::Present(i.to_string()),
        PropValue::Float(x) => Attribute::Present(x.to_string()),
        PropValue::Str(s) => Attribute::Present(s.clone()),
        PropValue::Map(map) if name == "style" => Attribute::Present(serialize_style(map)),
        PropValue::Map(_)
        | PropValue::List(_)
        | PropValue::Handler(_)
        | PropValue::Element(_)
        | PropValue::Opaque(_) => Attribute::Unsupported,
    }
}

/// Serialize a style mapping into an inline declaration string.
///
/// ```rust
/// use arbor_core::host::attributes::serialize_style;
/// use arbor_core::PropValue;
///
/// let style = [("backgroundColor".to_string(), PropValue::from("hotpink"))]
///     .into_iter()
///     .collect();
/// assert_eq!(serialize_style(&style), "background-color: hotpink;");
/// ```
pub fn serialize_style(style: &IndexMap<String, PropValue>) -> String {
    let mut declarations = Vec::with_capacity(style.len());
    for (key, value) in style {
        let value = match value {
            PropValue::Str(s) if !s.is_empty() => s.clone(),
            PropValue::Int(i) => i.to_string(),
            PropValue::Float(x) => x.to_string(),
            _ => continue,
        };
        declarations.push(format!("{}: {};", css_property_name(key), value));
    }
    declarations.join(" ")
}

/// `backgroundColor` → `background-color`, `WebkitTransition` →
/// `-webkit-transition`. Custom properties (`--x`) pass through.
fn css_property_name(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Bring a host node from `prev` props to `next` props.
///
/// Listeners that vanished or changed are detached first, then vanished
/// attributes are cleared, changed attributes written, and changed listeners
/// attached.
pub fn apply_props<H: HostAdapter + ?Sized>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
) {
    for (name, value) in prev.iter().filter(|(name, _)| is_event(name)) {
        if next.get(name) == Some(value) {
            continue;
        }
        if let (Some(binding), Some(handler)) = (EventBinding::parse(name), value.as_handler()) {
            host.remove_event_listener(node, &binding.event_type, handler, binding.capture);
        }
    }

    for (name, _) in prev.iter().filter(|(name, _)| is_attribute(name)) {
        if !next.contains(name) {
            host.clear_property(node, attribute_name(name));
        }
    }

    for (name, value) in next.iter() {
        if prev.get(name) == Some(value) {
            continue;
        }
        if is_event(name) {
            match (EventBinding::parse(name), value.as_handler()) {
                (Some(binding), Some(handler)) => {
                    host.add_event_listener(node, &binding.event_type, handler, binding.capture);
                }
                _ => debug!(prop = name, "ignoring event prop without a callable value"),
            }
        } else if name != CHILDREN {
            let attr = attribute_name(name);
            match attribute_value(attr, value) {
                Attribute::Present(text) => host.set_property(node, attr, &text),
                Attribute::Absent => host.clear_property(node, attr),
                Attribute::Unsupported => {
                    debug!(prop = name, "skipping prop with no attribute form");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Mutation};

    #[test]
    fn parses_event_names() {
        assert_eq!(
            EventBinding::parse("onClick"),
            Some(EventBinding { event_type: "click".into(), capture: false })
        );
        assert_eq!(
            EventBinding::parse("onClickCapture"),
            Some(EventBinding { event_type: "click".into(), capture: true })
        );
        assert_eq!(
            EventBinding::parse("onMouseMove"),
            Some(EventBinding { event_type: "mousemove".into(), capture: false })
        );
        assert_eq!(EventBinding::parse("on"), None);
        assert_eq!(EventBinding::parse("title"), None);
    }

    #[test]
    fn capture_alone_is_an_event_type() {
        assert_eq!(
            EventBinding::parse("onCapture"),
            Some(EventBinding { event_type: "capture".into(), capture: false })
        );
    }

    #[test]
    fn class_name_maps_to_class() {
        assert_eq!(attribute_name("className"), "class");
        assert_eq!(attribute_name("classname"), "class");
        assert_eq!(attribute_name("alt"), "alt");
    }

    #[test]
    fn booleans_are_bare_or_absent() {
        assert_eq!(attribute_value("disabled", &true.into()), Attribute::Present(String::new()));
        assert_eq!(attribute_value("disabled", &false.into()), Attribute::Absent);
        assert_eq!(attribute_value("value", &PropValue::Null), Attribute::Absent);
    }

    #[test]
    fn style_maps_serialize_to_one_string() {
        let mut style = IndexMap::new();
        style.insert("backgroundColor".to_string(), PropValue::from("hotpink"));
        style.insert("marginTop".to_string(), PropValue::from(4));
        style.insert("color".to_string(), PropValue::Null);
        style.insert("WebkitTransition".to_string(), PropValue::from("none"));
        assert_eq!(
            serialize_style(&style),
            "background-color: hotpink; margin-top: 4; -webkit-transition: none;"
        );
        assert_eq!(
            attribute_value("style", &PropValue::Map(style.clone())),
            Attribute::Present(serialize_style(&style))
        );
        assert_eq!(attribute_value("data", &PropValue::Map(style)), Attribute::Unsupported);
    }

    #[test]
    fn initial_apply_writes_attributes_and_listeners() {
        let mut host = MemoryHost::new();
        let node = host.create_element("input");
        let props = Props::new()
            .with("className", "field")
            .with("disabled", false)
            .with("readOnly", true)
            .with("value", "Hello there")
            .on("onChangeCapture", |_| {});
        host.take_mutations();

        apply_props(&mut host, &node, &Props::new(), &props);

        let n = host.node(node).unwrap();
        assert_eq!(n.property("class"), Some("field"));
        assert_eq!(n.property("readOnly"), Some(""));
        assert_eq!(n.property("value"), Some("Hello there"));
        assert_eq!(n.property("disabled"), None);
        assert_eq!(n.listeners().collect::<Vec<_>>(), [("change", true)]);
    }

    #[test]
    fn update_removes_changes_and_rebinds() {
        let mut host = MemoryHost::new();
        let node = host.create_element("button");
        let prev = Props::new()
            .with("title", "old")
            .with("id", "keep")
            .on("onClick", |_| {});
        apply_props(&mut host, &node, &Props::new(), &prev);
        host.take_mutations();

        let next = Props::new().with("id", "keep").on("onClick", |_| {});
        apply_props(&mut host, &node, &prev, &next);

        assert_eq!(
            host.take_mutations(),
            vec![
                Mutation::RemoveListener { node, event_type: "click".into(), capture: false },
                Mutation::ClearProperty { node, name: "title".into() },
                Mutation::AddListener { node, event_type: "click".into(), capture: false },
            ]
        );
        assert_eq!(host.node(node).unwrap().listeners().count(), 1);
    }

    #[test]
    fn unchanged_props_produce_no_mutations() {
        let mut host = MemoryHost::new();
        let node = host.create_element("div");
        let props = Props::new().with("id", "x").with("width", 150);
        apply_props(&mut host, &node, &Props::new(), &props);
        host.take_mutations();

        apply_props(&mut host, &node, &props, &props.clone());
        assert!(host.take_mutations().is_empty());
    }

    #[test]
    fn children_and_non_callable_events_are_ignored() {
        let mut host = MemoryHost::new();
        let node = host.create_element("div");
        let props = Props::new().with("children", "nope").with("onClick", "not a function");
        apply_props(&mut host, &node, &Props::new(), &props);
        let n = host.node(node).unwrap();
        assert!(n.properties().next().is_none());
        assert_eq!(n.listeners().count(), 0);
    }
}
