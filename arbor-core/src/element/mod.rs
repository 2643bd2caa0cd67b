//! Elements
//!
//! An element is an immutable description of one desired node: a host tag, a
//! text leaf, or a component, together with its props and children. Elements
//! are created fresh on every render and consumed by the reconciler.
//!
//! # Child Normalization
//!
//! [`create_element`] accepts loosely-typed [`Child`] values and normalizes
//! them before they reach the reconciler:
//!
//! - lists are flattened exactly one level deep,
//! - `Null` and `false` are dropped (they mean "render nothing"),
//! - strings, numbers and `true` become synthetic text elements.

mod props;

pub use props::{EventHandler, PropValue, Props};

use std::any::{type_name, TypeId};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::error::Result;

/// Type name reported for synthetic text elements.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// The single prop carried by text elements.
pub const NODE_VALUE: &str = "nodeValue";

/// What a component returns when evaluated.
pub type RenderResult = Result<Child>;

/// A function component.
///
/// Component identity is the Rust type of the render function, so a closure
/// written at one place in the source is the same component on every render
/// even though a new value is created each time. Pass function items or
/// closures directly; coercing to a `fn` pointer first erases that identity.
#[derive(Clone)]
pub struct Component {
    type_id: TypeId,
    name: &'static str,
    render: Rc<dyn Fn(&Props) -> RenderResult>,
}

impl Component {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult + 'static,
    {
        let full = type_name::<F>();
        Self {
            type_id: TypeId::of::<F>(),
            name: full.rsplit("::").next().unwrap_or(full),
            render: Rc::new(render),
        }
    }

    /// Short name of the render function, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate the component with the given props.
    pub fn render(&self, props: &Props) -> RenderResult {
        (self.render)(props)
    }

    /// Whether both values were built from the same render function.
    pub fn same_type(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// Shorthand for [`Component::new`].
pub fn component<F>(render: F) -> Component
where
    F: Fn(&Props) -> RenderResult + 'static,
{
    Component::new(render)
}

/// The type of an element.
#[derive(Clone, Debug)]
pub enum ElementType {
    /// A host tag such as `div`.
    Host(Rc<str>),
    /// A synthetic text leaf.
    Text,
    /// A function component.
    Component(Component),
}

impl ElementType {
    /// Tag, [`TEXT_ELEMENT`] or component name.
    pub fn name(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Text => TEXT_ELEMENT,
            Self::Component(component) => component.name(),
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Text, Self::Text) => true,
            (Self::Component(a), Self::Component(b)) => a.same_type(b),
            _ => false,
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        Self::Host(Rc::from(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        Self::Host(Rc::from(tag))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

/// An immutable node description.
#[derive(Clone, PartialEq)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        self.props.children()
    }

    /// The text of a text element.
    pub fn text(&self) -> Option<&str> {
        match self.ty {
            ElementType::Text => self.props.get(NODE_VALUE).and_then(PropValue::as_str),
            _ => None,
        }
    }

    pub(crate) fn into_parts(self) -> (ElementType, Rc<Props>) {
        (self.ty, self.props)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type", &self.ty.name())
            .field("props", &self.props)
            .finish()
    }
}

/// A loosely-typed child description, normalized by [`create_element`].
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    Element(Element),
    Text(String),
    Bool(bool),
    Null,
    List(Vec<Child>),
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

macro_rules! child_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

child_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Build an element from a type, props and children.
///
/// ```rust
/// use arbor_core::{create_element, Child, Props};
///
/// let list = create_element(
///     "ul",
///     Props::new(),
///     [
///         Child::from(create_element("li", Props::new(), ["one"])),
///         Child::from(false),
///         Child::from(vec!["two", "three"]),
///     ],
/// );
/// assert_eq!(list.children().len(), 3);
/// assert_eq!(list.children()[2].text(), Some("three"));
/// ```
pub fn create_element<T, I>(ty: T, mut props: Props, children: I) -> Element
where
    T: Into<ElementType>,
    I: IntoIterator,
    I::Item: Into<Child>,
{
    props.set_children(normalize_children(children));
    Element {
        ty: ty.into(),
        props: Rc::new(props),
    }
}

/// Build a synthetic text element.
pub fn text_element(value: impl Into<String>) -> Element {
    Element {
        ty: ElementType::Text,
        props: Rc::new(Props::new().with(NODE_VALUE, value.into())),
    }
}

/// Flatten one level, drop `Null`/`false`, wrap primitives as text.
pub fn normalize_children<I>(children: I) -> Vec<Element>
where
    I: IntoIterator,
    I::Item: Into<Child>,
{
    let mut out = Vec::new();
    for child in children {
        match child.into() {
            Child::List(items) => {
                for item in items {
                    push_leaf(&mut out, item);
                }
            }
            other => push_leaf(&mut out, other),
        }
    }
    out
}

fn push_leaf(out: &mut Vec<Element>, child: Child) {
    match child {
        Child::Element(element) => out.push(element),
        Child::Text(text) => out.push(text_element(text)),
        Child::Bool(true) => out.push(text_element("true")),
        Child::Bool(false) | Child::Null => {}
        Child::List(items) => {
            warn!(len = items.len(), "dropping child list nested more than one level deep");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.ty().name()).collect()
    }

    #[test]
    fn drops_null_and_false() {
        let el = create_element(
            "div",
            Props::new(),
            [Child::Null, Child::from(false), Child::from("kept")],
        );
        assert_eq!(el.children().len(), 1);
        assert_eq!(el.children()[0].text(), Some("kept"));
    }

    #[test]
    fn wraps_numbers_as_text() {
        let el = create_element("span", Props::new(), [Child::from(42), Child::from(1.5)]);
        let texts: Vec<_> = el.children().iter().filter_map(Element::text).collect();
        assert_eq!(texts, ["42", "1.5"]);
        assert_eq!(el.children()[0].ty(), &ElementType::Text);
        assert!(el.children()[0].children().is_empty());
    }

    #[test]
    fn flattens_one_level() {
        let items = vec![
            create_element("li", Props::new(), ["a"]),
            create_element("li", Props::new(), ["b"]),
        ];
        let el = create_element(
            "ul",
            Props::new(),
            [Child::from(items), Child::from(create_element("li", Props::new(), ["c"]))],
        );
        assert_eq!(tags(el.children()), ["li", "li", "li"]);
    }

    #[test]
    fn drops_lists_nested_deeper_than_one_level() {
        let nested = Child::List(vec![Child::List(vec![Child::from("deep")]), Child::from("flat")]);
        let el = create_element("div", Props::new(), [nested]);
        let texts: Vec<_> = el.children().iter().filter_map(Element::text).collect();
        assert_eq!(texts, ["flat"]);
    }

    #[test]
    fn true_renders_as_text() {
        let el = create_element("p", Props::new(), [true]);
        assert_eq!(el.children()[0].text(), Some("true"));
    }

    #[test]
    fn text_element_has_single_node_value() {
        let el = text_element("hello");
        assert_eq!(el.props().len(), 1);
        assert_eq!(el.ty().name(), TEXT_ELEMENT);
        assert_eq!(el.text(), Some("hello"));
    }

    fn greeting(_: &Props) -> RenderResult {
        Ok("hi".into())
    }

    fn farewell(_: &Props) -> RenderResult {
        Ok("bye".into())
    }

    #[test]
    fn component_identity_follows_function_type() {
        assert_eq!(ElementType::from(component(greeting)), ElementType::from(component(greeting)));
        assert_ne!(ElementType::from(component(greeting)), ElementType::from(component(farewell)));
        assert_eq!(component(greeting).name(), "greeting");
    }

    #[test]
    fn closures_from_one_site_share_identity() {
        let make = |label: &'static str| component(move |_: &Props| Ok(label.into()));
        assert!(make("a").same_type(&make("b")));
    }

    #[test]
    fn host_tags_compare_by_name() {
        assert_eq!(ElementType::from("div"), ElementType::from(String::from("div")));
        assert_ne!(ElementType::from("div"), ElementType::from("span"));
        assert_ne!(ElementType::from(TEXT_ELEMENT), ElementType::Text);
    }
}
