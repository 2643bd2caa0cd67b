//! Fiber Nodes
//!
//! This module defines the node type that lives in the fiber arena.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::{Component, ElementType, Props};
use crate::hooks::HookList;

/// Stable identifier for a fiber in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(u64);

impl FiberId {
    /// Generate a new unique fiber ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The host-tree operation a fiber asks the commit phase to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    /// Nothing to apply (the root of a pass).
    #[default]
    None,

    /// Insert the fiber's host node into the host tree.
    Placement,

    /// Bring the reused host node from the alternate's props to the new props.
    Update,

    /// Remove the fiber's host nodes from the host tree.
    Deletion,
}

/// What a fiber stands for.
#[derive(Debug, Clone)]
pub enum FiberKind {
    /// The mount point. Always owns the container node.
    Root,
    /// A host element.
    Host(Rc<str>),
    /// A host text node.
    Text,
    /// A function component. Never owns a host node.
    Component(Component),
}

impl FiberKind {
    /// Whether an element of type `ty` can reuse a fiber of this kind.
    pub fn matches(&self, ty: &ElementType) -> bool {
        match (self, ty) {
            (Self::Host(a), ElementType::Host(b)) => a == b,
            (Self::Text, ElementType::Text) => true,
            (Self::Component(a), ElementType::Component(b)) => a.same_type(b),
            _ => false,
        }
    }

    /// Tag, `TEXT_ELEMENT`, component name, or `#root`.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "#root",
            Self::Host(tag) => tag,
            Self::Text => crate::element::TEXT_ELEMENT,
            Self::Component(component) => component.name(),
        }
    }
}

impl From<ElementType> for FiberKind {
    fn from(ty: ElementType) -> Self {
        match ty {
            ElementType::Host(tag) => Self::Host(tag),
            ElementType::Text => Self::Text,
            ElementType::Component(component) => Self::Component(component),
        }
    }
}

/// A unit of work: one tree position in one render generation.
///
/// Links are [`FiberId`]s into the owning arena. `parent`, `child` and
/// `sibling` describe the tree; `alternate` only points at the counterpart in
/// the other generation and never implies ownership.
#[derive(Debug)]
pub struct Fiber<N> {
    id: FiberId,
    pub(crate) kind: FiberKind,
    pub(crate) props: Rc<Props>,
    pub(crate) node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: EffectTag,
    pub(crate) hooks: HookList,
}

impl<N> Fiber<N> {
    /// Create an unlinked fiber.
    pub(crate) fn new(kind: FiberKind, props: Rc<Props>) -> Self {
        Self {
            id: FiberId::new(),
            kind,
            props,
            node: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::None,
            hooks: HookList::new(),
        }
    }

    /// Create a root fiber governing an existing container node.
    pub(crate) fn root(container: N, props: Rc<Props>) -> Self {
        let mut fiber = Self::new(FiberKind::Root, props);
        fiber.node = Some(container);
        fiber
    }

    /// This fiber's arena ID.
    pub fn id(&self) -> FiberId {
        self.id
    }

    /// What this fiber renders.
    pub fn kind(&self) -> &FiberKind {
        &self.kind
    }

    /// Props from the element this fiber was reconciled against.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The host node this fiber governs, if any.
    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    /// The fiber whose children include this one.
    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    /// The first child.
    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    /// The next child of the same parent.
    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    /// The same position in the other tree generation.
    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    /// The host change to apply at commit.
    pub fn effect(&self) -> EffectTag {
        self.effect
    }

    /// State hooks recorded by the last evaluation, in call order.
    pub fn hooks(&self) -> &HookList {
        &self.hooks
    }

    /// Whether processing this fiber means evaluating a component function.
    pub fn is_function_component(&self) -> bool {
        matches!(self.kind, FiberKind::Component(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{component, RenderResult};

    fn empty(_: &Props) -> RenderResult {
        Ok(().into())
    }

    #[test]
    fn fiber_ids_are_unique() {
        let id1 = FiberId::new();
        let id2 = FiberId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn new_fiber_is_unlinked() {
        let fiber: Fiber<()> = Fiber::new(FiberKind::Host("div".into()), Rc::default());
        assert_eq!(fiber.effect(), EffectTag::None);
        assert!(fiber.parent().is_none() && fiber.child().is_none());
        assert!(fiber.sibling().is_none() && fiber.alternate().is_none());
        assert!(fiber.node().is_none());
        assert!(fiber.hooks().is_empty());
    }

    #[test]
    fn root_fiber_owns_container() {
        let fiber = Fiber::root(7_u32, Rc::default());
        assert_eq!(fiber.node(), Some(&7));
        assert_eq!(fiber.kind().name(), "#root");
        assert!(!fiber.is_function_component());
    }

    #[test]
    fn kind_dispatch() {
        let fiber: Fiber<()> = Fiber::new(FiberKind::Component(component(empty)), Rc::default());
        assert!(fiber.is_function_component());
        assert!(fiber.kind().matches(&ElementType::Component(component(empty))));
        assert!(!fiber.kind().matches(&ElementType::from("empty")));
    }

    #[test]
    fn host_kind_matches_same_tag_only() {
        let kind = FiberKind::Host("li".into());
        assert!(kind.matches(&ElementType::from("li")));
        assert!(!kind.matches(&ElementType::from("ul")));
        assert!(!kind.matches(&ElementType::Text));
        assert!(FiberKind::Text.matches(&ElementType::Text));
    }
}
