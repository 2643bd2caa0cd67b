//! Host Adapter
//!
//! The host is whatever owns the visible node tree: a browser DOM, a native
//! widget toolkit, a terminal buffer. The render core never touches it
//! directly; it drives a [`HostAdapter`] implementation instead.
//!
//! Property conventions are enforced on this side of the boundary (see
//! [`attributes`]), so adapters only ever receive plain string attributes and
//! concrete listener registrations.
//!
//! [`MemoryHost`] is an in-memory adapter for tests and headless runs.

pub mod attributes;
mod memory;

pub use attributes::{apply_props, EventBinding};
pub use memory::{HostNodeId, MemoryHost, MemoryNode, MemoryNodeKind, Mutation};

use std::fmt::Debug;

use crate::element::EventHandler;

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-case event type, e.g. `click`.
    pub event_type: String,
    /// Whether the listener is being invoked during the capture phase.
    pub capture: bool,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            capture: false,
        }
    }
}

/// Primitive operations the render core needs from the host platform.
///
/// All operations are infallible from the core's point of view; the commit
/// phase assumes a well-formed host tree.
pub trait HostAdapter {
    /// Handle to a host node. Cloning must yield a handle to the same node.
    type Node: Clone + PartialEq + Debug;

    /// Create a detached element node for `tag`.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Read a named property.
    fn property(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_property(&mut self, node: &Self::Node, name: &str, value: &str);

    fn clear_property(&mut self, node: &Self::Node, name: &str);

    fn add_event_listener(
        &mut self,
        node: &Self::Node,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    );

    fn remove_event_listener(
        &mut self,
        node: &Self::Node,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    );

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Insert `child` into `parent` directly before `before`.
    fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: &Self::Node);

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Forget a detached node the core will never use again.
    ///
    /// Called for nodes created by a render that was abandoned before it
    /// committed. They were never attached, but their listeners may still
    /// hold handler closures. Nodes removed by a commit are not released:
    /// the core has detached them and holds no further handle.
    fn release(&mut self, _node: &Self::Node) {}
}
