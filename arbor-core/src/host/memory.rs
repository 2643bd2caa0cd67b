//! In-Memory Host
//!
//! A [`HostAdapter`] that keeps its node tree in a flat vector. Every
//! operation is appended to a mutation log, which makes it the natural host
//! for tests: assertions can look at the resulting tree, at the exact
//! operations a commit performed, or both.

use std::fmt::Write as _;

use indexmap::IndexMap;
use tracing::warn;

use super::{Event, HostAdapter};
use crate::element::{EventHandler, NODE_VALUE};

/// Handle to a node owned by a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostNodeId(usize);

impl HostNodeId {
    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNodeKind {
    Element(String),
    Text,
}

#[derive(Debug, Clone)]
struct Listener {
    event_type: String,
    capture: bool,
    handler: EventHandler,
}

/// A node in the in-memory tree.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    kind: MemoryNodeKind,
    properties: IndexMap<String, String>,
    listeners: Vec<Listener>,
    children: Vec<HostNodeId>,
    parent: Option<HostNodeId>,
    released: bool,
}

impl MemoryNode {
    fn new(kind: MemoryNodeKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
            released: false,
        }
    }

    pub fn kind(&self) -> &MemoryNodeKind {
        &self.kind
    }

    /// Element tag, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            MemoryNodeKind::Element(tag) => Some(tag),
            MemoryNodeKind::Text => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Registered listeners as `(event_type, capture)` pairs.
    pub fn listeners(&self) -> impl Iterator<Item = (&str, bool)> {
        self.listeners.iter().map(|l| (l.event_type.as_str(), l.capture))
    }

    pub fn children(&self) -> &[HostNodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<HostNodeId> {
        self.parent
    }

    /// Whether the core released this node.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// One recorded host operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { node: HostNodeId, kind: MemoryNodeKind },
    SetProperty { node: HostNodeId, name: String, value: String },
    ClearProperty { node: HostNodeId, name: String },
    AddListener { node: HostNodeId, event_type: String, capture: bool },
    RemoveListener { node: HostNodeId, event_type: String, capture: bool },
    Insert { parent: HostNodeId, child: HostNodeId, before: Option<HostNodeId> },
    Remove { parent: HostNodeId, child: HostNodeId },
    Release { node: HostNodeId },
}

impl Mutation {
    /// Whether the operation changes the shape of the tree.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Insert { .. } | Self::Remove { .. })
    }
}

/// An in-memory host tree.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    mutations: Vec<Mutation>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element to mount a root into.
    pub fn create_container(&mut self, tag: &str) -> HostNodeId {
        self.push(MemoryNodeKind::Element(tag.to_string()))
    }

    pub fn node(&self, id: HostNodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)
    }

    /// Children of `id`, or an empty slice for unknown nodes.
    pub fn children(&self, id: HostNodeId) -> &[HostNodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Total number of nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes not yet released.
    pub fn live_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.released).count()
    }

    /// Whether `id` is `root` or one of its descendants.
    pub fn contains(&self, root: HostNodeId, id: HostNodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.node(current).and_then(MemoryNode::parent);
        }
        false
    }

    /// Every node in the subtree of `root`, in preorder, excluding `root`.
    pub fn descendants(&self, root: HostNodeId) -> Vec<HostNodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<HostNodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            if node.kind == MemoryNodeKind::Text {
                out.push_str(node.property(NODE_VALUE).unwrap_or_default());
            }
        }
        for child in self.descendants(id) {
            if let Some(node) = self.node(child) {
                if node.kind == MemoryNodeKind::Text {
                    out.push_str(node.property(NODE_VALUE).unwrap_or_default());
                }
            }
        }
        out
    }

    /// Serialize the subtree of `id` as HTML-like markup. Listeners are not
    /// shown.
    pub fn to_html(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: HostNodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            MemoryNodeKind::Text => out.push_str(node.property(NODE_VALUE).unwrap_or_default()),
            MemoryNodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.properties {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{value}\"");
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    /// Dispatch an event at `target`.
    ///
    /// Capture listeners run from the outermost ancestor down to the target,
    /// then bubble listeners run from the target up. Returns the number of
    /// handlers invoked.
    pub fn dispatch(&self, target: HostNodeId, event_type: &str) -> usize {
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            path.push(id);
            cursor = self.node(id).and_then(MemoryNode::parent);
        }

        let mut invoked = 0;
        for (capture, ids) in [(true, path.iter().rev().collect::<Vec<_>>()), (false, path.iter().collect())] {
            let event = Event {
                event_type: event_type.to_string(),
                capture,
            };
            for &id in ids {
                let handlers: Vec<EventHandler> = self
                    .node(id)
                    .into_iter()
                    .flat_map(|n| n.listeners.iter())
                    .filter(|l| l.capture == capture && l.event_type == event_type)
                    .map(|l| l.handler.clone())
                    .collect();
                for handler in handlers {
                    handler.call(&event);
                    invoked += 1;
                }
            }
        }
        invoked
    }

    fn push(&mut self, kind: MemoryNodeKind) -> HostNodeId {
        let id = HostNodeId(self.nodes.len());
        self.nodes.push(MemoryNode::new(kind.clone()));
        self.mutations.push(Mutation::Create { node: id, kind });
        id
    }

    fn detach(&mut self, child: HostNodeId) {
        let Some(parent) = self.node(child).and_then(MemoryNode::parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child.0) {
            c.parent = None;
        }
    }

    fn attach(&mut self, parent: HostNodeId, child: HostNodeId, before: Option<HostNodeId>) {
        self.detach(child);
        let Some(p) = self.nodes.get_mut(parent.0) else {
            warn!(?parent, "insert into unknown host node");
            return;
        };
        let position = before
            .and_then(|b| p.children.iter().position(|&c| c == b))
            .unwrap_or(p.children.len());
        p.children.insert(position, child);
        if let Some(c) = self.nodes.get_mut(child.0) {
            c.parent = Some(parent);
        }
        self.mutations.push(Mutation::Insert { parent, child, before });
    }
}

impl HostAdapter for MemoryHost {
    type Node = HostNodeId;

    fn create_element(&mut self, tag: &str) -> HostNodeId {
        self.push(MemoryNodeKind::Element(tag.to_string()))
    }

    fn create_text(&mut self, text: &str) -> HostNodeId {
        let id = self.push(MemoryNodeKind::Text);
        if !text.is_empty() {
            self.set_property(&id, NODE_VALUE, text);
        }
        id
    }

    fn property(&self, node: &HostNodeId, name: &str) -> Option<String> {
        self.node(*node)?.property(name).map(str::to_string)
    }

    fn set_property(&mut self, node: &HostNodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.properties.insert(name.to_string(), value.to_string());
            self.mutations.push(Mutation::SetProperty {
                node: *node,
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    fn clear_property(&mut self, node: &HostNodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.properties.shift_remove(name);
            self.mutations.push(Mutation::ClearProperty {
                node: *node,
                name: name.to_string(),
            });
        }
    }

    fn add_event_listener(
        &mut self,
        node: &HostNodeId,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    ) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.listeners.push(Listener {
                event_type: event_type.to_string(),
                capture,
                handler: handler.clone(),
            });
            self.mutations.push(Mutation::AddListener {
                node: *node,
                event_type: event_type.to_string(),
                capture,
            });
        }
    }

    fn remove_event_listener(
        &mut self,
        node: &HostNodeId,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    ) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.listeners.retain(|l| {
                !(l.event_type == event_type && l.capture == capture && l.handler.ptr_eq(handler))
            });
            self.mutations.push(Mutation::RemoveListener {
                node: *node,
                event_type: event_type.to_string(),
                capture,
            });
        }
    }

    fn append_child(&mut self, parent: &HostNodeId, child: &HostNodeId) {
        self.attach(*parent, *child, None);
    }

    fn insert_before(&mut self, parent: &HostNodeId, child: &HostNodeId, before: &HostNodeId) {
        self.attach(*parent, *child, Some(*before));
    }

    fn remove_child(&mut self, parent: &HostNodeId, child: &HostNodeId) {
        if self.node(*child).and_then(MemoryNode::parent) != Some(*parent) {
            warn!(?parent, ?child, "remove_child on a node that is not a child");
            return;
        }
        self.detach(*child);
        self.mutations.push(Mutation::Remove {
            parent: *parent,
            child: *child,
        });
    }

    fn release(&mut self, node: &HostNodeId) {
        self.detach(*node);
        let Some(n) = self.nodes.get_mut(node.0) else {
            return;
        };
        n.released = true;
        n.listeners.clear();
        n.properties.clear();
        for child in std::mem::take(&mut n.children) {
            if let Some(c) = self.nodes.get_mut(child.0) {
                c.parent = None;
            }
        }
        self.mutations.push(Mutation::Release { node: *node });
    }
}
