//! Fiber Arena
//!
//! Fibers of both tree generations live in one arena indexed by [`FiberId`].
//! Links between fibers are IDs, so the work loop can hold a plain cursor and
//! walk the tree without recursion or borrowed references.

use std::collections::{HashMap, HashSet};

use super::node::{EffectTag, Fiber, FiberId};

/// Storage for every live fiber of a root.
#[derive(Debug)]
pub struct FiberArena<N> {
    fibers: HashMap<FiberId, Fiber<N>>,
}

impl<N> FiberArena<N> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            fibers: HashMap::new(),
        }
    }

    /// Add a fiber, returning its ID.
    pub(crate) fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = fiber.id();
        self.fibers.insert(id, fiber);
        id
    }

    /// Look up a fiber by ID.
    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(&id)
    }

    /// Whether `id` is still stored.
    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(&id)
    }

    /// Total number of fibers, across both generations.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Whether the arena holds no fibers.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Direct children of `id`, in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|f| f.child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.get(child).and_then(|f| f.sibling);
        }
        out
    }

    /// The fiber after `id` in a preorder walk of the subtree rooted at `root`.
    ///
    /// First child if there is one; otherwise the next sibling of the nearest
    /// ancestor (or `id` itself) that has one. Never leaves `root`'s subtree.
    pub fn next_in_preorder(&self, id: FiberId, root: FiberId) -> Option<FiberId> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Some(child);
        }
        let mut cursor = id;
        while cursor != root {
            let fiber = self.get(cursor)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            cursor = fiber.parent?;
        }
        None
    }

    /// Every fiber of the subtree rooted at `root`, in preorder.
    pub fn preorder(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut cursor = self.get(root).map(|_| root);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.next_in_preorder(id, root);
        }
        out
    }

    /// Remove every fiber not in `live`. Returns the number removed.
    pub(crate) fn retain(&mut self, live: &HashSet<FiberId>) -> usize {
        let before = self.fibers.len();
        self.fibers.retain(|id, _| live.contains(id));
        before - self.fibers.len()
    }

    pub(crate) fn clear(&mut self) {
        self.fibers.clear();
    }
}

impl<N: Clone> FiberArena<N> {
    /// Host node of the nearest proper ancestor that owns one.
    pub fn host_parent(&self, id: FiberId) -> Option<N> {
        let parent = self.host_parent_fiber(id)?;
        self.get(parent)?.node.clone()
    }

    /// The nearest proper ancestor of `id` that owns a host node.
    pub fn host_parent_fiber(&self, id: FiberId) -> Option<FiberId> {
        let mut cursor = self.get(id)?.parent;
        while let Some(ancestor) = cursor {
            let fiber = self.get(ancestor)?;
            if fiber.node.is_some() {
                return Some(ancestor);
            }
            cursor = fiber.parent;
        }
        None
    }

    /// The host node that a newly placed `id` must be inserted before.
    ///
    /// Looks through the following siblings (climbing out of component
    /// fibers, which own no host node) for the first host node that is
    /// already in the host tree. Siblings still waiting for placement are
    /// skipped since they are committed after `id`.
    pub fn host_sibling(&self, id: FiberId) -> Option<N> {
        self.host_sibling_cached(id, &mut HashMap::new())
    }

    /// [`host_sibling`](Self::host_sibling) sharing `anchors` across the
    /// placements of one commit.
    ///
    /// `anchors` maps a fiber to the first attached host node after it.
    /// Effect tags do not change while a commit runs, so every fiber on a
    /// scanned path shares the answer and is visited once per commit.
    pub(crate) fn host_sibling_cached(
        &self,
        id: FiberId,
        anchors: &mut HashMap<FiberId, Option<N>>,
    ) -> Option<N> {
        let mut visited = Vec::new();
        let mut cursor = id;
        let anchor = loop {
            if let Some(known) = anchors.get(&cursor) {
                break known.clone();
            }
            visited.push(cursor);
            let Some(fiber) = self.get(cursor) else {
                break None;
            };
            match fiber.sibling {
                Some(sibling) => {
                    if let Some(node) = self.first_placed_node(sibling) {
                        break Some(node);
                    }
                    cursor = sibling;
                }
                None => match fiber.parent.and_then(|p| self.get(p)) {
                    Some(parent) if parent.node.is_none() => cursor = parent.id(),
                    _ => break None,
                },
            }
        };
        for fiber in visited {
            anchors.insert(fiber, anchor.clone());
        }
        anchor
    }

    fn first_placed_node(&self, id: FiberId) -> Option<N> {
        let fiber = self.get(id)?;
        if fiber.effect == EffectTag::Placement {
            return None;
        }
        if let Some(node) = &fiber.node {
            return Some(node.clone());
        }
        self.children(id)
            .into_iter()
            .find_map(|child| self.first_placed_node(child))
    }

    /// Topmost host nodes inside the subtree of `id`: `id`'s own node if it
    /// has one, otherwise the nearest host nodes below each component.
    pub fn top_host_nodes(&self, id: FiberId) -> Vec<N> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(fiber) = self.get(current) else {
                continue;
            };
            match &fiber.node {
                Some(node) => out.push(node.clone()),
                None => stack.extend(self.children(current).into_iter().rev()),
            }
        }
        out
    }
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self::new()
    }
}
