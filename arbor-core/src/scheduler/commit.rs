//! Commit Phase
//!
//! Applies a completed work-in-progress tree to the host in one pass. The
//! commit is never interrupted: the host goes from the old tree to the new
//! one without exposing anything in between.
//!
//! # Order
//!
//! 1. Deletions recorded during reconciliation.
//! 2. A preorder walk of the new tree applying placements and updates, so a
//!    parent is always attached before its children.
//!
//! Afterwards the new tree becomes current and fibers that are neither part
//! of it nor an alternate of one are dropped from the arena.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, instrument, trace, warn};

use super::Root;
use crate::element::Props;
use crate::fiber::{EffectTag, FiberId};
use crate::host::{apply_props, HostAdapter};

/// One effect applied during a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEffect<N> {
    pub fiber: FiberId,
    pub tag: EffectTag,
    /// The fiber's own host node; `None` for components.
    pub node: Option<N>,
}

/// Every effect applied by one commit, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitSummary<N> {
    pub effects: Vec<CommittedEffect<N>>,
}

impl<N> CommitSummary<N> {
    fn count(&self, tag: EffectTag) -> usize {
        self.effects.iter().filter(|e| e.tag == tag).count()
    }

    pub fn placements(&self) -> usize {
        self.count(EffectTag::Placement)
    }

    pub fn updates(&self) -> usize {
        self.count(EffectTag::Update)
    }

    pub fn deletions(&self) -> usize {
        self.count(EffectTag::Deletion)
    }

    /// Effects with the given tag, in application order.
    pub fn with_tag(&self, tag: EffectTag) -> impl Iterator<Item = &CommittedEffect<N>> {
        self.effects.iter().filter(move |e| e.tag == tag)
    }
}

impl<H: HostAdapter> Root<H> {
    #[instrument(level = "debug", skip_all)]
    pub(crate) fn commit_root(&mut self) {
        let Some(root) = self.wip_root.take() else {
            return;
        };
        self.next_unit = None;
        let mut effects = Vec::new();
        let mut anchors = HashMap::new();

        for id in std::mem::take(&mut self.deletions) {
            self.commit_deletion(id, &mut effects);
        }
        for id in self.fibers.preorder(root) {
            match self.fibers.get(id).map(|f| f.effect()) {
                Some(EffectTag::Placement) => {
                    self.commit_placement(id, &mut anchors, &mut effects)
                }
                Some(EffectTag::Update) => self.commit_update(id, &mut effects),
                _ => {}
            }
        }

        self.current = Some(root);
        let removed = self.collect_garbage(root);

        let summary = CommitSummary { effects };
        debug!(
            placements = summary.placements(),
            updates = summary.updates(),
            deletions = summary.deletions(),
            collected = removed,
            "committed render"
        );
        self.last_commit = Some(summary);
    }

    fn commit_deletion(&mut self, id: FiberId, effects: &mut Vec<CommittedEffect<H::Node>>) {
        let Some(parent) = self.fibers.host_parent(id) else {
            warn!(fiber = id.raw(), "deleted fiber has no host parent");
            return;
        };
        for node in self.fibers.top_host_nodes(id) {
            self.host.remove_child(&parent, &node);
        }
        let node = self.fibers.get(id).and_then(|f| f.node().cloned());
        trace!(fiber = id.raw(), "deleted");
        effects.push(CommittedEffect {
            fiber: id,
            tag: EffectTag::Deletion,
            node,
        });
    }

    fn commit_placement(
        &mut self,
        id: FiberId,
        anchors: &mut HashMap<FiberId, Option<H::Node>>,
        effects: &mut Vec<CommittedEffect<H::Node>>,
    ) {
        let node = self.fibers.get(id).and_then(|f| f.node().cloned());
        if let Some(child) = &node {
            let parent = self
                .fibers
                .host_parent_fiber(id)
                .and_then(|p| self.fibers.get(p));
            match parent.and_then(|p| Some((p.effect(), p.node()?.clone()))) {
                // A freshly placed parent was created empty this render, so
                // its children arrive in document order.
                Some((EffectTag::Placement, parent)) => self.host.append_child(&parent, child),
                Some((_, parent)) => match self.fibers.host_sibling_cached(id, anchors) {
                    Some(before) => self.host.insert_before(&parent, child, &before),
                    None => self.host.append_child(&parent, child),
                },
                None => warn!(fiber = id.raw(), "placed fiber has no host parent"),
            }
        }
        trace!(fiber = id.raw(), "placed");
        effects.push(CommittedEffect {
            fiber: id,
            tag: EffectTag::Placement,
            node,
        });
    }

    fn commit_update(&mut self, id: FiberId, effects: &mut Vec<CommittedEffect<H::Node>>) {
        let Some(fiber) = self.fibers.get(id) else {
            return;
        };
        let node = fiber.node().cloned();
        let next = Rc::clone(&fiber.props);
        let prev = fiber
            .alternate()
            .and_then(|alt| self.fibers.get(alt))
            .map(|alt| Rc::clone(&alt.props))
            .unwrap_or_else(|| Rc::new(Props::new()));

        if let Some(node) = &node {
            apply_props(&mut self.host, node, &prev, &next);
        }
        trace!(fiber = id.raw(), "updated");
        effects.push(CommittedEffect {
            fiber: id,
            tag: EffectTag::Update,
            node,
        });
    }

    /// Keep the committed tree and its alternates; drop everything else.
    fn collect_garbage(&mut self, root: FiberId) -> usize {
        let mut live = HashSet::new();
        for id in self.fibers.preorder(root) {
            live.insert(id);
            if let Some(alt) = self.fibers.get(id).and_then(|f| f.alternate()) {
                live.insert(alt);
            }
        }
        self.fibers.retain(&live)
    }
}
