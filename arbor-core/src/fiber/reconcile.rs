//! Child Reconciliation
//!
//! Pairs a fiber's new child elements with the children of its alternate,
//! position by position, and records what the commit phase has to do.
//!
//! # Algorithm
//!
//! Walk the element list and the old sibling chain in lockstep. At each index:
//!
//! 1. Same type on both sides: a new fiber with `Update`, reusing the old host
//!    node and linked to the old fiber through `alternate` (both ways).
//! 2. An element with no same-type predecessor: a fresh fiber with
//!    `Placement` and no host node.
//! 3. A predecessor with no same-type element: the old fiber is tagged
//!    `Deletion` and pushed onto the pass's deletion list.
//!
//! Identity is positional. Removing the first of three same-type children
//! updates positions 0 and 1 with shifted props and deletes the old third
//! fiber; there are no keys to tell the two cases apart.

use tracing::trace;

use super::arena::FiberArena;
use super::node::{EffectTag, Fiber, FiberId, FiberKind};
use crate::element::Element;

/// Reconcile `elements` as the new children of `parent`.
///
/// Old fibers that have no counterpart are appended to `deletions`.
pub fn reconcile_children<N: Clone>(
    fibers: &mut FiberArena<N>,
    parent: FiberId,
    elements: Vec<Element>,
    deletions: &mut Vec<FiberId>,
) {
    let mut old = fibers
        .get(parent)
        .and_then(|f| f.alternate)
        .and_then(|alt| fibers.get(alt))
        .and_then(|f| f.child);
    let mut elements = elements.into_iter();
    let mut prev: Option<FiberId> = None;
    let mut first: Option<FiberId> = None;

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        let old_fiber = old.and_then(|id| fibers.get(id));
        let next_old = old_fiber.and_then(|f| f.sibling);
        let reused = match (&element, old_fiber) {
            (Some(element), Some(old_fiber)) if old_fiber.kind.matches(element.ty()) => {
                Some((old_fiber.id(), old_fiber.node.clone()))
            }
            _ => None,
        };

        let new_id = element.map(|element| {
            let (ty, props) = element.into_parts();
            let mut fiber = Fiber::new(FiberKind::from(ty), props);
            fiber.parent = Some(parent);
            match &reused {
                Some((old_id, node)) => {
                    fiber.node = node.clone();
                    fiber.alternate = Some(*old_id);
                    fiber.effect = EffectTag::Update;
                }
                None => fiber.effect = EffectTag::Placement,
            }
            fibers.insert(fiber)
        });

        match (&reused, new_id) {
            (Some((old_id, _)), Some(new_id)) => {
                if let Some(old_fiber) = fibers.get_mut(*old_id) {
                    old_fiber.alternate = Some(new_id);
                }
            }
            _ => {
                if let Some(old_id) = old {
                    if let Some(old_fiber) = fibers.get_mut(old_id) {
                        old_fiber.effect = EffectTag::Deletion;
                    }
                    deletions.push(old_id);
                }
            }
        }

        if let Some(id) = new_id {
            trace!(fiber = id.raw(), effect = ?fibers.get(id).map(|f| f.effect), "reconciled child");
            match prev {
                Some(prev_id) => {
                    if let Some(prev_fiber) = fibers.get_mut(prev_id) {
                        prev_fiber.sibling = Some(id);
                    }
                }
                None => first = Some(id),
            }
            prev = Some(id);
        }

        old = next_old;
    }

    if let Some(parent_fiber) = fibers.get_mut(parent) {
        parent_fiber.child = first;
    }
}
