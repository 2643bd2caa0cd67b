//! Work Loop
//!
//! Builds the work-in-progress tree one fiber at a time.
//!
//! # Units of work
//!
//! Processing a fiber means producing its children:
//!
//! - a component fiber evaluates its render function inside a hook context
//!   and reconciles the normalized output;
//! - a host fiber gets a detached host node if it has none yet (with its
//!   props applied) and reconciles `props.children`.
//!
//! The next unit is the first child, else the next sibling of the nearest
//! ancestor that has one, stopping at the work-in-progress root. The cursor
//! lives on the [`Root`], so the loop can stop after any unit and resume on
//! the next call.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, instrument, trace, warn};

use super::{Deadline, Root, WorkStatus};
use crate::element::{normalize_children, Props};
use crate::error::{RenderError, Result};
use crate::fiber::{reconcile_children, EffectTag, FiberId, FiberKind};
use crate::hooks::HookContext;
use crate::host::{apply_props, HostAdapter};

impl<H: HostAdapter> Root<H> {
    /// Do as much rendering as `deadline` allows.
    ///
    /// Pending state updates restart rendering from the committed tree
    /// before any unit runs. After each unit the deadline is consulted, and
    /// the loop yields once less than the configured threshold remains (or the
    /// per-slice unit cap is hit). A completed tree is committed before
    /// returning.
    ///
    /// An error aborts the render in flight: the work-in-progress tree is
    /// dropped, and the committed tree and host are left as they were.
    #[instrument(level = "debug", skip_all)]
    pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<WorkStatus> {
        debug_assert!(
            !HookContext::is_active(),
            "work_loop called while a component is rendering"
        );
        if self.current.is_some() && self.request.take() {
            self.restart_from_current();
        }

        let threshold = self.config.yield_threshold();
        let mut units = 0usize;
        while let Some(unit) = self.next_unit {
            match self.perform_unit(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    warn!(fiber = unit.raw(), error = %err, "render aborted");
                    self.discard_work_in_progress();
                    return Err(err);
                }
            }
            units += 1;

            if self.next_unit.is_none() {
                break;
            }
            let capped = self
                .config
                .max_units_per_slice
                .is_some_and(|cap| units >= cap);
            if capped || deadline.time_remaining() < threshold {
                trace!(units, "yielding to host");
                return Ok(WorkStatus::Yielded);
            }
        }

        if self.wip_root.is_some() {
            self.commit_root();
            return Ok(WorkStatus::Committed);
        }
        Ok(WorkStatus::Idle)
    }

    /// Start a fresh render of the committed tree, dropping any render in
    /// flight.
    fn restart_from_current(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        self.discard_work_in_progress();
        let Some((container, props)) = self
            .fibers
            .get(current)
            .and_then(|f| Some((f.node()?.clone(), Rc::clone(&f.props))))
        else {
            return;
        };
        let root = self.begin_root(container, props);
        debug!(root = root.raw(), "state update requested; restarting render");
    }

    /// Drop the work-in-progress tree and restore the committed tree's links.
    ///
    /// Host nodes created for placements of the abandoned tree were never
    /// attached; they are handed back to the host.
    pub(crate) fn discard_work_in_progress(&mut self) {
        let abandoned = self.wip_root.take();
        let had_work = abandoned.is_some();
        self.next_unit = None;
        self.deletions.clear();

        if let Some(wip) = abandoned {
            let created: Vec<H::Node> = self
                .fibers
                .preorder(wip)
                .into_iter()
                .filter_map(|id| self.fibers.get(id))
                .filter(|f| f.effect() == EffectTag::Placement)
                .filter_map(|f| f.node().cloned())
                .collect();
            for node in &created {
                self.host.release(node);
            }
            if !created.is_empty() {
                trace!(released = created.len(), "released abandoned host nodes");
            }
        }

        let Some(current) = self.current else {
            self.fibers.clear();
            return;
        };
        let live: Vec<FiberId> = self.fibers.preorder(current);
        for id in &live {
            if let Some(fiber) = self.fibers.get_mut(*id) {
                fiber.alternate = None;
                if fiber.effect == EffectTag::Deletion {
                    fiber.effect = EffectTag::None;
                }
            }
        }
        let removed = self.fibers.retain(&live.into_iter().collect::<HashSet<_>>());
        if had_work {
            debug!(removed, "discarded work in progress");
        }
    }

    fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>> {
        let Some(fiber) = self.fibers.get(id) else {
            warn!(fiber = id.raw(), "unit of work refers to a missing fiber");
            return Ok(None);
        };
        trace!(fiber = id.raw(), kind = fiber.kind().name(), "performing unit of work");

        if fiber.is_function_component() {
            self.update_function_component(id)?;
        } else {
            self.update_host_component(id)?;
        }

        let root = self.wip_root.unwrap_or(id);
        Ok(self.fibers.next_in_preorder(id, root))
    }

    fn update_function_component(&mut self, id: FiberId) -> Result<()> {
        let fiber = self.fibers.get(id).ok_or(RenderError::NotCallable(id))?;
        let FiberKind::Component(component) = fiber.kind() else {
            return Err(RenderError::NotCallable(id));
        };
        let component = component.clone();
        let props = Rc::clone(&fiber.props);
        let previous = fiber
            .alternate()
            .and_then(|alt| self.fibers.get(alt))
            .map(|alt| alt.hooks().clone());

        let ctx = HookContext::enter(id, component.name(), previous, self.request.clone());
        debug_assert_eq!(HookContext::current_fiber(), Some(id));
        let output = component.render(&props);
        let hooks = ctx.finish();
        let output = output?;
        let hooks = hooks?;
        trace!(fiber = id.raw(), component = component.name(), hooks = hooks.len(), "evaluated component");

        if let Some(fiber) = self.fibers.get_mut(id) {
            fiber.hooks = hooks;
        }
        let elements = normalize_children([output]);
        reconcile_children(&mut self.fibers, id, elements, &mut self.deletions);
        Ok(())
    }

    fn update_host_component(&mut self, id: FiberId) -> Result<()> {
        let Some(fiber) = self.fibers.get(id) else {
            return Ok(());
        };
        let props = Rc::clone(&fiber.props);

        if fiber.node().is_none() {
            let node = match fiber.kind() {
                FiberKind::Host(tag) if tag.is_empty() => return Err(RenderError::EmptyTag),
                FiberKind::Host(tag) => self.host.create_element(tag),
                FiberKind::Text => self.host.create_text(""),
                FiberKind::Root | FiberKind::Component(_) => {
                    return Err(RenderError::NotCallable(id))
                }
            };
            apply_props(&mut self.host, &node, &Props::new(), &props);
            if let Some(fiber) = self.fibers.get_mut(id) {
                fiber.node = Some(node);
            }
        }

        let children = props.children().to_vec();
        reconcile_children(&mut self.fibers, id, children, &mut self.deletions);
        Ok(())
    }
}
