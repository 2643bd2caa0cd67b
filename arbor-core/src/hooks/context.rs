//! Hook Context
//!
//! Tracks which component fiber is currently being evaluated, so `use_state`
//! can find the hook list it belongs to without an explicit handle.
//!
//! # Implementation
//!
//! A thread-local stack of frames. The work loop pushes a frame before calling
//! a component's render function and pops it afterwards, collecting the hooks
//! the evaluation produced. The guard pops on drop, so a panicking component
//! leaves the stack balanced.

use std::cell::RefCell;

use tracing::trace;

use super::{HookList, RenderRequest};
use crate::error::{RenderError, Result};
use crate::fiber::FiberId;

thread_local! {
    static HOOK_STACK: RefCell<Vec<HookFrame>> = RefCell::new(Vec::new());
}

/// State of one component evaluation.
#[derive(Debug)]
pub(crate) struct HookFrame {
    pub(crate) fiber: FiberId,
    pub(crate) component: &'static str,
    /// Hooks of the alternate fiber, `None` on first evaluation.
    pub(crate) previous: Option<HookList>,
    /// Hooks produced so far.
    pub(crate) hooks: HookList,
    /// Number of `use_state` calls, including failed ones.
    pub(crate) requested: usize,
    pub(crate) request: RenderRequest,
}

/// Guard for an active component evaluation.
pub(crate) struct HookContext {
    fiber: FiberId,
    finished: bool,
}

impl HookContext {
    /// Start evaluating the component on `fiber`.
    pub(crate) fn enter(
        fiber: FiberId,
        component: &'static str,
        previous: Option<HookList>,
        request: RenderRequest,
    ) -> Self {
        HOOK_STACK.with(|stack| {
            stack.borrow_mut().push(HookFrame {
                fiber,
                component,
                previous,
                hooks: HookList::new(),
                requested: 0,
                request,
            });
        });
        trace!(fiber = fiber.raw(), component, "entered hook context");
        Self {
            fiber,
            finished: false,
        }
    }

    /// Whether a component is being evaluated on this thread.
    pub(crate) fn is_active() -> bool {
        HOOK_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The fiber of the innermost evaluation.
    pub(crate) fn current_fiber() -> Option<FiberId> {
        HOOK_STACK.with(|stack| stack.borrow().last().map(|frame| frame.fiber))
    }

    /// Run `f` against the innermost frame.
    pub(crate) fn with_frame<R>(f: impl FnOnce(&mut HookFrame) -> Result<R>) -> Result<R> {
        HOOK_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = stack.last_mut().ok_or(RenderError::HookOutsideRender)?;
            f(frame)
        })
    }

    /// End the evaluation and hand back its hooks.
    ///
    /// Fails when a re-evaluation requested a different number of hooks than
    /// the alternate holds.
    pub(crate) fn finish(mut self) -> Result<HookList> {
        self.finished = true;
        let frame = HOOK_STACK
            .with(|stack| stack.borrow_mut().pop())
            .ok_or(RenderError::HookOutsideRender)?;
        debug_assert_eq!(frame.fiber, self.fiber, "hook context mismatch");

        if let Some(previous) = &frame.previous {
            if previous.len() != frame.requested {
                return Err(RenderError::HookCountMismatch {
                    component: frame.component,
                    expected: previous.len(),
                    used: frame.requested,
                });
            }
        }
        Ok(frame.hooks)
    }
}

impl Drop for HookContext {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        HOOK_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(frame.fiber, self.fiber, "hook context mismatch");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hook;
    use std::rc::Rc;

    #[test]
    fn context_tracks_fiber() {
        let id = FiberId::new();
        assert!(!HookContext::is_active());

        {
            let _ctx = HookContext::enter(id, "App", None, RenderRequest::new());
            assert!(HookContext::is_active());
            assert_eq!(HookContext::current_fiber(), Some(id));
        }

        assert!(!HookContext::is_active());
        assert!(HookContext::current_fiber().is_none());
    }

    #[test]
    fn nested_contexts() {
        let outer = FiberId::new();
        let inner = FiberId::new();

        let _outer = HookContext::enter(outer, "Outer", None, RenderRequest::new());
        {
            let ctx = HookContext::enter(inner, "Inner", None, RenderRequest::new());
            assert_eq!(HookContext::current_fiber(), Some(inner));
            ctx.finish().unwrap();
        }
        assert_eq!(HookContext::current_fiber(), Some(outer));
    }

    #[test]
    fn finish_checks_hook_count() {
        let mut previous = HookList::new();
        previous.push(Hook::new(Rc::new(0_i32)));

        let ctx = HookContext::enter(FiberId::new(), "Counter", Some(previous), RenderRequest::new());
        let err = ctx.finish().unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookCountMismatch { component: "Counter", expected: 1, used: 0 }
        ));
        assert!(!HookContext::is_active());
    }

    #[test]
    fn first_evaluation_accepts_any_count() {
        let ctx = HookContext::enter(FiberId::new(), "Fresh", None, RenderRequest::new());
        assert!(ctx.finish().unwrap().is_empty());
    }

    #[test]
    fn frame_access_outside_render_fails() {
        let err = HookContext::with_frame(|_| Ok(())).unwrap_err();
        assert!(matches!(err, RenderError::HookOutsideRender));
    }
}
