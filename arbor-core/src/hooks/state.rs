//! State Hook

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::trace;

use super::context::HookContext;
use super::{ActionQueue, Hook, RenderRequest, StateAction};
use crate::error::{RenderError, Result};

/// Declare a piece of component state.
///
/// Returns the current value and a setter. On the first evaluation of a
/// fiber the value is `initial`; afterwards it is the previous value with
/// every queued update applied.
///
/// ```rust
/// use arbor_core::{create_element, component, use_state, Child, MemoryHost, Props, Root};
///
/// fn counter(_: &Props) -> arbor_core::RenderResult {
///     let (count, _set) = use_state(0)?;
///     Ok(create_element("span", Props::new(), [count]).into())
/// }
///
/// let mut host = MemoryHost::new();
/// let container = host.create_container("root");
/// let mut root = Root::new(host);
/// root.render(create_element(component(counter), Props::new(), [Child::Null]), Some(container));
/// root.flush().unwrap();
/// assert_eq!(root.host().text_content(container), "0");
/// ```
pub fn use_state<T: Clone + 'static>(initial: T) -> Result<(T, StateSetter<T>)> {
    use_state_with(move || initial)
}

/// Like [`use_state`], computing the initial value only on first evaluation.
pub fn use_state_with<T, F>(init: F) -> Result<(T, StateSetter<T>)>
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    let (index, component, previous, request) = HookContext::with_frame(|frame| {
        let index = frame.requested;
        frame.requested += 1;
        let previous = match &frame.previous {
            None => None,
            Some(list) => match list.get(index) {
                Some(hook) => Some(hook.clone()),
                None => {
                    return Err(RenderError::HookCountMismatch {
                        component: frame.component,
                        expected: list.len(),
                        used: index + 1,
                    })
                }
            },
        };
        Ok((index, frame.component, previous, frame.request.clone()))
    })?;

    let mismatch = || RenderError::HookTypeMismatch { component, index };
    let state: Rc<dyn Any> = match previous {
        Some(hook) if !hook.holds::<T>() => return Err(mismatch()),
        Some(hook) => {
            trace!(component, index, pending = hook.pending_actions(), "draining state hook");
            hook.drained_state()
        }
        None => Rc::new(init()),
    };
    let value = state.downcast_ref::<T>().cloned().ok_or_else(mismatch)?;

    let hook = Hook::new(state);
    let setter = StateSetter {
        queue: hook.queue(),
        request,
        marker: PhantomData,
    };
    HookContext::with_frame(|frame| {
        frame.hooks.push(hook);
        Ok(())
    })?;

    Ok((value, setter))
}

/// Schedules updates to one state hook.
///
/// Updates are queued, not applied: the new value is visible from the next
/// evaluation of the owning component on.
pub struct StateSetter<T> {
    queue: ActionQueue,
    request: RenderRequest,
    marker: PhantomData<fn(T) -> T>,
}

impl<T: Clone + 'static> StateSetter<T> {
    /// Replace the state.
    pub fn set(&self, value: T) {
        self.push(Rc::new(move |_: &Rc<dyn Any>| -> Rc<dyn Any> {
            Rc::new(value.clone()) as Rc<dyn Any>
        }));
    }

    /// Derive the new state from the previous one.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&T) -> T + 'static,
    {
        self.push(Rc::new(move |prev: &Rc<dyn Any>| -> Rc<dyn Any> {
            match prev.downcast_ref::<T>() {
                Some(prev) => Rc::new(f(prev)) as Rc<dyn Any>,
                None => Rc::clone(prev),
            }
        }));
    }

    fn push(&self, action: StateAction) {
        self.queue.borrow_mut().push(action);
        self.request.raise();
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
            request: self.request.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::FiberId;
    use crate::hooks::HookList;

    /// Evaluate `body` as a component with the given previous hooks.
    fn evaluate<R>(
        previous: Option<HookList>,
        request: &RenderRequest,
        body: impl FnOnce() -> Result<R>,
    ) -> Result<(R, HookList)> {
        let ctx = HookContext::enter(FiberId::new(), "Test", previous, request.clone());
        let out = body();
        let hooks = ctx.finish();
        let out = out?;
        Ok((out, hooks?))
    }

    #[test]
    fn first_evaluation_uses_initial() {
        let request = RenderRequest::new();
        let ((a, b), hooks) =
            evaluate(None, &request, || Ok((use_state(1)?.0, use_state("x")?.0))).unwrap();
        assert_eq!((a, b), (1, "x"));
        assert_eq!(hooks.len(), 2);
        assert!(!request.is_raised());
    }

    #[test]
    fn queued_updates_apply_on_next_evaluation() {
        let request = RenderRequest::new();
        let (setter, hooks) = evaluate(None, &request, || Ok(use_state(0)?.1)).unwrap();

        setter.update(|x| x + 1);
        setter.update(|x| x + 1);
        assert!(request.is_raised());

        let (value, next) = evaluate(Some(hooks), &request, || Ok(use_state(0)?.0)).unwrap();
        assert_eq!(value, 2);
        assert_eq!(next[0].pending_actions(), 0);
        assert_eq!(next[0].state::<i32>(), Some(2));
    }

    #[test]
    fn set_replaces_state() {
        let request = RenderRequest::new();
        let (setter, hooks) =
            evaluate(None, &request, || Ok(use_state(String::from("a"))?.1)).unwrap();
        setter.set("b".to_string());
        setter.update(|s| format!("{s}c"));

        let (value, _) =
            evaluate(Some(hooks), &request, || Ok(use_state(String::new())?.0)).unwrap();
        assert_eq!(value, "bc");
    }

    #[test]
    fn lazy_initializer_runs_once() {
        let request = RenderRequest::new();
        let (_, hooks) = evaluate(None, &request, || use_state_with(|| 7)).unwrap();
        let ((value, _), _) = evaluate(Some(hooks), &request, || {
            use_state_with(|| -> i32 { panic!("initializer ran twice") })
        })
        .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn changed_state_type_is_rejected() {
        let request = RenderRequest::new();
        let (_, hooks) = evaluate(None, &request, || use_state(1_i32)).unwrap();
        let err = evaluate(Some(hooks), &request, || use_state("one")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookTypeMismatch { component: "Test", index: 0 }
        ));
    }

    #[test]
    fn extra_hook_is_rejected() {
        let request = RenderRequest::new();
        let (_, hooks) = evaluate(None, &request, || use_state(1)).unwrap();
        let err = evaluate(Some(hooks), &request, || {
            use_state(1)?;
            use_state(2)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookCountMismatch { expected: 1, used: 2, .. }
        ));
    }

    #[test]
    fn missing_hook_is_rejected() {
        let request = RenderRequest::new();
        let (_, hooks) = evaluate(None, &request, || {
            use_state(1)?;
            use_state(2)
        })
        .unwrap();
        let err = evaluate(Some(hooks), &request, || use_state(1)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookCountMismatch { expected: 2, used: 1, .. }
        ));
    }

    #[test]
    fn use_state_outside_render_fails() {
        assert!(matches!(use_state(0), Err(RenderError::HookOutsideRender)));
    }
}
