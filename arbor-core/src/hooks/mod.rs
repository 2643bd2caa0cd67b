//! Hook Store
//!
//! Per-fiber state that survives across renders. Each component fiber owns an
//! ordered list of hooks; hook `i` of a fresh evaluation is derived from hook
//! `i` of the alternate fiber, so hooks must be requested unconditionally and
//! in the same order on every render.
//!
//! # Update flow
//!
//! 1. A [`StateSetter`] appends an action to its hook's queue and raises the
//!    root's [`RenderRequest`].
//! 2. The next `work_loop` call sees the request and restarts rendering from
//!    the committed tree.
//! 3. When the component is evaluated again, `use_state` folds the queued
//!    actions over the previous state and stores the result in a new hook.

mod context;
mod state;

pub(crate) use context::HookContext;
pub use state::{use_state, use_state_with, StateSetter};

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// A queued state transition over type-erased state.
pub(crate) type StateAction = Rc<dyn Fn(&Rc<dyn Any>) -> Rc<dyn Any>>;

/// Queue shared between a hook and the setters handed out for it.
pub(crate) type ActionQueue = Rc<RefCell<Vec<StateAction>>>;

/// Hook lists rarely grow past a handful of entries.
pub type HookList = SmallVec<[Hook; 4]>;

/// One state cell of a component fiber.
#[derive(Clone)]
pub struct Hook {
    state: Rc<dyn Any>,
    queue: ActionQueue,
}

impl Hook {
    pub(crate) fn new(state: Rc<dyn Any>) -> Self {
        Self {
            state,
            queue: Rc::default(),
        }
    }

    /// The state as of the render that produced this hook.
    pub fn state<T: Clone + 'static>(&self) -> Option<T> {
        self.state.downcast_ref::<T>().cloned()
    }

    /// Whether the stored state is a `T`.
    pub fn holds<T: 'static>(&self) -> bool {
        self.state.is::<T>()
    }

    /// Number of actions queued since the hook was created.
    pub fn pending_actions(&self) -> usize {
        self.queue.borrow().len()
    }

    pub(crate) fn queue(&self) -> ActionQueue {
        Rc::clone(&self.queue)
    }

    /// The state with every queued action applied in order.
    ///
    /// The queue itself is left intact: a render that is discarded and
    /// restarted reads the same actions again.
    pub(crate) fn drained_state(&self) -> Rc<dyn Any> {
        let actions: Vec<StateAction> = self.queue.borrow().clone();
        actions
            .iter()
            .fold(Rc::clone(&self.state), |state, action| action(&state))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("pending_actions", &self.pending_actions())
            .finish_non_exhaustive()
    }
}

/// Flag a root polls to learn that some state changed.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest(Rc<Cell<bool>>);

impl RenderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Clear the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(n: i32) -> StateAction {
        Rc::new(move |prev: &Rc<dyn Any>| {
            let prev = prev.downcast_ref::<i32>().copied().unwrap_or_default();
            Rc::new(prev + n) as Rc<dyn Any>
        })
    }

    #[test]
    fn drained_state_applies_actions_in_order() {
        let hook = Hook::new(Rc::new(1_i32));
        hook.queue().borrow_mut().push(add(2));
        hook.queue().borrow_mut().push(Rc::new(|prev: &Rc<dyn Any>| {
            let prev = prev.downcast_ref::<i32>().copied().unwrap_or_default();
            Rc::new(prev * 10) as Rc<dyn Any>
        }));

        assert_eq!(hook.drained_state().downcast_ref::<i32>(), Some(&30));
        assert_eq!(hook.state::<i32>(), Some(1));
    }

    #[test]
    fn draining_does_not_consume() {
        let hook = Hook::new(Rc::new(0_i32));
        hook.queue().borrow_mut().push(add(5));

        assert_eq!(hook.drained_state().downcast_ref::<i32>(), Some(&5));
        assert_eq!(hook.drained_state().downcast_ref::<i32>(), Some(&5));
        assert_eq!(hook.pending_actions(), 1);
    }

    #[test]
    fn state_type_is_checked() {
        let hook = Hook::new(Rc::new(String::from("x")));
        assert!(hook.holds::<String>());
        assert!(!hook.holds::<i32>());
        assert_eq!(hook.state::<i32>(), None);
    }

    #[test]
    fn render_request_is_taken_once() {
        let request = RenderRequest::new();
        let shared = request.clone();
        assert!(!request.take());

        shared.raise();
        assert!(request.is_raised());
        assert!(request.take());
        assert!(!request.take());
    }
}
