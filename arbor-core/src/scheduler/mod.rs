//! Render Scheduler
//!
//! A [`Root`] owns everything one mounted tree needs: the host adapter, the
//! fiber arena, the committed tree, and the state of the render in progress.
//!
//! # Phases
//!
//! 1. **Render** ([`Root::work_loop`]): build the work-in-progress tree one
//!    fiber at a time, yielding to the caller between units when the deadline
//!    runs short. Nothing visible changes.
//! 2. **Commit**: once the tree is complete, apply every recorded effect to
//!    the host in one uninterrupted pass and make the new tree current.
//!
//! # Example
//!
//! ```rust
//! use arbor_core::{create_element, MemoryHost, Props, Root};
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut root = Root::new(host);
//!
//! root.render(create_element("h1", Props::new().with("title", "foo"), ["Hello"]), Some(container));
//! root.flush().unwrap();
//!
//! assert_eq!(root.host().to_html(container), "<root><h1 title=\"foo\">Hello</h1></root>");
//! ```

mod commit;
mod deadline;
mod work_loop;

pub use commit::{CommitSummary, CommittedEffect};
pub use deadline::{Deadline, IdleDeadline, UnitBudget, Unbounded};

use std::rc::Rc;

use tracing::debug;

use crate::config::SchedulerConfig;
use crate::element::{Element, Props};
use crate::error::{ConfigError, Result};
use crate::fiber::{Fiber, FiberArena, FiberId};
use crate::hooks::RenderRequest;
use crate::host::HostAdapter;

/// Outcome of one [`Root::work_loop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing to do.
    Idle,
    /// The deadline ran short with units of work left.
    Yielded,
    /// The work-in-progress tree was completed and committed.
    Committed,
}

/// A mounted tree and its scheduler state.
pub struct Root<H: HostAdapter> {
    host: H,
    config: SchedulerConfig,
    fibers: FiberArena<H::Node>,
    current: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    request: RenderRequest,
    last_commit: Option<CommitSummary<H::Node>>,
}

impl<H: HostAdapter> Root<H> {
    /// Create a root over `host` with the default scheduler configuration.
    pub fn new(host: H) -> Self {
        Self::build(host, SchedulerConfig::default())
    }

    /// Create a root over `host` with a custom configuration.
    ///
    /// Fails if `config` does not pass [`SchedulerConfig::validate`].
    pub fn with_config(host: H, config: SchedulerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(host, config))
    }

    fn build(host: H, config: SchedulerConfig) -> Self {
        Self {
            host,
            config,
            fibers: FiberArena::new(),
            current: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            request: RenderRequest::new(),
            last_commit: None,
        }
    }

    /// Schedule rendering `element` into `container`.
    ///
    /// Only sets up the work-in-progress root; the work itself happens in
    /// [`work_loop`](Self::work_loop). Any render already in flight is
    /// discarded. A missing container makes this a no-op.
    pub fn render(&mut self, element: Element, container: Option<H::Node>) {
        let Some(container) = container else {
            debug!("render called without a mount point; ignoring");
            return;
        };
        self.discard_work_in_progress();
        // Pending state updates are picked up by this render.
        self.request.take();

        let mut props = Props::new();
        props.set_children(vec![element]);
        let root = self.begin_root(container, Rc::new(props));
        debug!(root = root.raw(), "scheduled render");
    }

    /// Create a work-in-progress root over `container` whose alternate is the
    /// committed root, and start work at it.
    pub(crate) fn begin_root(&mut self, container: H::Node, props: Rc<Props>) -> FiberId {
        let mut fiber = Fiber::root(container, props);
        fiber.alternate = self.current;
        let id = self.fibers.insert(fiber);
        if let Some(current) = self.current.and_then(|cur| self.fibers.get_mut(cur)) {
            current.alternate = Some(id);
        }
        self.wip_root = Some(id);
        self.next_unit = Some(id);
        self.deletions.clear();
        id
    }

    /// Run the work loop with an unbounded deadline until nothing is left,
    /// including renders requested by state updates made while rendering.
    pub fn flush(&mut self) -> Result<()> {
        while self.work_loop(&Unbounded)? != WorkStatus::Idle {}
        Ok(())
    }

    /// Whether a render is in progress or has been requested.
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || (self.current.is_some() && self.request.is_raised())
    }

    /// Remove everything this root rendered from the container and forget
    /// the committed tree.
    pub fn unmount(&mut self) {
        self.discard_work_in_progress();
        if let Some(current) = self.current.take() {
            if let Some(container) = self.fibers.get(current).and_then(|f| f.node().cloned()) {
                for child in self.fibers.children(current) {
                    for node in self.fibers.top_host_nodes(child) {
                        self.host.remove_child(&container, &node);
                    }
                }
            }
        }
        self.fibers.clear();
        self.request.take();
        self.last_commit = None;
        debug!("unmounted root");
    }

    /// The host adapter this root renders into.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to drain its mutation log.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The scheduler configuration in effect.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The root fiber of the committed tree.
    pub fn current(&self) -> Option<FiberId> {
        self.current
    }

    /// The root fiber of the render in progress.
    pub fn work_in_progress(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Look up a fiber of either tree.
    pub fn fiber(&self, id: FiberId) -> Option<&Fiber<H::Node>> {
        self.fibers.get(id)
    }

    /// The arena holding every live fiber.
    pub fn fibers(&self) -> &FiberArena<H::Node> {
        &self.fibers
    }

    /// Effects applied by the most recent commit.
    pub fn last_commit(&self) -> Option<&CommitSummary<H::Node>> {
        self.last_commit.as_ref()
    }
}

impl<H: HostAdapter + std::fmt::Debug> std::fmt::Debug for Root<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root")
            .field("host", &self.host)
            .field("current", &self.current)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .field("fibers", &self.fibers.len())
            .finish_non_exhaustive()
    }
}
