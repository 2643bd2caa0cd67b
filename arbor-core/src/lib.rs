//! Arbor Core
//!
//! This crate provides the rendering core of the Arbor UI framework. It
//! implements:
//!
//! - Elements: immutable descriptions of the desired tree
//! - Fiber reconciliation against the previously committed tree
//! - A cooperative, interruptible work loop
//! - An atomic commit phase driving a pluggable host
//! - Per-component state through hooks
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `element`: elements, props and child normalization
//! - `fiber`: the fiber arena and the positional child diff
//! - `hooks`: the state hook store and its evaluation context
//! - `scheduler`: the [`Root`], its work loop and commit phase
//! - `host`: the [`HostAdapter`] boundary, prop conventions and an in-memory host
//!
//! Everything is single-threaded. A [`Root`] is driven by whatever idle
//! trigger the embedding provides, one deadline-bounded slice at a time.
//!
//! # Example
//!
//! ```rust
//! use arbor_core::{component, create_element, use_state, Child, MemoryHost, Props, RenderResult, Root};
//!
//! fn counter(_: &Props) -> RenderResult {
//!     let (count, set_count) = use_state(1)?;
//!     let props = Props::new().on("onClick", move |_| set_count.update(|c| c + 1));
//!     Ok(create_element("h1", props, [Child::from("Count: "), Child::from(count)]).into())
//! }
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut root = Root::new(host);
//!
//! root.render(create_element(component(counter), Props::new(), [Child::Null]), Some(container));
//! root.flush().unwrap();
//! assert_eq!(root.host().text_content(container), "Count: 1");
//!
//! let h1 = root.host().children(container)[0];
//! root.host().dispatch(h1, "click");
//! root.flush().unwrap();
//! assert_eq!(root.host().text_content(container), "Count: 2");
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use element::{
    component, create_element, normalize_children, text_element, Child, Component, Element,
    ElementType, EventHandler, PropValue, Props, RenderResult,
};
pub use error::{ConfigError, RenderError, Result};
pub use fiber::{EffectTag, Fiber, FiberId, FiberKind};
pub use hooks::{use_state, use_state_with, StateSetter};
pub use host::{Event, HostAdapter, HostNodeId, MemoryHost, Mutation};
pub use scheduler::{
    CommitSummary, CommittedEffect, Deadline, IdleDeadline, Root, UnitBudget, Unbounded,
    WorkStatus,
};
