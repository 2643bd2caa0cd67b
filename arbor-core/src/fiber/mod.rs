//! Fiber Tree
//!
//! A fiber is one position in the rendered tree for one render generation.
//! Two generations coexist: the committed tree (`current`) and the tree being
//! built (work in progress). Corresponding fibers point at each other through
//! `alternate`.
//!
//! # Structure
//!
//! - [`node`]: the fiber record and its identifiers.
//! - [`arena`]: ID-indexed storage and tree walks.
//! - [`reconcile`]: positional diff of new elements against old fibers.

mod arena;
mod node;
mod reconcile;

pub use arena::FiberArena;
pub use node::{EffectTag, Fiber, FiberId, FiberKind};
pub use reconcile::reconcile_children;
