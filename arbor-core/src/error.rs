//! Error Types
//!
//! Every failure inside a render pass is fatal for that pass: the scheduler
//! discards the work-in-progress tree and returns the error to whoever drives
//! the work loop. The committed tree and the host tree are never touched by a
//! failed render.

use thiserror::Error;

use crate::fiber::FiberId;

/// Errors raised while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A state hook was requested while no component was being evaluated.
    #[error("use_state must be called from the top level of a component while it renders")]
    HookOutsideRender,

    /// A component requested a different number of hooks than it did on its
    /// previous render.
    #[error("component `{component}` used {used} hooks but its previous render used {expected}")]
    HookCountMismatch {
        /// Name of the component function.
        component: &'static str,
        /// Hooks on the alternate fiber.
        expected: usize,
        /// Hooks requested by this evaluation (at the point of detection).
        used: usize,
    },

    /// The state stored at a hook index has a different type than requested.
    #[error("hook {index} of component `{component}` holds a different state type")]
    HookTypeMismatch {
        /// Name of the component function.
        component: &'static str,
        /// Position of the hook in the fiber's hook list.
        index: usize,
    },

    /// A fiber that is not a function component reached the component path.
    #[error("fiber {0:?} is not a function component")]
    NotCallable(FiberId),

    /// A host element was created from an empty tag.
    #[error("host element tag must not be empty")]
    EmptyTag,

    /// Application component code failed.
    #[error("component error: {0}")]
    Component(String),
}

impl RenderError {
    /// Create an error from application component code.
    pub fn component(message: impl Into<String>) -> Self {
        Self::Component(message.into())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid scheduler config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its valid range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result alias for render operations.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
