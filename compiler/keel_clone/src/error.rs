//! Clone pass errors.

use keel_ir::{ModuleError, Span};

/// Errors from the clone pass.
///
/// All variants are recoverable values so callers can attach context
/// about the higher-level transformation that requested the clone.
/// Cloning is deterministic, so a failure reproduces identically on
/// retry: the remedy is fixing the input tree or the hook, not retrying.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// A reference that must already be resolved was absent from the
    /// identity map. This is a traversal-ordering bug in a handler,
    /// never a data problem.
    #[error("no identity mapping for {kind} `{text}`")]
    MissingMapping { text: String, kind: &'static str },

    /// `clone_node` was invoked on a whole-unit container root.
    #[error("cannot clone a whole unit via `clone_node`; use `clone_module`")]
    InvalidRoot,

    /// The verification pass found a node reachable from both trees.
    #[error("node `{text}` ({span}; {kind}) is reachable from both the original and the clone")]
    CloneOverlap {
        text: String,
        span: Span,
        kind: &'static str,
    },

    /// The destination arena rejected a top-level insertion.
    #[error(transparent)]
    Module(#[from] ModuleError),
}
