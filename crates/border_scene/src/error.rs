//! # Scene Error Types

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by scene lookups and transform writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node id does not refer to a live node.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A selector string could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// The offending selector text.
        selector: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A world matrix could not be written because the parent's world
    /// matrix has no inverse (zero scale somewhere up the chain).
    #[error("parent of {0} has a non-invertible world matrix")]
    NonInvertibleParent(NodeId),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
