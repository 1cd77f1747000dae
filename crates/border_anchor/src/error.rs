//! # Anchor Error Types
//!
//! None of these are fatal to the registry: each is reported for the
//! anchor that raised it and the frame moves on.

use border_scene::{NodeId, SceneError};
use thiserror::Error;

use crate::anchor::AnchorId;

/// Errors that can occur while initializing or updating an anchor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnchorError {
    /// The configured selector matched nothing under the owner.
    /// The anchor stays inert from then on.
    #[error("target {selector:?} not found under {owner}")]
    TargetNotFound {
        /// Owner whose subtree was searched.
        owner: NodeId,
        /// Selector text from the config.
        selector: String,
    },

    /// The scene has no viewing camera at initialization.
    #[error("scene has no viewer")]
    ViewerNotFound,

    /// The owner's reference mesh is absent this frame.
    #[error("owner {owner} has no reference mesh")]
    MissingMesh {
        /// Owner that was expected to carry the mesh.
        owner: NodeId,
    },

    /// A node has no renderable geometry yet; retried next frame.
    #[error("{node} has no renderable geometry")]
    DegenerateBoundingBox {
        /// Node whose box came back empty.
        node: NodeId,
    },

    /// The anchor is not in the registry.
    #[error("anchor {0} is not registered")]
    NotRegistered(AnchorId),

    /// Scene lookup or write failed.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// A config value is out of range or missing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A config file is not valid TOML for the schema.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl AnchorError {
    /// True for conditions expected to clear up on a later frame.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::MissingMesh { .. } | Self::DegenerateBoundingBox { .. })
    }
}

/// Result type for anchor operations.
pub type AnchorResult<T> = Result<T, AnchorError>;
