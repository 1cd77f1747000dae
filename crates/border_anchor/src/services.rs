//! Collaborator seams injected into each anchor.
//!
//! Anchors receive typed handles at construction instead of looking
//! services up by name.

use std::sync::Arc;

use border_scene::{NodeId, Pose};
use glam::Vec3;
use parking_lot::{Mutex, RwLock};

use crate::anchor::AnchorId;

/// Supplies the surface point currently pointed at, if any.
pub trait PickingService {
    /// World-space point under the active pointer this frame.
    fn active_intersection(&self) -> Option<Vec3>;
}

/// Interpolates anchor transforms toward targets submitted by the core.
pub trait AnimationService {
    /// Starts tracking `target` on behalf of `anchor`.
    fn register(&mut self, anchor: AnchorId, target: NodeId, scale_enabled: bool);

    /// Stops tracking `anchor`. Unknown anchors are ignored.
    fn unregister(&mut self, anchor: AnchorId);

    /// Replaces the pose `anchor`'s node should animate toward.
    fn set_target(&mut self, anchor: AnchorId, pose: Pose);
}

/// Shared picking handle.
pub type SharedPicking = Arc<dyn PickingService>;

/// Shared animation handle.
pub type SharedAnimation = Arc<Mutex<dyn AnimationService>>;

/// Picking service whose intersection is set from outside each frame.
#[derive(Debug, Default)]
pub struct FixedPicking {
    point: RwLock<Option<Vec3>>,
}

impl FixedPicking {
    /// Creates a picker with no active intersection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the active intersection.
    pub fn set(&self, point: Option<Vec3>) {
        *self.point.write() = point;
    }
}

impl PickingService for FixedPicking {
    fn active_intersection(&self) -> Option<Vec3> {
        *self.point.read()
    }
}
