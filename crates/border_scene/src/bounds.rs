//! Local-space bounding boxes and their per-frame world extents.
//!
//! Boxes are computed once and cached by the caller; [`WorldExtent`] is
//! rebuilt each frame from the cached box and the current world matrix.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::transform::{matrix_scale, matrix_translation};

/// Axis-aligned bounding box.
///
/// The empty box has `min = +∞` and `max = -∞`, so the first expansion
/// always wins.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// The empty sentinel.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates a box from its corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// True when no point has been accumulated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x == f32::INFINITY
    }

    /// Grows the box to include `point`.
    #[inline]
    pub fn expand_to(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Center point. Meaningless for the empty box.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the size along each axis. Meaningless for the empty box.
    #[inline]
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Computes the AABB of a node's renderable geometry in its own local
/// frame.
///
/// With `include_descendants`, geometry of every descendant is first
/// transformed into `root`'s frame. A subtree without geometry yields
/// [`Aabb::EMPTY`].
///
/// # Errors
///
/// Returns [`crate::SceneError::NodeNotFound`] if `root` does not exist.
pub fn compute_local_bounding_box<S>(scene: &S, root: NodeId, include_descendants: bool) -> SceneResult<Aabb>
where
    S: SceneGraph + ?Sized,
{
    // Validates the root before walking.
    scene.local_matrix(root)?;

    let mut bounds = Aabb::EMPTY;
    let mut stack: Vec<(NodeId, Mat4)> = vec![(root, Mat4::IDENTITY)];

    while let Some((id, to_root)) = stack.pop() {
        if let Some(geometry) = scene.geometry(id) {
            for &position in geometry.positions() {
                bounds.expand_to(to_root.transform_point3(position));
            }
        }

        if !include_descendants {
            break;
        }

        for &child in scene.children(id).iter().rev() {
            let local = scene.local_matrix(child)?;
            stack.push((child, to_root * local));
        }
    }

    Ok(bounds)
}

/// World-space data derived from a local box and a world matrix.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct WorldExtent {
    /// World-space centroid of the box.
    pub center: Vec3,
    /// Half size scaled by the world scale (box axes, not world axes).
    pub half_extents: Vec3,
    /// Vector from the node's world origin to `center`.
    pub offset_to_center: Vec3,
}

impl WorldExtent {
    /// Resolves a cached local box against the node's current world matrix.
    #[must_use]
    pub fn resolve(local: &Aabb, world: &Mat4) -> Self {
        let center = world.transform_point3(local.center());
        Self {
            center,
            half_extents: local.half_extents() * matrix_scale(world),
            offset_to_center: center - matrix_translation(world),
        }
    }
}
