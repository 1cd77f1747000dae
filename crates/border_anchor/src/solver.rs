//! # Border Transform Solver
//!
//! Pure placement math. Given the world extents of the reference ("mesh")
//! and the anchor, the viewer pose and an optional pointed-at point,
//! computes where the anchor goes, how it is turned and how big it is.
//!
//! ## Strategies
//!
//! - **Flat**: centered on the reference, pushed out along its local Z by
//!   both half depths plus [`BORDER_MARGIN`]. Flipped to the other face
//!   (and turned 180°) when the reference's forward faces the viewer.
//! - **Intersection**: [`INTERSECTION_BLEND`] of the way from the viewer
//!   to the pointed-at point.
//! - **Sphere**: on the reference's bounding sphere, on the viewer's side.

use std::f32::consts::PI;

use border_scene::{Pose, WorldExtent};
use glam::{Mat4, Quat, Vec3};

use crate::basis::{distance_scale, Basis};
use crate::constants::{BORDER_MARGIN, INTERSECTION_BLEND};

/// World-space pose of the viewing camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerPose {
    /// Camera position.
    pub position: Vec3,
    /// Camera rotation (scale removed).
    pub rotation: Quat,
}

impl ViewerPose {
    /// Reads a viewer pose off a camera world matrix.
    #[must_use]
    pub fn from_world_matrix(world: &Mat4) -> Self {
        let pose = Pose::from_matrix(world);
        Self {
            position: pose.translation,
            rotation: pose.rotation,
        }
    }

    /// The camera's local +Z in world space.
    #[must_use]
    pub fn back(&self) -> Vec3 {
        (self.rotation * Vec3::Z).normalize()
    }
}

/// Which placement branch produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Against the reference's Z face; `flipped` means the far face.
    Flat {
        /// Placed on the face opposite the reference's local +Z.
        flipped: bool,
    },
    /// Blended toward the pointed-at surface point.
    Intersection,
    /// On the reference's bounding sphere.
    Sphere,
}

/// Everything the solver reads for one placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverInput {
    /// Anchor extents this frame.
    pub target: WorldExtent,
    /// Anchor's current world scale.
    pub target_scale: Vec3,
    /// Reference extents this frame.
    pub mesh: WorldExtent,
    /// Reference world rotation.
    pub mesh_rotation: Quat,
    /// Viewer pose this frame.
    pub viewer: ViewerPose,
    /// Pointed-at surface point, if any.
    pub intersection: Option<Vec3>,
    /// Immersive viewing mode.
    pub immersive: bool,
    /// Flat placement strategy.
    pub is_flat: bool,
    /// Scale by viewing distance.
    pub scale: bool,
}

/// Solver output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderPlacement {
    /// Desired world pose of the anchor.
    pub pose: Pose,
    /// Where the anchor's visual center should land.
    pub center: Vec3,
    /// Branch taken.
    pub strategy: PlacementStrategy,
}

impl BorderPlacement {
    /// Composed world matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        self.pose.to_matrix()
    }
}

/// Reference forward: local -Z in world space.
#[inline]
#[must_use]
pub fn mesh_forward(mesh_rotation: Quat) -> Vec3 {
    mesh_rotation * Vec3::NEG_Z
}

/// Offset from the reference center to the anchor center for flat
/// placement, in world space.
#[must_use]
pub fn flat_border_offset(mesh: &WorldExtent, target: &WorldExtent, mesh_rotation: Quat, flipped: bool) -> Vec3 {
    let depth = mesh.half_extents.z + target.half_extents.z + BORDER_MARGIN;
    let depth = if flipped { -depth } else { depth };
    mesh_rotation * Vec3::new(0.0, 0.0, depth)
}

/// Divides `offset` by `scale` per axis, leaving zero-scale axes at zero.
fn unscale(offset: Vec3, scale: Vec3) -> Vec3 {
    Vec3::select(scale.cmpeq(Vec3::ZERO), Vec3::ZERO, offset / scale)
}

/// Solves one border placement.
///
/// A flipped flat anchor is turned half a revolution about the reference's
/// own up axis (`mesh_rotation * RotY(π)`), so a tilted reference keeps
/// its tilt on the far face.
#[must_use]
pub fn solve_border_placement(input: &SolverInput) -> BorderPlacement {
    let viewer_position = input.viewer.position;
    let center_to_viewer = viewer_position - input.mesh.center;
    let flipped = input.is_flat && mesh_forward(input.mesh_rotation).dot(center_to_viewer) > 0.0;

    let (center, strategy) = if input.is_flat {
        let offset = flat_border_offset(&input.mesh, &input.target, input.mesh_rotation, flipped);
        (input.mesh.center + offset, PlacementStrategy::Flat { flipped })
    } else if let Some(point) = input.intersection {
        (viewer_position.lerp(point, INTERSECTION_BLEND), PlacementStrategy::Intersection)
    } else {
        let radius = input.mesh.half_extents.length();
        let toward_viewer = center_to_viewer.normalize_or_zero();
        (input.mesh.center + toward_viewer * radius, PlacementStrategy::Sphere)
    };

    let scale = if input.scale {
        let viewer_to_center = center - viewer_position;
        Vec3::splat(distance_scale(viewer_to_center.length()))
    } else {
        input.target_scale
    };

    // Without distance scaling every strategy parks the anchor on the
    // reference's Z face; the solved `center` is only reported.
    let position = if input.scale {
        center - unscale(input.target.offset_to_center, input.target_scale) * scale
    } else {
        input.mesh.center + flat_border_offset(&input.mesh, &input.target, input.mesh_rotation, flipped)
    };

    let rotation = if input.is_flat {
        if flipped {
            input.mesh_rotation * Quat::from_rotation_y(PI)
        } else {
            input.mesh_rotation
        }
    } else {
        let back = if input.immersive {
            (viewer_position - position).normalize()
        } else {
            input.viewer.back()
        };
        Basis::from_back(back).to_quat()
    };

    tracing::trace!(?strategy, %position, %scale, "Solved border placement");

    BorderPlacement {
        pose: Pose::new(position, rotation, scale),
        center,
        strategy,
    }
}
