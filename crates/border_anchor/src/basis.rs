//! Billboard basis construction and distance scaling.

use glam::{Mat3, Quat, Vec3};

use crate::constants::{DISTANCE_SCALE_FACTOR, MAX_SCALE, MIN_SCALE};

/// Orthonormal right/up/back frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    /// Local +X.
    pub right: Vec3,
    /// Local +Y.
    pub up: Vec3,
    /// Local +Z, pointing back toward the viewer.
    pub back: Vec3,
}

impl Basis {
    /// Builds a frame whose +Z is `back`, keeping world up as close to
    /// +Y as possible.
    ///
    /// When `back` is parallel to world up there is no unique right axis;
    /// world +X is projected instead.
    #[must_use]
    pub fn from_back(back: Vec3) -> Self {
        let back = back.normalize();
        let forward = -back;
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() <= f32::EPSILON {
            right = Vec3::X - back * back.dot(Vec3::X);
        }
        let right = right.normalize();
        let up = right.cross(forward);
        Self { right, up, back }
    }

    /// Rotation taking the identity frame onto this one.
    #[must_use]
    pub fn to_quat(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right, self.up, self.back)).normalize()
    }
}

/// Uniform scale for an anchor seen from `distance` world units.
#[inline]
#[must_use]
pub fn distance_scale(distance: f32) -> f32 {
    (DISTANCE_SCALE_FACTOR * distance).clamp(MIN_SCALE, MAX_SCALE)
}
