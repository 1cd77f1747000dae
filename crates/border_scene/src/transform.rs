//! Matrix decomposition helpers and the [`Pose`] value type.
//!
//! Scale is taken as the length of each basis column, so it is always
//! non-negative. Rotation is taken from the normalized columns.

use glam::{Mat3, Mat4, Quat, Vec3};

/// World-space translation of a matrix.
#[inline]
#[must_use]
pub fn matrix_translation(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Per-axis scale of a matrix (basis column lengths).
#[inline]
#[must_use]
pub fn matrix_scale(m: &Mat4) -> Vec3 {
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// Pure rotation of a matrix with scale removed.
#[must_use]
pub fn matrix_rotation(m: &Mat4) -> Quat {
    let basis = Mat3::from_cols(
        m.x_axis.truncate().normalize_or_zero(),
        m.y_axis.truncate().normalize_or_zero(),
        m.z_axis.truncate().normalize_or_zero(),
    );
    Quat::from_mat3(&basis).normalize()
}

/// Translation, rotation and non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Translation.
    pub translation: Vec3,
    /// Unit rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Pose {
    /// Identity pose.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a pose from its parts.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    /// Decomposes a matrix.
    #[must_use]
    pub fn from_matrix(m: &Mat4) -> Self {
        Self {
            translation: matrix_translation(m),
            rotation: matrix_rotation(m),
            scale: matrix_scale(m),
        }
    }

    /// Composes the pose into a matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Blends toward `other`; rotation uses slerp.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
