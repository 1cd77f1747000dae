//! # Scene Nodes
//!
//! A node carries a local transform, a visibility flag, optional
//! renderable geometry and the names a selector can match against.
//! Hierarchy links are owned by [`crate::Scene`], not by the node.

use std::fmt;

use glam::{Mat4, Quat, Vec3};

/// Unique identifier for a node in a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Renderable geometry: vertex positions in the owning node's local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
}

impl Geometry {
    /// Creates geometry from raw vertex positions.
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    /// Axis-aligned box of the given half extents around `center`.
    #[must_use]
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let mut positions = Vec::with_capacity(8);
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    positions.push(center + half_extents * Vec3::new(sx, sy, sz));
                }
            }
        }
        Self { positions }
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// True when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A single node of the transform hierarchy.
#[derive(Clone, Debug)]
pub struct Node {
    /// Node name; `#name` selectors match it.
    pub name: String,
    /// Class tags; `.class` selectors match them.
    pub classes: Vec<String>,
    /// Transform relative to the parent.
    pub local: Mat4,
    /// Own visibility flag (not inherited).
    pub visible: bool,
    /// Renderable geometry, if any.
    pub geometry: Option<Geometry>,
}

impl Node {
    /// Creates a visible, empty node at the parent's origin.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
            local: Mat4::IDENTITY,
            visible: true,
            geometry: None,
        }
    }

    /// Adds a class tag.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets the local transform from its parts.
    #[must_use]
    pub fn with_transform(mut self, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.local = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        self
    }

    /// Sets only the local translation.
    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.local = Mat4::from_translation(translation);
        self
    }

    /// Attaches renderable geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Sets the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Returns true if the node carries the class tag.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}
