//! # Placement Constants
//!
//! The anchor only looks right when these match exactly. Changing any of
//! them changes where every menu lands.

// =============================================================================
// BORDER PLACEMENT
// =============================================================================

/// Clearance between the reference's border and the anchor, in world units.
pub const BORDER_MARGIN: f32 = 0.02;

/// Fraction of the way from the viewer to the pointed-at surface point.
pub const INTERSECTION_BLEND: f32 = 0.8;

// =============================================================================
// DISTANCE SCALING
// =============================================================================

/// Scale gained per world unit of viewing distance.
pub const DISTANCE_SCALE_FACTOR: f32 = 0.45;

/// Smallest uniform scale an anchor is given.
pub const MIN_SCALE: f32 = 0.05;

/// Largest uniform scale an anchor is given.
pub const MAX_SCALE: f32 = 4.0;

// =============================================================================
// SCENE SLOTS
// =============================================================================

/// Object slot on the owner that holds the reference geometry.
pub const MESH_SLOT: &str = "mesh";
