//! # Border Scene
//!
//! The scene-side half of border anchoring:
//! - A [`SceneGraph`] trait describing what the anchor core needs from a
//!   transform hierarchy (world matrices, visibility, lookup)
//! - [`Scene`], an arena implementation used by tests, benches and tools
//! - [`compute_local_bounding_box`], the local-space AABB extractor
//! - [`WorldExtent`], per-frame world-space data derived from a cached box
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Node tree ──► local AABB (cached) ──► WorldExtent   │
//! │      │               ▲                    │          │
//! │  world matrix ───────┴────────────────────┘          │
//! └──────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bounds;
pub mod error;
pub mod graph;
pub mod node;
pub mod selector;
pub mod transform;

pub use bounds::{compute_local_bounding_box, Aabb, WorldExtent};
pub use error::{SceneError, SceneResult};
pub use graph::{Scene, SceneGraph};
pub use node::{Geometry, Node, NodeId};
pub use selector::NodeSelector;
pub use transform::Pose;
