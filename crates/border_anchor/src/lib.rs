//! # Border Anchor
//!
//! Places an anchor node flush against the border of a reference node,
//! turned toward the viewer and optionally scaled by viewing distance.
//!
//! ## Frame Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ scheduler ─► BorderPositioningSystem::tick                   │
//! │                 │  (registration order)                      │
//! │                 ▼                                            │
//! │            AnchorInstance::tick                              │
//! │   Uninitialized ─► AwaitingTarget ─► Ready                   │
//! │                                        │ hidden→visible edge │
//! │                                        ▼                     │
//! │                             solve_border_placement           │
//! │                                        │                     │
//! │                  animate? ─► AnimationService::set_target    │
//! │                  else    ─► SceneGraph::set_world_matrix     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Rules
//!
//! 1. **Edge-triggered** - geometry work only on the frame the anchor opens
//! 2. **Cached bounds** - local boxes are recomputed only when dirty
//! 3. **Isolated failures** - one anchor erroring never stalls the rest

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod anchor;
pub mod animation;
pub mod basis;
pub mod config;
pub mod constants;
pub mod error;
pub mod registry;
pub mod services;
pub mod solver;

pub use anchor::{AnchorId, AnchorInstance, SharedAnchor, TickOutcome, VisibilityPhase};
pub use animation::{Easing, TransformAnimator};
pub use config::{AnchorConfig, AnchorSetConfig, AnimationConfig};
pub use error::{AnchorError, AnchorResult};
pub use registry::{BorderPositioningSystem, TickReport};
pub use services::{AnimationService, FixedPicking, PickingService, SharedAnimation, SharedPicking};
pub use solver::{solve_border_placement, BorderPlacement, PlacementStrategy, SolverInput, ViewerPose};
