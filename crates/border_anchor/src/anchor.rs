//! # Anchor Instance
//!
//! One anchor owns its config, its cached bounds and its visibility
//! history. Lifecycle:
//!
//! ```text
//! Uninitialized ──first tick──► AwaitingTarget ──target found──► Ready
//!                                     │
//!                                     └── not found: inert forever
//! ```
//!
//! Inside `Ready`, only the hidden→visible edge runs the solver. Ticks
//! where the anchor stays visible, or is hidden, do no geometric work.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use border_scene::{compute_local_bounding_box, Aabb, NodeId, SceneGraph, WorldExtent};
use border_scene::transform::{matrix_rotation, matrix_scale};
use parking_lot::Mutex;

use crate::config::AnchorConfig;
use crate::constants::MESH_SLOT;
use crate::error::{AnchorError, AnchorResult};
use crate::services::{SharedAnimation, SharedPicking};
use crate::solver::{solve_border_placement, BorderPlacement, SolverInput, ViewerPose};

static NEXT_ANCHOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an anchor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

impl AnchorId {
    /// Creates an anchor ID from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocates a process-unique ID.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ANCHOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Where the anchor's visibility stands this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityPhase {
    /// Not visible.
    Hidden,
    /// Became visible this tick.
    JustOpened,
    /// Visible this tick and the last.
    Visible,
}

impl VisibilityPhase {
    /// Classifies a tick from the previous and current visibility.
    #[must_use]
    pub const fn from_edge(was_visible: bool, is_visible: bool) -> Self {
        match (was_visible, is_visible) {
            (_, false) => Self::Hidden,
            (false, true) => Self::JustOpened,
            (true, true) => Self::Visible,
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The anchor never found its target and does nothing.
    Inactive,
    /// Ready, but no placement was due.
    Idle(VisibilityPhase),
    /// The anchor opened and was placed.
    Placed(BorderPlacement),
}

/// Shared anchor handle; the owner keeps it alive, the registry does not.
pub type SharedAnchor = Arc<Mutex<AnchorInstance>>;

/// Everything fixed at construction.
struct Bindings {
    id: AnchorId,
    owner: NodeId,
    config: AnchorConfig,
    picking: SharedPicking,
    animation: SharedAnimation,
}

/// Caches and flags that exist once the target is resolved.
#[derive(Debug, Clone)]
struct ReadyState {
    target: NodeId,
    viewer: NodeId,
    registered_with_animation: bool,
    previous_mesh: Option<NodeId>,
    mesh_box: Aabb,
    target_box: Aabb,
    target_box_dirty: bool,
    was_visible: bool,
}

enum Lifecycle {
    Uninitialized,
    AwaitingTarget,
    Ready(ReadyState),
}

/// One anchored node and the reference it hugs.
pub struct AnchorInstance {
    bindings: Bindings,
    lifecycle: Lifecycle,
}

impl fmt::Debug for AnchorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorInstance")
            .field("id", &self.bindings.id)
            .field("owner", &self.bindings.owner)
            .field("config", &self.bindings.config)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl AnchorInstance {
    /// Creates an anchor on `owner`. Nothing is resolved until the first
    /// tick.
    #[must_use]
    pub fn new(owner: NodeId, config: AnchorConfig, picking: SharedPicking, animation: SharedAnimation) -> Self {
        Self {
            bindings: Bindings {
                id: AnchorId::next(),
                owner,
                config,
                picking,
                animation,
            },
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Wraps the anchor in a shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedAnchor {
        Arc::new(Mutex::new(self))
    }

    /// This anchor's ID.
    #[must_use]
    pub fn id(&self) -> AnchorId {
        self.bindings.id
    }

    /// Node the anchor belongs to.
    #[must_use]
    pub fn owner(&self) -> NodeId {
        self.bindings.owner
    }

    /// Immutable options.
    #[must_use]
    pub fn config(&self) -> &AnchorConfig {
        &self.bindings.config
    }

    /// True once the target has been resolved.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    /// True once initialization has been attempted.
    #[must_use]
    pub fn tried_to_initialize(&self) -> bool {
        !matches!(self.lifecycle, Lifecycle::Uninitialized)
    }

    /// Resolved target node.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        match &self.lifecycle {
            Lifecycle::Ready(state) => Some(state.target),
            _ => None,
        }
    }

    /// Invalidates the cached target box; it is recomputed on the next
    /// opening.
    pub fn mark_dirty(&mut self) {
        if let Lifecycle::Ready(state) = &mut self.lifecycle {
            state.target_box_dirty = true;
        }
    }

    /// Detaches from the animation service, if registered there.
    pub fn remove(&mut self) {
        if let Lifecycle::Ready(state) = &mut self.lifecycle {
            if state.registered_with_animation {
                self.bindings.animation.lock().unregister(self.bindings.id);
                state.registered_with_animation = false;
            }
        }
    }

    /// Runs one frame of the anchor.
    ///
    /// # Errors
    ///
    /// - [`AnchorError::TargetNotFound`] / [`AnchorError::ViewerNotFound`]
    ///   once, on the tick that fails initialization
    /// - [`AnchorError::MissingMesh`] while the owner has no reference mesh
    /// - [`AnchorError::DegenerateBoundingBox`] while a box is still empty;
    ///   the opening is retried next tick
    /// - [`AnchorError::Scene`] if a scene read or write fails
    pub fn tick(&mut self, scene: &mut dyn SceneGraph) -> AnchorResult<TickOutcome> {
        match self.lifecycle {
            Lifecycle::AwaitingTarget => return Ok(TickOutcome::Inactive),
            Lifecycle::Uninitialized => {
                self.lifecycle = Lifecycle::AwaitingTarget;
                self.lifecycle = Lifecycle::Ready(self.bindings.initialize(&*scene)?);
            }
            Lifecycle::Ready(_) => {}
        }

        let Lifecycle::Ready(state) = &mut self.lifecycle else {
            return Ok(TickOutcome::Inactive);
        };

        let owner = self.bindings.owner;
        let mesh = scene.object(owner, MESH_SLOT).ok_or(AnchorError::MissingMesh { owner })?;

        let is_visible = scene.is_visible(state.target);
        let phase = VisibilityPhase::from_edge(state.was_visible, is_visible);
        if phase != VisibilityPhase::JustOpened {
            state.was_visible = is_visible;
            return Ok(TickOutcome::Idle(phase));
        }

        // A failed opening leaves `was_visible` unset so the next tick
        // sees the edge again.
        let placement = state.place(&self.bindings, mesh, scene)?;
        state.was_visible = true;
        Ok(TickOutcome::Placed(placement))
    }
}

impl Bindings {
    fn initialize(&self, scene: &dyn SceneGraph) -> AnchorResult<ReadyState> {
        let selector = self.config.selector()?;
        let viewer = scene.viewer().ok_or(AnchorError::ViewerNotFound)?;
        let Some(target) = scene.find_in_subtree(self.owner, &selector) else {
            return Err(AnchorError::TargetNotFound {
                owner: self.owner,
                selector: self.config.target.clone(),
            });
        };

        if self.config.animate {
            self.animation.lock().register(self.id, target, self.config.scale);
        }

        tracing::info!(
            "Anchor {} ready: target {} ({}) under {}",
            self.id,
            target,
            selector,
            self.owner
        );

        Ok(ReadyState {
            target,
            viewer,
            registered_with_animation: self.config.animate,
            previous_mesh: None,
            mesh_box: Aabb::EMPTY,
            target_box: Aabb::EMPTY,
            target_box_dirty: true,
            was_visible: false,
        })
    }
}

impl ReadyState {
    fn place(&mut self, bindings: &Bindings, mesh: NodeId, scene: &mut dyn SceneGraph) -> AnchorResult<BorderPlacement> {
        if self.target_box_dirty {
            self.target_box = compute_local_bounding_box(&*scene, self.target, true)?;
            if self.target_box.is_empty() {
                return Err(AnchorError::DegenerateBoundingBox { node: self.target });
            }
            self.target_box_dirty = false;
        }
        let target_world = scene.world_matrix(self.target)?;
        let target = WorldExtent::resolve(&self.target_box, &target_world);

        if self.previous_mesh != Some(mesh) {
            let mesh_box = compute_local_bounding_box(&*scene, mesh, true)?;
            if mesh_box.is_empty() {
                return Err(AnchorError::DegenerateBoundingBox { node: mesh });
            }
            if let Some(previous) = self.previous_mesh {
                tracing::debug!("Anchor {} reference changed: {} -> {}", bindings.id, previous, mesh);
            }
            self.mesh_box = mesh_box;
            self.previous_mesh = Some(mesh);
        }
        let mesh_world = scene.world_matrix(mesh)?;
        let mesh_extent = WorldExtent::resolve(&self.mesh_box, &mesh_world);

        let viewer = ViewerPose::from_world_matrix(&scene.world_matrix(self.viewer)?);

        let input = SolverInput {
            target,
            target_scale: matrix_scale(&target_world),
            mesh: mesh_extent,
            mesh_rotation: matrix_rotation(&mesh_world),
            viewer,
            intersection: bindings.picking.active_intersection(),
            immersive: scene.is_immersive(),
            is_flat: bindings.config.is_flat,
            scale: bindings.config.scale,
        };
        let placement = solve_border_placement(&input);

        if bindings.config.animate {
            bindings.animation.lock().set_target(bindings.id, placement.pose);
        } else {
            scene.set_world_matrix(self.target, placement.to_matrix())?;
        }

        tracing::debug!(
            "Anchor {} placed {} at {} ({:?})",
            bindings.id,
            self.target,
            placement.pose.translation,
            placement.strategy
        );
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TransformAnimator;
    use crate::services::FixedPicking;
    use border_scene::{Geometry, Node, Scene};
    use glam::Vec3;

    struct Fixture {
        scene: Scene,
        owner: NodeId,
        target: NodeId,
        picking: Arc<FixedPicking>,
        animator: Arc<Mutex<TransformAnimator>>,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let owner = scene.add_root(Node::new("object"));
        let mesh = scene
            .add_child(owner, Node::new("model").with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::ONE)))
            .unwrap();
        scene.set_object(owner, MESH_SLOT, Some(mesh)).unwrap();
        let target = scene
            .add_child(
                owner,
                Node::new("menu")
                    .with_visible(false)
                    .with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::splat(0.5))),
            )
            .unwrap();
        let camera = scene.add_root(Node::new("viewing-camera").with_translation(Vec3::new(0.0, 0.0, 5.0)));
        scene.set_viewer(Some(camera));

        Fixture {
            scene,
            owner,
            target,
            picking: Arc::new(FixedPicking::new()),
            animator: Arc::new(Mutex::new(TransformAnimator::default())),
        }
    }

    fn anchor(fx: &Fixture, config: AnchorConfig) -> AnchorInstance {
        AnchorInstance::new(fx.owner, config, fx.picking.clone(), fx.animator.clone())
    }

    #[test]
    fn test_phase_from_edge() {
        assert_eq!(VisibilityPhase::from_edge(false, true), VisibilityPhase::JustOpened);
        assert_eq!(VisibilityPhase::from_edge(true, true), VisibilityPhase::Visible);
        assert_eq!(VisibilityPhase::from_edge(true, false), VisibilityPhase::Hidden);
        assert_eq!(VisibilityPhase::from_edge(false, false), VisibilityPhase::Hidden);
    }

    #[test]
    fn test_first_tick_resolves_target() {
        let mut fx = fixture();
        let mut anchor = anchor(&fx, AnchorConfig::new("#menu"));
        assert!(!anchor.tried_to_initialize());

        let outcome = anchor.tick(&mut fx.scene).unwrap();
        assert_eq!(outcome, TickOutcome::Idle(VisibilityPhase::Hidden));
        assert!(anchor.is_ready());
        assert_eq!(anchor.target(), Some(fx.target));
        assert!(fx.animator.lock().is_tracking(anchor.id()));
    }

    #[test]
    fn test_missing_target_is_permanent() {
        let mut fx = fixture();
        let mut anchor = anchor(&fx, AnchorConfig::new("#nothing"));

        let err = anchor.tick(&mut fx.scene).unwrap_err();
        assert!(matches!(err, AnchorError::TargetNotFound { .. }));
        assert!(anchor.tried_to_initialize());

        // Adding the node later does not revive the anchor.
        fx.scene.add_child(fx.owner, Node::new("nothing")).unwrap();
        assert_eq!(anchor.tick(&mut fx.scene).unwrap(), TickOutcome::Inactive);
        assert!(!anchor.is_ready());
    }

    #[test]
    fn test_missing_mesh_skips_frame_without_sampling_visibility() {
        let mut fx = fixture();
        let mut anchor = anchor(&fx, AnchorConfig::new("#menu").animated(false));
        anchor.tick(&mut fx.scene).unwrap();

        let mesh = fx.scene.object(fx.owner, MESH_SLOT);
        fx.scene.set_object(fx.owner, MESH_SLOT, None).unwrap();
        fx.scene.set_visible(fx.target, true).unwrap();
        let err = anchor.tick(&mut fx.scene).unwrap_err();
        assert_eq!(err, AnchorError::MissingMesh { owner: fx.owner });

        // The opening edge is still pending once the mesh is back.
        fx.scene.set_object(fx.owner, MESH_SLOT, mesh).unwrap();
        assert!(matches!(anchor.tick(&mut fx.scene).unwrap(), TickOutcome::Placed(_)));
    }

    #[test]
    fn test_empty_target_box_retries_next_tick() {
        let mut fx = fixture();
        fx.scene.node_mut(fx.target).unwrap().geometry = None;
        let mut anchor = anchor(&fx, AnchorConfig::new("#menu").animated(false));
        anchor.tick(&mut fx.scene).unwrap();

        fx.scene.set_visible(fx.target, true).unwrap();
        let before = fx.scene.world_matrix(fx.target).unwrap();
        let err = anchor.tick(&mut fx.scene).unwrap_err();
        assert_eq!(err, AnchorError::DegenerateBoundingBox { node: fx.target });
        assert_eq!(fx.scene.world_matrix(fx.target).unwrap(), before);

        fx.scene.node_mut(fx.target).unwrap().geometry = Some(Geometry::cuboid(Vec3::ZERO, Vec3::splat(0.5)));
        assert!(matches!(anchor.tick(&mut fx.scene).unwrap(), TickOutcome::Placed(_)));
    }

    #[test]
    fn test_mark_dirty_picks_up_new_geometry() {
        let mut fx = fixture();
        let config = AnchorConfig::new("#menu").animated(false).scaled(false).flat(true);
        let mut anchor = anchor(&fx, config);
        anchor.tick(&mut fx.scene).unwrap();

        fx.scene.set_visible(fx.target, true).unwrap();
        let TickOutcome::Placed(first) = anchor.tick(&mut fx.scene).unwrap() else {
            panic!("expected placement");
        };
        assert!(first.center.abs_diff_eq(Vec3::new(0.0, 0.0, 1.52), 1e-5));

        // Deeper menu, but the cache is only refreshed once marked dirty.
        fx.scene.node_mut(fx.target).unwrap().geometry = Some(Geometry::cuboid(Vec3::ZERO, Vec3::new(0.5, 0.5, 1.0)));
        fx.scene.set_visible(fx.target, false).unwrap();
        anchor.tick(&mut fx.scene).unwrap();
        fx.scene.set_visible(fx.target, true).unwrap();
        let TickOutcome::Placed(stale) = anchor.tick(&mut fx.scene).unwrap() else {
            panic!("expected placement");
        };
        assert!(stale.center.abs_diff_eq(Vec3::new(0.0, 0.0, 1.52), 1e-5));

        anchor.mark_dirty();
        fx.scene.set_visible(fx.target, false).unwrap();
        anchor.tick(&mut fx.scene).unwrap();
        fx.scene.set_visible(fx.target, true).unwrap();
        let TickOutcome::Placed(fresh) = anchor.tick(&mut fx.scene).unwrap() else {
            panic!("expected placement");
        };
        assert!(fresh.center.abs_diff_eq(Vec3::new(0.0, 0.0, 2.02), 1e-5));
    }

    #[test]
    fn test_reference_box_follows_mesh_identity() {
        let mut fx = fixture();
        let config = AnchorConfig::new("#menu").animated(false).scaled(false).flat(true);
        let mut anchor = anchor(&fx, config);
        anchor.tick(&mut fx.scene).unwrap();

        fn reopen(fx: &mut Fixture, anchor: &mut AnchorInstance) -> Vec3 {
            fx.scene.set_visible(fx.target, false).unwrap();
            anchor.tick(&mut fx.scene).unwrap();
            fx.scene.set_visible(fx.target, true).unwrap();
            match anchor.tick(&mut fx.scene).unwrap() {
                TickOutcome::Placed(placement) => placement.center,
                other => panic!("expected placement, got {other:?}"),
            }
        }

        assert!(reopen(&mut fx, &mut anchor).abs_diff_eq(Vec3::new(0.0, 0.0, 1.52), 1e-5));

        // Same mesh node, new geometry: the cached box is kept.
        let mesh = fx.scene.object(fx.owner, MESH_SLOT).unwrap();
        fx.scene.node_mut(mesh).unwrap().geometry = Some(Geometry::cuboid(Vec3::ZERO, Vec3::splat(2.0)));
        assert!(reopen(&mut fx, &mut anchor).abs_diff_eq(Vec3::new(0.0, 0.0, 1.52), 1e-5));

        // A different mesh node is measured afresh.
        let larger = fx
            .scene
            .add_child(fx.owner, Node::new("larger").with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::splat(3.0))))
            .unwrap();
        fx.scene.set_object(fx.owner, MESH_SLOT, Some(larger)).unwrap();
        assert!(reopen(&mut fx, &mut anchor).abs_diff_eq(Vec3::new(0.0, 0.0, 3.52), 1e-5));
    }

    #[test]
    fn test_animated_anchor_hands_pose_to_animator() {
        let mut fx = fixture();
        let mut anchor = anchor(&fx, AnchorConfig::new("#menu"));
        anchor.tick(&mut fx.scene).unwrap();

        fx.scene.set_visible(fx.target, true).unwrap();
        let before = fx.scene.world_matrix(fx.target).unwrap();
        assert!(matches!(anchor.tick(&mut fx.scene).unwrap(), TickOutcome::Placed(_)));

        assert_eq!(fx.scene.world_matrix(fx.target).unwrap(), before);
        assert!(fx.animator.lock().is_animating(anchor.id()));
    }

    #[test]
    fn test_remove_unregisters_from_animator() {
        let mut fx = fixture();
        let mut anchor = anchor(&fx, AnchorConfig::new("#menu"));
        anchor.tick(&mut fx.scene).unwrap();
        assert!(fx.animator.lock().is_tracking(anchor.id()));

        anchor.remove();
        assert!(!fx.animator.lock().is_tracking(anchor.id()));
    }
}
