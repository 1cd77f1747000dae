//! # Registry Integration Tests
//!
//! Tick ordering across several anchors, unregistering mid-sequence, and
//! a full config-driven setup with the reference animator.

use std::sync::Arc;

use border_anchor::basis::distance_scale;
use border_anchor::constants::MESH_SLOT;
use border_anchor::{
    AnchorConfig, AnchorId, AnchorInstance, AnchorSetConfig, AnimationService, BorderPositioningSystem, FixedPicking,
    TransformAnimator,
};
use border_scene::{Geometry, Node, NodeId, Pose, Scene, SceneGraph};
use glam::{Quat, Vec3};
use parking_lot::Mutex;

/// Animation service that records the order targets arrive in.
#[derive(Default)]
struct RecordingAnimation {
    targets: Vec<AnchorId>,
}

impl AnimationService for RecordingAnimation {
    fn register(&mut self, _anchor: AnchorId, _target: NodeId, _scale_enabled: bool) {}

    fn unregister(&mut self, _anchor: AnchorId) {}

    fn set_target(&mut self, anchor: AnchorId, _pose: Pose) {
        self.targets.push(anchor);
    }
}

/// Adds an owner at `origin` with a 2x2x2 mesh and returns it.
fn add_owner(scene: &mut Scene, name: &str, origin: Vec3) -> NodeId {
    let owner = scene.add_root(Node::new(name).with_translation(origin));
    let mesh = scene
        .add_child(owner, Node::new("model").with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::ONE)))
        .unwrap();
    scene.set_object(owner, MESH_SLOT, Some(mesh)).unwrap();
    owner
}

/// Adds a hidden 1x1x1 child under `owner`.
fn add_panel(scene: &mut Scene, owner: NodeId, name: &str) -> NodeId {
    scene
        .add_child(
            owner,
            Node::new(name)
                .with_class("object-menu")
                .with_visible(false)
                .with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::splat(0.5))),
        )
        .unwrap()
}

fn add_camera(scene: &mut Scene) {
    let camera = scene.add_root(Node::new("viewing-camera").with_translation(Vec3::new(0.0, 0.0, 5.0)));
    scene.set_viewer(Some(camera));
}

/// Test: Anchors tick in registration order, and unregistering one keeps the rest in order.
#[test]
fn test_unregister_mid_sequence_preserves_order() {
    let mut scene = Scene::new();
    add_camera(&mut scene);
    let picking = Arc::new(FixedPicking::new());
    let recorder = Arc::new(Mutex::new(RecordingAnimation::default()));

    let mut panels = Vec::new();
    let mut anchors = Vec::new();
    for (i, x) in [-4.0, 0.0, 4.0].into_iter().enumerate() {
        let owner = add_owner(&mut scene, &format!("object-{i}"), Vec3::new(x, 0.0, 0.0));
        panels.push(add_panel(&mut scene, owner, "menu"));
        let config = AnchorConfig::new("#menu");
        anchors.push(AnchorInstance::new(owner, config, picking.clone(), recorder.clone()).into_shared());
    }

    let mut system = BorderPositioningSystem::new();
    let ids: Vec<AnchorId> = anchors.iter().map(|a| system.register(a)).collect();

    system.tick(&mut scene);
    for &panel in &panels {
        scene.set_visible(panel, true).unwrap();
    }
    assert_eq!(system.tick(&mut scene).placed, 3);
    assert_eq!(recorder.lock().targets, ids);

    system.unregister(ids[1]).unwrap();
    assert_eq!(system.ids().collect::<Vec<_>>(), vec![ids[0], ids[2]]);

    for &panel in &panels {
        scene.set_visible(panel, false).unwrap();
    }
    system.tick(&mut scene);
    for &panel in &panels {
        scene.set_visible(panel, true).unwrap();
    }
    let report = system.tick(&mut scene);
    assert_eq!(report.ticked, 2);
    assert_eq!(report.placed, 2);
    assert_eq!(recorder.lock().targets[3..], [ids[0], ids[2]]);

    // The unregistered anchor is untouched and can still run on its own.
    assert!(anchors[1].lock().is_ready());
}

/// Test: A TOML config drives an animated flat menu and a snapping tooltip.
#[test]
fn test_config_driven_setup() {
    let set = AnchorSetConfig::from_toml_str(
        r##"
        [animation]
        durationSecs = 0.1
        easing = "linear"

        [[anchor]]
        target = ".object-menu"
        isFlat = true

        [[anchor]]
        target = "#tooltip"
        animate = false
        scale = false
        "##,
    )
    .unwrap();

    let mut scene = Scene::new();
    add_camera(&mut scene);
    let owner = add_owner(&mut scene, "object", Vec3::ZERO);
    let menu = add_panel(&mut scene, owner, "menu");
    let tooltip = scene
        .add_child(
            owner,
            Node::new("tooltip")
                .with_visible(false)
                .with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::splat(0.25))),
        )
        .unwrap();

    let picking = Arc::new(FixedPicking::new());
    let animator = Arc::new(Mutex::new(TransformAnimator::new(set.animation)));
    let anchors: Vec<_> = set
        .anchors
        .iter()
        .map(|config| AnchorInstance::new(owner, config.clone(), picking.clone(), animator.clone()).into_shared())
        .collect();

    let mut system = BorderPositioningSystem::new();
    for anchor in &anchors {
        system.register(anchor);
    }

    system.tick(&mut scene);
    assert_eq!(animator.lock().len(), 1);

    scene.set_visible(menu, true).unwrap();
    scene.set_visible(tooltip, true).unwrap();
    assert_eq!(system.tick(&mut scene).placed, 2);

    // Snapping tooltip without scaling: parked on the front face at its own scale.
    // Mesh half depth 1, tooltip half depth 0.25, margin 0.02.
    let tooltip_pose = Pose::from_matrix(&scene.world_matrix(tooltip).unwrap());
    assert!(tooltip_pose.translation.abs_diff_eq(Vec3::new(0.0, 0.0, 1.27), 1e-4));
    assert!(tooltip_pose.scale.abs_diff_eq(Vec3::ONE, 1e-5));

    // Animated menu: reaches the flat front face, scaled by distance.
    for _ in 0..10 {
        animator.lock().update(0.05, &mut scene);
    }
    let menu_pose = Pose::from_matrix(&scene.world_matrix(menu).unwrap());
    let expected_scale = distance_scale(5.0 - 1.52);
    assert!(menu_pose.translation.abs_diff_eq(Vec3::new(0.0, 0.0, 1.52), 1e-4));
    assert!(menu_pose.scale.abs_diff_eq(Vec3::splat(expected_scale), 1e-4));
    assert!(menu_pose.rotation.angle_between(Quat::IDENTITY) < 1e-3);
    assert!(!animator.lock().is_animating(anchors[0].lock().id()));
}
