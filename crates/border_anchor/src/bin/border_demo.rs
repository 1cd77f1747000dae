//! # Border Anchor Demo
//!
//! Builds a small scene, loads anchors from TOML and runs a few seconds of
//! frames at 60 Hz while the viewer circles the object and the menus
//! open and close.
//!
//! Run with: `RUST_LOG=border_anchor=debug cargo run --bin border_demo [config.toml]`

use std::f32::consts::TAU;
use std::sync::Arc;

use border_anchor::constants::MESH_SLOT;
use border_anchor::{AnchorInstance, AnchorSetConfig, BorderPositioningSystem, FixedPicking, TransformAnimator};
use border_scene::{Geometry, Node, Pose, Scene, SceneGraph};
use glam::{Mat4, Quat, Vec3};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = r##"
[animation]
durationSecs = 0.15
easing = "exponential-out"

[[anchor]]
target = ".object-menu"
isFlat = true

[[anchor]]
target = "#tooltip"
animate = false
"##;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 240;
const ORBIT_RADIUS: f32 = 5.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AnchorSetConfig::load(path)?,
        None => AnchorSetConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    tracing::info!("Loaded {} anchors", config.anchors.len());

    let mut scene = Scene::new();
    let owner = scene.add_root(Node::new("object"));
    let mesh = scene.add_child(
        owner,
        Node::new("model").with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::new(1.0, 0.75, 0.25))),
    )?;
    scene.set_object(owner, MESH_SLOT, Some(mesh))?;
    let menu = scene.add_child(
        owner,
        Node::new("menu")
            .with_class("object-menu")
            .with_visible(false)
            .with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::new(0.5, 0.3, 0.02))),
    )?;
    let tooltip = scene.add_child(
        owner,
        Node::new("tooltip")
            .with_visible(false)
            .with_geometry(Geometry::cuboid(Vec3::ZERO, Vec3::new(0.3, 0.1, 0.01))),
    )?;
    let camera = scene.add_root(Node::new("viewing-camera"));
    scene.set_viewer(Some(camera));

    let picking = Arc::new(FixedPicking::new());
    let animator = Arc::new(Mutex::new(TransformAnimator::new(config.animation)));
    let anchors: Vec<_> = config
        .anchors
        .iter()
        .map(|c| AnchorInstance::new(owner, c.clone(), picking.clone(), animator.clone()).into_shared())
        .collect();

    let mut system = BorderPositioningSystem::new();
    for anchor in &anchors {
        system.register(anchor);
    }

    let mut placements = 0;
    for frame in 0..FRAMES {
        let angle = TAU * frame as f32 / FRAMES as f32;
        let eye = Vec3::new(angle.sin(), 0.3, angle.cos()) * ORBIT_RADIUS;
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y).inverse();
        scene.set_world_matrix(camera, view)?;

        // Open on the first frame of each second, close halfway through.
        let open = frame % 60 < 30;
        scene.set_visible(menu, open)?;
        scene.set_visible(tooltip, open)?;

        let report = system.tick(&mut scene);
        placements += report.placed;
        if report.failed > 0 {
            tracing::warn!("Frame {}: {} anchors failed", system.frame(), report.failed);
        }
        animator.lock().update(FRAME_DT, &mut scene);
    }

    let menu_pose = Pose::from_matrix(&scene.world_matrix(menu)?);
    let tooltip_pose = Pose::from_matrix(&scene.world_matrix(tooltip)?);
    tracing::info!(
        "Ran {} frames, {} placements; menu at {} (scale {}), tooltip at {}",
        system.frame(),
        placements,
        menu_pose.translation,
        menu_pose.scale.x,
        tooltip_pose.translation
    );
    tracing::info!(
        "Menu turned {:.1} degrees from the object",
        menu_pose.rotation.angle_between(Quat::IDENTITY).to_degrees()
    );

    for anchor in &anchors {
        anchor.lock().remove();
    }
    Ok(())
}
