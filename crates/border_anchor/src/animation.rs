//! Transform tweening for animated anchors.
//!
//! The core hands over a target pose; the animator owns getting there.
//! Each new target restarts the tween from wherever the node is when the
//! next update runs.

use std::collections::BTreeMap;

use border_scene::{NodeId, Pose, SceneGraph, SceneResult};
use serde::Deserialize;

use crate::anchor::AnchorId;
use crate::config::AnimationConfig;
use crate::services::AnimationService;

/// Easing curve applied to tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, long settle: `1 - 2^(-10t)`.
    #[default]
    ExponentialOut,
    /// Hermite S-curve.
    SmoothStep,
    /// Jump straight to the target.
    Instant,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::ExponentialOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::Instant => 1.0,
        }
    }
}

/// One in-flight tween.
#[derive(Debug, Clone, Copy)]
struct Tween {
    /// Sampled from the scene on the first update after a retarget.
    start: Option<Pose>,
    target: Pose,
    progress: f32,
}

#[derive(Debug, Clone)]
struct Track {
    node: NodeId,
    scale_enabled: bool,
    tween: Option<Tween>,
}

/// Reference [`AnimationService`]: eases each registered node toward its
/// latest target pose.
#[derive(Debug)]
pub struct TransformAnimator {
    config: AnimationConfig,
    tracks: BTreeMap<AnchorId, Track>,
}

impl TransformAnimator {
    /// Creates an animator with no tracks.
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
        }
    }

    /// Number of registered anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True when no anchor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// True if `anchor` is registered.
    #[must_use]
    pub fn is_tracking(&self, anchor: AnchorId) -> bool {
        self.tracks.contains_key(&anchor)
    }

    /// True while `anchor` has a tween in flight.
    #[must_use]
    pub fn is_animating(&self, anchor: AnchorId) -> bool {
        self.tracks.get(&anchor).is_some_and(|t| t.tween.is_some())
    }

    /// Advances every tween by `dt` seconds and writes the results.
    ///
    /// Returns how many nodes were written. A track whose node can no
    /// longer be written is dropped from animation and logged.
    pub fn update(&mut self, dt: f32, scene: &mut dyn SceneGraph) -> usize {
        let mut written = 0;
        for (anchor, track) in &mut self.tracks {
            let Some(tween) = track.tween.as_mut() else {
                continue;
            };
            match Self::step(tween, track.node, track.scale_enabled, &self.config, dt, scene) {
                Ok(done) => {
                    written += 1;
                    if done {
                        track.tween = None;
                    }
                }
                Err(e) => {
                    tracing::warn!("Animation for anchor {} stopped: {}", anchor, e);
                    track.tween = None;
                }
            }
        }
        written
    }

    fn step(
        tween: &mut Tween,
        node: NodeId,
        scale_enabled: bool,
        config: &AnimationConfig,
        dt: f32,
        scene: &mut dyn SceneGraph,
    ) -> SceneResult<bool> {
        let start = match tween.start {
            Some(start) => start,
            None => {
                let sampled = Pose::from_matrix(&scene.world_matrix(node)?);
                tween.start = Some(sampled);
                sampled
            }
        };

        if config.duration_secs > 0.0 {
            tween.progress += dt / config.duration_secs;
        } else {
            tween.progress = 1.0;
        }
        tween.progress = tween.progress.min(1.0);

        let eased = config.easing.apply(tween.progress);
        let mut pose = if tween.progress >= 1.0 {
            tween.target
        } else {
            start.interpolate(&tween.target, eased)
        };
        if !scale_enabled {
            pose.scale = tween.target.scale;
        }

        scene.set_world_matrix(node, pose.to_matrix())?;
        Ok(tween.progress >= 1.0)
    }
}

impl Default for TransformAnimator {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl AnimationService for TransformAnimator {
    fn register(&mut self, anchor: AnchorId, target: NodeId, scale_enabled: bool) {
        tracing::debug!("Animator tracking {} for anchor {}", target, anchor);
        self.tracks.insert(
            anchor,
            Track {
                node: target,
                scale_enabled,
                tween: None,
            },
        );
    }

    fn unregister(&mut self, anchor: AnchorId) {
        self.tracks.remove(&anchor);
    }

    fn set_target(&mut self, anchor: AnchorId, pose: Pose) {
        match self.tracks.get_mut(&anchor) {
            Some(track) => {
                track.tween = Some(Tween {
                    start: None,
                    target: pose,
                    progress: 0.0,
                });
            }
            None => tracing::debug!("Ignoring target for untracked anchor {}", anchor),
        }
    }
}
