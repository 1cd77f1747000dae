//! # Anchor Configuration
//!
//! Loaded from TOML once at startup. Keys keep their camelCase names:
//!
//! ```toml
//! [animation]
//! durationSecs = 0.15
//! easing = "exponential-out"
//!
//! [[anchor]]
//! target = ".object-menu"
//! isFlat = true
//!
//! [[anchor]]
//! target = "#tooltip"
//! animate = false
//! scale = false
//! ```

use border_scene::NodeSelector;
use serde::Deserialize;

use crate::animation::Easing;
use crate::error::{AnchorError, AnchorResult};

const fn default_true() -> bool {
    true
}

/// Immutable per-anchor options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnchorConfig {
    /// Selector for the node to place, searched under the owner.
    pub target: String,
    /// Flat placement against the reference's Z face.
    #[serde(default)]
    pub is_flat: bool,
    /// Hand results to the animation service instead of snapping.
    #[serde(default = "default_true")]
    pub animate: bool,
    /// Scale by viewing distance.
    #[serde(default = "default_true")]
    pub scale: bool,
}

impl AnchorConfig {
    /// Config with defaults for everything but the target.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            is_flat: false,
            animate: true,
            scale: true,
        }
    }

    /// Sets the flat strategy.
    #[must_use]
    pub fn flat(mut self, is_flat: bool) -> Self {
        self.is_flat = is_flat;
        self
    }

    /// Sets animation.
    #[must_use]
    pub fn animated(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Sets distance scaling.
    #[must_use]
    pub fn scaled(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Parses the target selector.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidConfig`] if the selector is malformed.
    pub fn selector(&self) -> AnchorResult<NodeSelector> {
        NodeSelector::parse(&self.target).map_err(|e| AnchorError::InvalidConfig(e.to_string()))
    }

    /// Checks the config can be used.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidConfig`] for a missing or malformed target.
    pub fn validate(&self) -> AnchorResult<()> {
        self.selector().map(|_| ())
    }

    /// Parses and validates a single anchor table.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not match the schema or fails
    /// validation.
    pub fn from_toml_str(text: &str) -> AnchorResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Tween settings for [`crate::TransformAnimator`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnimationConfig {
    /// Tween length in seconds.
    #[serde(default = "AnimationConfig::default_duration")]
    pub duration_secs: f32,
    /// Easing curve.
    #[serde(default)]
    pub easing: Easing,
}

impl AnimationConfig {
    const fn default_duration() -> f32 {
        0.15
    }

    /// Checks the config can be used.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidConfig`] for a negative or non-finite duration.
    pub fn validate(&self) -> AnchorResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(AnchorError::InvalidConfig(format!(
                "animation duration must be a non-negative number of seconds, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: Self::default_duration(),
            easing: Easing::default(),
        }
    }
}

/// A whole config file: animation settings plus a list of anchors.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorSetConfig {
    /// Animator settings.
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Anchor entries, in declaration order.
    #[serde(default, rename = "anchor")]
    pub anchors: Vec<AnchorConfig>,
}

impl AnchorSetConfig {
    /// Parses and validates a config file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not match the schema or any
    /// entry fails validation.
    pub fn from_toml_str(text: &str) -> AnchorResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.animation.validate()?;
        for anchor in &config.anchors {
            anchor.validate()?;
        }
        Ok(config)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidConfig`] if the file cannot be read,
    /// otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<std::path::Path>) -> AnchorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnchorError::InvalidConfig(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
