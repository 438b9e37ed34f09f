//! Scene configuration.
//!
//! A scene file is plain JSON. The `settings` and `projection` sections are
//! typed serde structs where every field has a default; the structural parts
//! (sprites, layers, auto-layers, bunny) go through a strict validation pass
//! in [`validate`] that reports every violation at once.

mod error;
pub mod validate;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use error::{ValidationError, ValidationErrors};
pub use validate::validate;

// ---------------------------------------------------------------------------
// Global settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// World units per millisecond while walking.
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f64,
    /// World-z distance covered by one depth key press.
    #[serde(default = "default_depth_step")]
    pub depth_step: f64,
    /// Initial upward velocity of a jump, in rows per second.
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f64,
    #[serde(default = "default_idle_frame_ms")]
    pub idle_frame_ms: f64,
    #[serde(default = "default_walk_frame_ms")]
    pub walk_frame_ms: f64,
    #[serde(default = "default_jump_frame_ms")]
    pub jump_frame_ms: f64,
    #[serde(default = "default_transition_frame_ms")]
    pub transition_frame_ms: f64,
    #[serde(default = "default_layer_frame_ms")]
    pub layer_frame_ms: f64,
    /// Duration of one discrete size step of a scenery entity.
    #[serde(default = "default_size_step_ms")]
    pub size_step_ms: f64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: f64,
    /// Layer rank drawn at the third-largest size at start.
    #[serde(default = "default_layer")]
    pub default_layer: i32,
    /// Bunny's horizontal screen anchor as a fraction of the width.
    #[serde(default = "default_bunny_anchor")]
    pub bunny_anchor: f64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u16,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u16,
}

fn default_fps() -> u32 { 30 }
fn default_scroll_speed() -> f64 { 0.02 }
fn default_depth_step() -> f64 { 5.0 }
fn default_jump_speed() -> f64 { 14.0 }
fn default_idle_frame_ms() -> f64 { 500.0 }
fn default_walk_frame_ms() -> f64 { 110.0 }
fn default_jump_frame_ms() -> f64 { 60.0 }
fn default_transition_frame_ms() -> f64 { 80.0 }
fn default_layer_frame_ms() -> f64 { 400.0 }
fn default_size_step_ms() -> f64 { 120.0 }
fn default_fade_ms() -> f64 { 300.0 }
fn default_layer() -> i32 { 3 }
fn default_bunny_anchor() -> f64 { 0.3 }
fn default_viewport_width() -> u16 { 100 }
fn default_viewport_height() -> u16 { 30 }

impl Default for Settings {
    fn default() -> Self {
        Settings {
            fps: default_fps(),
            scroll_speed: default_scroll_speed(),
            depth_step: default_depth_step(),
            jump_speed: default_jump_speed(),
            idle_frame_ms: default_idle_frame_ms(),
            walk_frame_ms: default_walk_frame_ms(),
            jump_frame_ms: default_jump_frame_ms(),
            transition_frame_ms: default_transition_frame_ms(),
            layer_frame_ms: default_layer_frame_ms(),
            size_step_ms: default_size_step_ms(),
            fade_ms: default_fade_ms(),
            default_layer: default_layer(),
            bunny_anchor: default_bunny_anchor(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Immutable perspective parameters.
///
/// `horizon_y` and `ground_y` are fractions of the viewport height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    #[serde(default = "default_focal_length")]
    pub focal_length: f64,
    #[serde(default = "default_horizon_y")]
    pub horizon_y: f64,
    #[serde(default = "default_near_z")]
    pub near_z: f64,
    #[serde(default = "default_far_z")]
    pub far_z: f64,
    #[serde(default = "default_ground_y")]
    pub ground_y: f64,
    #[serde(default = "default_parallax_strength")]
    pub parallax_strength: f64,
    /// Upper bound on world-width shifts applied to one tiling entity per frame.
    #[serde(default = "default_wrap_iterations")]
    pub wrap_iterations: u32,
}

fn default_focal_length() -> f64 { 50.0 }
fn default_horizon_y() -> f64 { 0.12 }
fn default_near_z() -> f64 { 40.0 }
fn default_far_z() -> f64 { 200.0 }
fn default_ground_y() -> f64 { 0.85 }
fn default_parallax_strength() -> f64 { 0.5 }
fn default_wrap_iterations() -> u32 { 3 }

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            focal_length: default_focal_length(),
            horizon_y: default_horizon_y(),
            near_z: default_near_z(),
            far_z: default_far_z(),
            ground_y: default_ground_y(),
            parallax_strength: default_parallax_strength(),
            wrap_iterations: default_wrap_iterations(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Depth-projected scenery drawn behind the bunny (unless very close).
    Background,
    /// Screen-anchored, tiled, wrap-around strip drawn over everything.
    Foreground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerBehavior {
    Static,
    /// Frames advance on the shared layer timer.
    Animated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLayer {
    pub name: String,
    pub kind: LayerKind,
    /// Depth rank, lower is closer.
    pub layer: i32,
    pub sprite_names: Vec<String>,
    /// Explicit world-x positions; `None` means one centered entity.
    pub positions: Option<Vec<f64>>,
    pub z_index: i32,
    pub tile: bool,
    pub behavior: LayerBehavior,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoLayerSpec {
    pub min_layer: i32,
    pub max_layer: i32,
    pub sprites: Vec<String>,
    pub seed: u32,
    pub per_layer: usize,
    /// Width of the world-x band positions are scattered over.
    pub spread: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunnyAnimations {
    pub idle: String,
    pub walk: String,
    pub jump: String,
    pub walk_to_idle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunnyConfig {
    pub width: u32,
    pub animations: BunnyAnimations,
}

/// A scene configuration that passed [`validate`].
///
/// `layers` already contains the generated auto-layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub settings: Settings,
    pub projection: ProjectionConfig,
    /// Sprite name → ascending widths of its size variants.
    pub sprites: BTreeMap<String, Vec<u32>>,
    pub layers: Vec<ValidatedLayer>,
    pub auto_layers: Option<AutoLayerSpec>,
    pub bunny: BunnyConfig,
    pub ground: Option<String>,
}

pub struct SceneConfig;

impl SceneConfig {
    /// Read, parse and validate a scene file.
    pub fn load(path: &Path) -> Result<ValidatedConfig> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&json).with_context(|| format!("Invalid scene {}", path.display()))?;
        info!(
            "loaded scene {} ({} layers, {} sprites)",
            path.display(),
            config.layers.len(),
            config.sprites.len()
        );
        Ok(config)
    }

    pub fn parse(json: &str) -> Result<ValidatedConfig> {
        let value: serde_json::Value = serde_json::from_str(json).context("Failed to parse JSON")?;
        let config = validate(&value)?;
        debug!("validated {} layers", config.layers.len());
        Ok(config)
    }
}
