//! Single-plane perspective projection and wraparound arithmetic.
//!
//! Pure functions only: no state, no allocation.
//!
//! Clipping uses the closed band `[near_z, far_z]` on the camera-relative
//! depth. A point exactly at `near_z` or exactly at `far_z` is visible; the
//! latter lands on the zero-parallax line.

use crate::config::ProjectionConfig;
use crate::types::{Camera, DepthBounds, ScreenPosition};

/// Depth at which a point sits exactly on the ground line.
pub const Y_BASE: f64 = 50.0;

/// Ceiling on projected scale so near-camera objects stop growing.
pub const MAX_SCALE: f64 = 1.5;

/// World z of layer rank 0.
pub const LAYER_ORIGIN_Z: f64 = 50.0;

/// World-z distance between adjacent layer ranks.
pub const LAYER_SPACING_Z: f64 = 10.0;

pub fn project(
    world_x: f64,
    world_z: f64,
    camera: &Camera,
    viewport_width: f64,
    viewport_height: f64,
    config: &ProjectionConfig,
) -> ScreenPosition {
    let relative_z = world_z - camera.z;
    if relative_z < config.near_z || relative_z > config.far_z {
        return ScreenPosition::HIDDEN;
    }

    let scale = (config.focal_length / relative_z).clamp(0.0, MAX_SCALE);

    let normalized_depth = (relative_z - config.near_z) / (config.far_z - config.near_z);
    let parallax = (1.0 - normalized_depth) * config.parallax_strength;
    let center_x = viewport_width / 2.0;
    let x = center_x + (world_x - camera.x) * parallax;

    let horizon = config.horizon_y * viewport_height;
    let ground = config.ground_y * viewport_height;
    let y = horizon + (ground - horizon) * (Y_BASE / relative_z);

    ScreenPosition {
        x,
        y,
        scale,
        visible: true,
    }
}

/// Map a continuous scale onto a discrete size-variant index.
///
/// Returns 0 for an empty size list; callers treat that as nothing to draw.
pub fn scale_to_size_index(scale: f64, size_count: usize) -> usize {
    if size_count == 0 {
        return 0;
    }
    let t = scale.clamp(0.0, 1.0);
    (t * (size_count - 1) as f64).round() as usize
}

/// Shift a looping entity by one world width when it has drifted more than
/// half a world away from the camera.
pub fn wrap_position(entity_x: f64, camera_x: f64, world_width: f64) -> f64 {
    let half = world_width / 2.0;
    let offset = entity_x - camera_x;
    if offset > half {
        entity_x - world_width
    } else if offset < -half {
        entity_x + world_width
    } else {
        entity_x
    }
}

/// Wrap camera depth into `[min_z, max_z)`.
pub fn wrap_depth(camera_z: f64, min_z: f64, max_z: f64) -> f64 {
    let range = max_z - min_z;
    if !(range > 0.0) {
        return min_z;
    }
    let z = min_z + (camera_z - min_z).rem_euclid(range);
    // rem_euclid rounds tiny negative offsets up to `range` itself.
    if z >= max_z { min_z } else { z }
}

pub fn layer_to_world_z(layer: i32) -> f64 {
    LAYER_ORIGIN_Z + layer as f64 * LAYER_SPACING_Z
}

pub fn world_z_to_layer(world_z: f64) -> i32 {
    ((world_z - LAYER_ORIGIN_Z) / LAYER_SPACING_Z).round() as i32
}

impl DepthBounds {
    /// Camera-z band in which layers `min_layer..=max_layer` can be seen,
    /// padded by one layer spacing on either side so both ends of the band
    /// show an empty stretch and the loop closes without a pop.
    pub fn from_layer_range(min_layer: i32, max_layer: i32, config: &ProjectionConfig) -> Self {
        let nearest = layer_to_world_z(min_layer.min(max_layer));
        let farthest = layer_to_world_z(min_layer.max(max_layer));
        DepthBounds::new(
            nearest - config.far_z - LAYER_SPACING_Z,
            farthest - config.near_z + LAYER_SPACING_Z,
        )
    }

    pub fn wrap(&self, camera_z: f64) -> f64 {
        wrap_depth(camera_z, self.min_z, self.max_z)
    }
}
