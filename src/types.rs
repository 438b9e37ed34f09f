//! Shared boundary types for the meadow scene.
//!
//! This module defines the small value types that cross module lines:
//! - World space: `Camera`, `DepthBounds`
//! - Projection output: `ScreenPosition`
//! - Protagonist heading: `Facing`

// ---------------------------------------------------------------------------
// World space
// ---------------------------------------------------------------------------

/// Horizontal and depth position of the viewer in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub z: f64,
}

impl Camera {
    pub fn new(x: f64, z: f64) -> Self {
        Camera { x, z }
    }
}

/// Camera-z band the scene loops across.
///
/// Moving the camera past `max_z` re-enters at `min_z` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBounds {
    pub min_z: f64,
    pub max_z: f64,
    pub range: f64,
}

impl DepthBounds {
    pub fn new(min_z: f64, max_z: f64) -> Self {
        DepthBounds {
            min_z,
            max_z,
            range: max_z - min_z,
        }
    }
}

// ---------------------------------------------------------------------------
// Projection output (per frame, never stored long-term)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub visible: bool,
}

impl ScreenPosition {
    pub const HIDDEN: ScreenPosition = ScreenPosition {
        x: 0.0,
        y: 0.0,
        scale: 0.0,
        visible: false,
    };
}

// ---------------------------------------------------------------------------
// Protagonist heading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn from_right(right: bool) -> Self {
        if right { Facing::Right } else { Facing::Left }
    }

    pub fn is_right(self) -> bool {
        self == Facing::Right
    }

    /// Sign of camera motion when walking this way.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}
