//! Renderer: composites a [`Scene`] into one character frame.
//!
//! Draw order, back to front:
//!
//! 1. background layers, far to near, through the perspective projection
//! 2. the ground strip
//! 3. the bunny
//! 4. background entities that have come close enough to pass the bunny
//! 5. foreground layers, screen-anchored and tiled
//!
//! Anything that is not loaded yet, or whose size or frame index falls out
//! of range, is simply skipped for that frame.

pub mod blit;
mod buffer;

use std::io;

use anyhow::Result;
use log::trace;

use crate::engine::layers::{layer_to_size_index, LayerInstance, SceneSprite};
use crate::engine::projection::{project, scale_to_size_index, wrap_position};
use crate::engine::transition::{is_entity_in_foreground, EntityTransition};
use crate::engine::Scene;
use crate::types::{Camera, ScreenPosition};
use blit::{draw_sprite, draw_sprite_anchored, draw_sprite_fade};
pub use buffer::FrameBuffer;

/// Where finished frames go. One `present` call per rendered frame.
pub trait DisplaySurface {
    fn present(&mut self, frame: &str) -> io::Result<()>;
}

/// Keeps every presented frame in memory.
#[derive(Debug, Default)]
pub struct TextSurface {
    pub frames: Vec<String>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySurface for TextSurface {
    fn present(&mut self, frame: &str) -> io::Result<()> {
        self.frames.push(frame.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SceneRenderer {
    last_timestamp: Option<f64>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the scene to `now_ms`, draw it, and present the frame.
    ///
    /// The first call has a zero time step. After presenting, a walking bunny
    /// pulls the camera along by `scroll_speed · dt` in its facing direction.
    pub fn render_frame(&mut self, scene: &mut Scene, now_ms: f64, surface: &mut dyn DisplaySurface) -> Result<()> {
        let dt = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        scene.tick(dt);
        let buffer = compose(scene, dt);
        surface.present(&buffer.to_text())?;

        if scene.bunny().is_moving() {
            let dx = scene.settings().scroll_speed * dt * scene.bunny().facing().sign();
            scene.scroll(dx);
        }
        Ok(())
    }
}

/// Draw the scene into a fresh buffer, updating each entity's size and
/// visibility transitions by `dt`.
pub fn compose(scene: &mut Scene, dt: f64) -> FrameBuffer {
    let (w, h) = scene.viewport();
    let mut buf = FrameBuffer::new(w as usize, h as usize);
    let camera = scene.camera();
    let projection = scene.projection().clone();
    let settings = scene.settings().clone();
    let ground_line = (projection.ground_y * h as f64).round() as i32;
    let view = View {
        camera,
        width: w as f64,
        height: h as f64,
    };

    let mut deferred: Vec<(usize, usize, ScreenPosition)> = Vec::new();

    for (li, layer) in scene.layers_mut().iter_mut().enumerate() {
        if !layer.is_background() {
            continue;
        }
        let world_width = if layer.spec.tile { layer.world_width } else { None };
        for (ei, entity) in layer.entities.iter_mut().enumerate() {
            if let Some(ww) = world_width {
                entity.world_x = wrap_repeatedly(entity.world_x, camera.x, ww, projection.wrap_iterations);
            }
            let pos = project(entity.world_x, entity.world_z, &camera, view.width, view.height, &projection);
            let Some(at) = update_entity(entity, pos, dt, settings.size_step_ms, settings.fade_ms) else {
                continue;
            };
            if is_entity_in_foreground(entity.transition.size_idx, entity.size_count()) {
                deferred.push((li, ei, at));
            } else {
                draw_entity(&mut buf, entity, at);
            }
        }
    }

    if let Some(ground) = scene.ground() {
        draw_ground(&mut buf, ground, camera.x, ground_line);
    }

    let bunny = scene.bunny();
    if let Some(frame) = bunny.current_frame() {
        let ax = (settings.bunny_anchor * view.width).round() as i32;
        let ay = ground_line - bunny.height_offset() as i32;
        draw_sprite_anchored(&mut buf, frame, ax, ay);
    }

    for (li, ei, at) in deferred {
        if let Some(entity) = scene.layers().get(li).and_then(|l| l.entities.get(ei)) {
            draw_entity(&mut buf, entity, at);
        }
    }

    for layer in scene.layers().iter().filter(|l| !l.is_background()) {
        draw_foreground(&mut buf, layer, &view, settings.default_layer, projection.wrap_iterations);
    }

    buf
}

struct View {
    camera: Camera,
    width: f64,
    height: f64,
}

/// Step the entity's transitions and return where to draw it, if at all.
fn update_entity(entity: &mut SceneSprite, pos: ScreenPosition, dt: f64, step_ms: f64, fade_ms: f64) -> Option<ScreenPosition> {
    let sizes = entity.size_count();
    if sizes == 0 {
        return None;
    }
    let target = scale_to_size_index(pos.scale, sizes);

    if pos.visible {
        if entity.last_screen.is_none() {
            // First sighting: appear at the right size, fade in.
            let visibility = entity.transition.visibility;
            entity.transition = EntityTransition::new(target, visibility);
        } else {
            entity.transition.update_size_transition(target, dt, step_ms);
        }
        entity.last_screen = Some(pos);
    }
    entity.transition.update_visibility_fade(pos.visible, dt, fade_ms);

    if !entity.transition.is_drawn() {
        if !pos.visible {
            entity.last_screen = None;
        }
        return None;
    }
    entity.last_screen
}

fn draw_entity(buf: &mut FrameBuffer, entity: &SceneSprite, at: ScreenPosition) {
    let t = &entity.transition;
    let Some(current) = entity.frame(t.size_idx) else {
        trace!("{} size {} not loaded", entity.sprite_name, t.size_idx);
        return;
    };
    let ax = at.x.round() as i32;
    let ay = at.y.round() as i32;

    let next = if t.is_transitioning() && t.progress > 0.0 {
        entity.frame(t.next_size_idx())
    } else {
        None
    };

    match next {
        Some(next) => draw_sprite_fade(buf, &current, &next, ax, ay, t.progress, t.visibility),
        None if t.visibility < 1.0 => draw_sprite_fade(buf, &current, &current, ax, ay, 0.0, t.visibility),
        None => draw_sprite_anchored(buf, &current, ax, ay),
    }
}

fn draw_ground(buf: &mut FrameBuffer, ground: &SceneSprite, camera_x: f64, ground_line: i32) {
    let Some(frame) = ground.frame(ground.size_count().saturating_sub(1)) else {
        return;
    };
    let tile = frame.width() as i32;
    if tile == 0 {
        return;
    }
    let offset = (-camera_x.round() as i32).rem_euclid(tile);
    let mut x = offset - tile;
    while x < buf.width() as i32 {
        draw_sprite(buf, &frame, x, ground_line);
        x += tile;
    }
}

fn draw_foreground(buf: &mut FrameBuffer, layer: &LayerInstance, view: &View, default_layer: i32, wrap_iterations: u32) {
    let center = view.width / 2.0;
    let bottom = view.height.round() as i32;
    for entity in &layer.entities {
        let Some(size_idx) = layer_to_size_index(layer.spec.layer, default_layer, entity.size_count()) else {
            continue;
        };
        let Some(frame) = entity.frame(size_idx) else {
            continue;
        };
        let x = match layer.world_width {
            Some(ww) => wrap_repeatedly(entity.world_x, view.camera.x, ww, wrap_iterations),
            None => entity.world_x,
        };
        let ax = (center + x - view.camera.x).round() as i32;
        draw_sprite_anchored(buf, &frame, ax, bottom);
    }
}

/// Apply up to `limit` single-width wraps so a tile far behind the camera
/// catches up.
fn wrap_repeatedly(mut x: f64, camera_x: f64, world_width: f64, limit: u32) -> f64 {
    for _ in 0..limit.max(1) {
        let wrapped = wrap_position(x, camera_x, world_width);
        if wrapped == x {
            break;
        }
        x = wrapped;
    }
    x
}
