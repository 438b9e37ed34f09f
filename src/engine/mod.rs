//! Engine: the scene model.
//!
//! Owns everything that changes over time: the camera, the scenery layers
//! and their entities, the bunny and its timers. The engine never deals with
//! terminals or character buffers; the renderer reads a [`Scene`] and draws
//! it.

pub mod bunny;
pub mod layers;
pub mod projection;
pub mod timer;
pub mod transition;

use log::{debug, info, warn};

use crate::config::{LayerKind, ProjectionConfig, Settings, ValidatedConfig};
use crate::sprites::{MirroredFrames, ProgressiveLoader, SpriteSource};
use crate::types::{Camera, DepthBounds};
use bunny::{Bunny, BunnyFrames};
use layers::{instantiate_layer, LayerInstance, SceneSprite, SizeRegistry};
use timer::Timer;

pub struct Scene {
    settings: Settings,
    projection: ProjectionConfig,
    /// Background layers far to near, then foreground layers by z-index.
    layers: Vec<LayerInstance>,
    camera: Camera,
    depth_bounds: DepthBounds,
    bunny: Bunny,
    ground: Option<SceneSprite>,
    layer_timer: Timer,
    viewport: (u16, u16),
}

impl Scene {
    /// Build a scene whose scenery sizes arrive through `loader`.
    ///
    /// Bunny frames are loaded up front from `source`; everything else is
    /// only enqueued, and draws as soon as [`ProgressiveLoader::poll`]
    /// delivers it.
    pub fn build(
        config: &ValidatedConfig,
        source: &dyn SpriteSource,
        viewport: (u16, u16),
        loader: &mut ProgressiveLoader,
    ) -> Self {
        let settings = config.settings.clone();
        let projection = config.projection.clone();
        let mut registry = SizeRegistry::new();

        let mut layers: Vec<LayerInstance> = config
            .layers
            .iter()
            .map(|spec| instantiate_layer(spec, &config.sprites, &mut registry, loader, viewport.0 as f64))
            .collect();
        layers.sort_by(|a, b| match (a.spec.kind, b.spec.kind) {
            (LayerKind::Background, LayerKind::Foreground) => std::cmp::Ordering::Less,
            (LayerKind::Foreground, LayerKind::Background) => std::cmp::Ordering::Greater,
            (LayerKind::Background, LayerKind::Background) => b
                .spec
                .layer
                .cmp(&a.spec.layer)
                .then(a.spec.z_index.cmp(&b.spec.z_index)),
            (LayerKind::Foreground, LayerKind::Foreground) => a
                .spec
                .z_index
                .cmp(&b.spec.z_index)
                .then(b.spec.layer.cmp(&a.spec.layer)),
        });

        let ranks = layers.iter().filter(|l| l.is_background()).map(|l| l.spec.layer);
        let (min_layer, max_layer) = ranks.fold(None, |acc: Option<(i32, i32)>, r| match acc {
            None => Some((r, r)),
            Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
        })
        .unwrap_or((settings.default_layer, settings.default_layer));
        let depth_bounds = DepthBounds::from_layer_range(min_layer, max_layer, &projection);

        let ground = config.ground.as_deref().map(|name| {
            let sizes = layers::shared_ground_sizes(name, &config.sprites, loader);
            SceneSprite::new(name, sizes, 0.0, 0.0)
        });

        let bunny = Bunny::new(load_bunny_frames(config, source), &settings);

        let mut layer_timer = Timer::new(settings.layer_frame_ms);
        layer_timer.start();

        info!(
            "scene: {} layers, {} sprites queued, depth band [{:.0}, {:.0})",
            layers.len(),
            loader.pending(),
            depth_bounds.min_z,
            depth_bounds.max_z
        );

        Scene {
            camera: Camera::new(0.0, depth_bounds.wrap(0.0)),
            settings,
            projection,
            layers,
            depth_bounds,
            bunny,
            ground,
            layer_timer,
            viewport,
        }
    }

    /// Build a scene and load every sprite before returning.
    pub fn load(config: &ValidatedConfig, source: &dyn SpriteSource, viewport: (u16, u16)) -> Self {
        let mut loader = ProgressiveLoader::new();
        let scene = Self::build(config, source, viewport, &mut loader);
        loader.finish(source);
        if loader.missing() > 0 {
            warn!("{} sprite sizes could not be loaded", loader.missing());
        }
        scene
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn depth_bounds(&self) -> DepthBounds {
        self.depth_bounds
    }

    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    pub fn layers(&self) -> &[LayerInstance] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [LayerInstance] {
        &mut self.layers
    }

    pub fn ground(&self) -> Option<&SceneSprite> {
        self.ground.as_ref()
    }

    pub fn bunny(&self) -> &Bunny {
        &self.bunny
    }

    // -----------------------------------------------------------------------
    // Time and input
    // -----------------------------------------------------------------------

    /// Advance the bunny and the shared layer animation clock.
    pub fn tick(&mut self, delta_ms: f64) {
        self.bunny.tick(delta_ms);
        let fires = self.layer_timer.advance(delta_ms) as usize;
        if fires > 0 {
            for layer in self.layers.iter_mut().filter(|l| l.is_animated()) {
                layer.advance_frames(fires);
            }
        }
    }

    pub fn walk(&mut self, right: bool) {
        self.bunny.walk(right);
    }

    pub fn idle(&mut self) {
        self.bunny.idle();
    }

    pub fn jump(&mut self) -> bool {
        self.bunny.jump()
    }

    /// Move the camera `steps` depth steps forward (positive) or back,
    /// wrapping across the depth band.
    pub fn move_depth(&mut self, steps: f64) {
        let z = self.camera.z + steps * self.settings.depth_step;
        self.camera.z = self.depth_bounds.wrap(z);
        debug!("camera z {:.1}", self.camera.z);
    }

    /// Scroll the camera horizontally by `dx` world units.
    pub fn scroll(&mut self, dx: f64) {
        self.camera.x += dx;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        debug!("viewport {}x{} -> {width}x{height}", self.viewport.0, self.viewport.1);
        self.viewport = (width, height);
    }
}

fn load_bunny_frames(config: &ValidatedConfig, source: &dyn SpriteSource) -> BunnyFrames {
    let width = config.bunny.width;
    let load = |name: &str| {
        let frames = source.load(name, width).unwrap_or_else(|| {
            warn!("bunny animation {name}@{width} not found");
            Vec::new()
        });
        MirroredFrames::from_right(frames)
    };
    let anim = &config.bunny.animations;
    BunnyFrames {
        idle: load(&anim.idle),
        walk: load(&anim.walk),
        jump: load(&anim.jump),
        walk_to_idle: load(&anim.walk_to_idle),
    }
}
