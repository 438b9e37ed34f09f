//! Layers and the scenery entities that populate them.
//!
//! A validated layer becomes a [`LayerInstance`]: a list of [`SceneSprite`]s
//! at fixed world positions. Entities of the same sprite share one
//! progressively filled size list, so a size variant that finishes loading
//! shows up on every entity at once.

use std::cell::Ref;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::{debug, warn};
use thiserror::Error;

use super::projection::layer_to_world_z;
use super::transition::EntityTransition;
use crate::config::{AutoLayerSpec, LayerBehavior, LayerKind, ValidatedLayer};
use crate::sprites::{shared_sizes, ProgressiveLoader, SharedSizes, SpriteFrame};
use crate::types::ScreenPosition;

/// Exponent used when a width curve does not name one.
pub const DEFAULT_CURVE_EXPONENT: f64 = 2.0;

/// The default layer renders this many steps below the largest size.
pub const SIZE_OFFSET: i64 = 2;

/// Extra width, in viewports, that a tiling layer covers beyond the screen.
pub const SCROLL_BUFFER_FACTOR: f64 = 4.0;

// ---------------------------------------------------------------------------
// Width curves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("layer depth must be at least 1, got {0}")]
    DepthTooSmall(i64),
    #[error("min width {min} must be below max width {max}")]
    EmptyRange { min: u32, max: u32 },
    #[error("exponent must be greater than 1, got {0}")]
    FlatExponent(f64),
}

/// Ascending widths for `layer_depth` size steps between `min_width` and
/// `max_width`.
///
/// Steps follow `max - (max - min) * (1 - t)^exponent`, so they bunch up near
/// `max_width` where small differences are easy to see. Widths that round
/// to the same integer collapse into one.
pub fn width_curve(layer_depth: i64, min_width: u32, max_width: u32, exponent: f64) -> Result<Vec<u32>, CurveError> {
    if layer_depth < 1 {
        return Err(CurveError::DepthTooSmall(layer_depth));
    }
    if min_width >= max_width {
        return Err(CurveError::EmptyRange {
            min: min_width,
            max: max_width,
        });
    }
    if !(exponent > 1.0) {
        return Err(CurveError::FlatExponent(exponent));
    }
    if layer_depth == 1 {
        return Ok(vec![max_width]);
    }

    let (lo, hi) = (min_width as f64, max_width as f64);
    let last = (layer_depth - 1) as f64;
    let mut widths: Vec<u32> = (0..layer_depth)
        .map(|i| {
            let t = i as f64 / last;
            (hi - (hi - lo) * (1.0 - t).powf(exponent)).round() as u32
        })
        .collect();
    widths.dedup();
    Ok(widths)
}

// ---------------------------------------------------------------------------
// Auto-layers
// ---------------------------------------------------------------------------

/// Numerical Recipes LCG. Same seed, same sequence, on every platform.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

/// One static background layer per rank in `min_layer..=max_layer`.
///
/// Sprites cycle through the palette by layer index; positions are drawn
/// from a single generator seeded once, centered on world x = 0.
pub fn generate_auto_layers(spec: &AutoLayerSpec) -> Vec<ValidatedLayer> {
    if spec.sprites.is_empty() {
        return Vec::new();
    }
    let mut rng = Lcg::new(spec.seed);
    (spec.min_layer..=spec.max_layer)
        .enumerate()
        .map(|(i, rank)| {
            let positions = (0..spec.per_layer)
                .map(|_| (rng.next_f64() - 0.5) * spec.spread)
                .collect();
            ValidatedLayer {
                name: format!("auto-{rank}"),
                kind: LayerKind::Background,
                layer: rank,
                sprite_names: vec![spec.sprites[i % spec.sprites.len()].clone()],
                positions: Some(positions),
                z_index: 0,
                tile: false,
                behavior: LayerBehavior::Static,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Depth → size
// ---------------------------------------------------------------------------

/// Size index for a layer rank, with `default_layer` at the third-largest
/// size. `None` when the rank falls outside the available sizes.
pub fn layer_to_size_index(layer: i32, default_layer: i32, num_sizes: usize) -> Option<usize> {
    let idx = num_sizes as i64 - 1 - SIZE_OFFSET - (layer as i64 - default_layer as i64);
    if idx >= 0 && (idx as usize) < num_sizes {
        Some(idx as usize)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A scenery sprite placed in the world.
#[derive(Debug, Clone)]
pub struct SceneSprite {
    pub sprite_name: String,
    /// Smallest to largest; may still be filling.
    pub sizes: SharedSizes,
    pub transition: EntityTransition,
    pub frame_idx: usize,
    pub world_x: f64,
    pub world_z: f64,
    /// Where the entity was last seen; `None` until first sighting and again
    /// once it has fully faded out.
    pub last_screen: Option<ScreenPosition>,
}

impl SceneSprite {
    pub fn new(sprite_name: &str, sizes: SharedSizes, world_x: f64, world_z: f64) -> Self {
        SceneSprite {
            sprite_name: sprite_name.to_string(),
            sizes,
            transition: EntityTransition::new(0, 0.0),
            frame_idx: 0,
            world_x,
            world_z,
            last_screen: None,
        }
    }

    pub fn size_count(&self) -> usize {
        self.sizes.borrow().len()
    }

    /// Current animation frame at `size_idx`, or `None` when that size has
    /// not loaded.
    pub fn frame(&self, size_idx: usize) -> Option<Ref<'_, SpriteFrame>> {
        let frame_idx = self.frame_idx;
        Ref::filter_map(self.sizes.borrow(), |sizes| {
            let variant = sizes.get(size_idx)?;
            variant.frames.get(frame_idx % variant.frames.len().max(1))
        })
        .ok()
    }
}

/// Shared size lists, one per sprite name.
///
/// The first request for a sprite enqueues every configured width on the
/// loader; later requests get the same list.
#[derive(Debug, Default)]
pub struct SizeRegistry {
    lists: HashMap<String, SharedSizes>,
}

impl SizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sizes_for(
        &mut self,
        name: &str,
        widths: &BTreeMap<String, Vec<u32>>,
        loader: &mut ProgressiveLoader,
    ) -> SharedSizes {
        if let Some(list) = self.lists.get(name) {
            return Rc::clone(list);
        }
        let list = shared_sizes();
        match widths.get(name) {
            Some(ws) => {
                for &w in ws {
                    loader.enqueue(name, w, &list);
                }
            }
            None => warn!("sprite {name} has no configured widths"),
        }
        self.lists.insert(name.to_string(), Rc::clone(&list));
        list
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Size list for the ground strip. Only the widest variant is used.
pub fn shared_ground_sizes(
    name: &str,
    widths: &BTreeMap<String, Vec<u32>>,
    loader: &mut ProgressiveLoader,
) -> SharedSizes {
    let list = shared_sizes();
    match widths.get(name).and_then(|ws| ws.last()) {
        Some(&w) => loader.enqueue(name, w, &list),
        None => warn!("ground sprite {name} has no configured widths"),
    }
    list
}

#[derive(Debug, Clone)]
pub struct LayerInstance {
    pub spec: ValidatedLayer,
    pub world_z: f64,
    pub entities: Vec<SceneSprite>,
    /// Loop length for tiling layers.
    pub world_width: Option<f64>,
}

impl LayerInstance {
    pub fn is_background(&self) -> bool {
        self.spec.kind == LayerKind::Background
    }

    pub fn is_animated(&self) -> bool {
        self.spec.behavior == LayerBehavior::Animated
    }

    /// Advance every entity's animation frame by `steps`.
    pub fn advance_frames(&mut self, steps: usize) {
        for entity in &mut self.entities {
            entity.frame_idx = entity.frame_idx.wrapping_add(steps);
        }
    }
}

/// Create the runtime entities for one layer.
///
/// - `tile`: copies spaced by the widest configured size, covering the
///   viewport plus a scroll buffer on both sides; the layer loops over that
///   span.
/// - `positions`: one entity per listed world x.
/// - otherwise: a single entity at world x = 0.
///
/// Sprite names cycle across entities.
pub fn instantiate_layer(
    spec: &ValidatedLayer,
    widths: &BTreeMap<String, Vec<u32>>,
    registry: &mut SizeRegistry,
    loader: &mut ProgressiveLoader,
    viewport_width: f64,
) -> LayerInstance {
    let world_z = layer_to_world_z(spec.layer);
    let mut world_width = None;

    let xs: Vec<f64> = if spec.tile {
        let spacing = spec
            .sprite_names
            .iter()
            .filter_map(|n| widths.get(n).and_then(|w| w.last()))
            .copied()
            .max()
            .unwrap_or(1)
            .max(1) as f64;
        let cover = viewport_width.max(1.0) * (1.0 + SCROLL_BUFFER_FACTOR);
        let count = (cover / spacing).ceil().max(1.0) as usize;
        world_width = Some(count as f64 * spacing);
        (0..count).map(|i| -cover / 2.0 + i as f64 * spacing).collect()
    } else {
        match &spec.positions {
            Some(ps) => ps.clone(),
            None => vec![0.0],
        }
    };

    let entities = if spec.sprite_names.is_empty() {
        Vec::new()
    } else {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| {
                let name = &spec.sprite_names[i % spec.sprite_names.len()];
                let sizes = registry.sizes_for(name, widths, loader);
                SceneSprite::new(name, sizes, x, world_z)
            })
            .collect()
    };

    debug!(
        "layer {} (rank {}): {} entities{}",
        spec.name,
        spec.layer,
        entities.len(),
        world_width.map(|w| format!(", loops every {w}")).unwrap_or_default()
    );

    LayerInstance {
        spec: spec.clone(),
        world_z,
        entities,
        world_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::SpriteLibrary;

    fn layer(name: &str, sprites: &[&str]) -> ValidatedLayer {
        ValidatedLayer {
            name: name.into(),
            kind: LayerKind::Background,
            layer: 3,
            sprite_names: sprites.iter().map(|s| s.to_string()).collect(),
            positions: None,
            z_index: 0,
            tile: false,
            behavior: LayerBehavior::Static,
        }
    }

    fn widths() -> BTreeMap<String, Vec<u32>> {
        BTreeMap::from([
            ("tree".to_string(), vec![4, 8, 12]),
            ("rock".to_string(), vec![3, 5]),
        ])
    }

    #[test]
    fn width_curve_is_ascending_and_finer_near_max() {
        let w = width_curve(6, 4, 40, 2.0).unwrap();
        assert_eq!(w.first(), Some(&4));
        assert_eq!(w.last(), Some(&40));
        assert!(w.windows(2).all(|p| p[0] < p[1]), "{w:?}");
        let first_gap = w[1] - w[0];
        let last_gap = w[w.len() - 1] - w[w.len() - 2];
        assert!(first_gap > last_gap, "{w:?}");
    }

    #[test]
    fn width_curve_rejects_bad_input() {
        assert_eq!(width_curve(0, 4, 40, 2.0), Err(CurveError::DepthTooSmall(0)));
        assert_eq!(width_curve(5, 40, 40, 2.0), Err(CurveError::EmptyRange { min: 40, max: 40 }));
        assert!(matches!(width_curve(5, 4, 40, 1.0), Err(CurveError::FlatExponent(_))));
        assert_eq!(width_curve(1, 4, 40, 2.0), Ok(vec![40]));
    }

    #[test]
    fn lcg_matches_reference_sequence() {
        let mut rng = Lcg::new(0);
        assert_eq!(rng.next_u32(), 1013904223);
        assert_eq!(rng.next_u32(), 1196435762);
    }

    #[test]
    fn auto_layers_are_deterministic_per_seed() {
        let spec = AutoLayerSpec {
            min_layer: 2,
            max_layer: 6,
            sprites: vec!["tree".into(), "rock".into()],
            seed: 42,
            per_layer: 3,
            spread: 100.0,
        };
        let a = generate_auto_layers(&spec);
        let b = generate_auto_layers(&spec);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert_eq!(a[0].sprite_names, vec!["tree".to_string()]);
        assert_eq!(a[1].sprite_names, vec!["rock".to_string()]);
        assert_eq!(a[2].sprite_names, vec!["tree".to_string()]);
        for l in &a {
            let ps = l.positions.as_ref().unwrap();
            assert_eq!(ps.len(), 3);
            assert!(ps.iter().all(|x| (-50.0..50.0).contains(x)));
        }

        let other = generate_auto_layers(&AutoLayerSpec { seed: 43, ..spec });
        assert_ne!(a[0].positions, other[0].positions);
    }

    #[test]
    fn default_layer_maps_to_third_largest_size() {
        assert_eq!(layer_to_size_index(3, 3, 6), Some(3));
        assert_eq!(layer_to_size_index(1, 3, 6), Some(5));
        assert_eq!(layer_to_size_index(0, 3, 6), None);
        assert_eq!(layer_to_size_index(6, 3, 6), Some(0));
        assert_eq!(layer_to_size_index(7, 3, 6), None);
        assert_eq!(layer_to_size_index(3, 3, 0), None);
    }

    #[test]
    fn single_and_positioned_layers() {
        let mut registry = SizeRegistry::new();
        let mut loader = ProgressiveLoader::new();

        let single = instantiate_layer(&layer("one", &["tree"]), &widths(), &mut registry, &mut loader, 80.0);
        assert_eq!(single.entities.len(), 1);
        assert_eq!(single.entities[0].world_x, 0.0);
        assert_eq!(single.world_z, layer_to_world_z(3));
        assert!(single.world_width.is_none());

        let mut spec = layer("many", &["tree", "rock"]);
        spec.positions = Some(vec![-10.0, 5.0, 20.0]);
        let many = instantiate_layer(&spec, &widths(), &mut registry, &mut loader, 80.0);
        let names: Vec<&str> = many.entities.iter().map(|e| e.sprite_name.as_str()).collect();
        assert_eq!(names, vec!["tree", "rock", "tree"]);
        assert_eq!(many.entities[2].world_x, 20.0);

        // tree and rock each enqueued once.
        assert_eq!(registry.len(), 2);
        assert_eq!(loader.pending(), 5);
    }

    #[test]
    fn tiles_cover_viewport_and_scroll_buffer() {
        let mut registry = SizeRegistry::new();
        let mut loader = ProgressiveLoader::new();
        let mut spec = layer("row", &["tree"]);
        spec.tile = true;

        let inst = instantiate_layer(&spec, &widths(), &mut registry, &mut loader, 60.0);
        let span = inst.world_width.unwrap();
        assert!(span >= 60.0 * 5.0);
        assert_eq!(inst.entities.len(), 25);
        assert_eq!(inst.entities[1].world_x - inst.entities[0].world_x, 12.0);
    }

    #[test]
    fn entities_see_sizes_as_they_load() {
        let mut lib = SpriteLibrary::new();
        lib.insert("tree", 8, &["/\\\n||"]);
        lib.insert("tree", 4, &["^", "*"]);

        let mut registry = SizeRegistry::new();
        let mut loader = ProgressiveLoader::new();
        let mut spec = layer("pair", &["tree"]);
        spec.positions = Some(vec![0.0, 10.0]);
        let mut inst = instantiate_layer(&spec, &widths(), &mut registry, &mut loader, 80.0);

        assert_eq!(inst.entities[0].size_count(), 0);
        assert!(inst.entities[0].frame(0).is_none());

        loader.poll(&lib, 2);
        assert_eq!(inst.entities[1].size_count(), 2);
        assert_eq!(inst.entities[1].frame(0).map(|f| f.to_text()).as_deref(), Some("^"));

        inst.advance_frames(3);
        assert_eq!(inst.entities[0].frame(0).map(|f| f.to_text()).as_deref(), Some("*"));
        assert!(inst.entities[0].frame(5).is_none());
    }
}
