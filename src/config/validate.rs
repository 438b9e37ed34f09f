//! Structural validation of a raw scene value.
//!
//! The pass is total: it never stops at the first problem, and it never
//! returns a partially accepted configuration. Either every field checks out
//! and a fully typed [`ValidatedConfig`] comes back, or the caller gets one
//! [`ValidationError`] per violation.

use std::collections::{BTreeMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{
    AutoLayerSpec, BunnyAnimations, BunnyConfig, LayerBehavior, LayerKind, ProjectionConfig,
    Settings, ValidatedConfig, ValidatedLayer, ValidationError, ValidationErrors,
};
use crate::engine::layers::{generate_auto_layers, width_curve, DEFAULT_CURVE_EXPONENT};

type Errors = Vec<ValidationError>;

/// Most layer ranks one `auto_layers` block may generate.
pub const MAX_AUTO_LAYERS: i64 = 256;

/// Most entities per generated layer.
pub const MAX_PER_LAYER: u32 = 64;

pub fn validate(value: &Value) -> Result<ValidatedConfig, ValidationErrors> {
    let mut errors = Errors::new();

    let Some(root) = value.as_object() else {
        return Err(ValidationErrors(vec![ValidationError::WrongType {
            path: "$".into(),
            expected: "object",
            found: kind(value),
        }]));
    };

    let settings: Settings = section(root, "settings", &mut errors);
    let projection: ProjectionConfig = section(root, "projection", &mut errors);
    check_settings(&settings, &mut errors);
    check_projection(&projection, &mut errors);

    let sprites = match root.get("sprites") {
        Some(v) => sprites(v, &mut errors),
        None => BTreeMap::new(),
    };

    let bunny = match required(root, "bunny", "", &mut errors) {
        Some(v) => bunny(v, &mut errors),
        None => None,
    };

    let ground = match root.get("ground") {
        None | Some(Value::Null) => None,
        Some(v) => expect_str(v, "ground", &mut errors).and_then(|name| {
            if sprites.contains_key(&name) {
                Some(name)
            } else {
                errors.push(ValidationError::UnknownSprite {
                    path: "ground".into(),
                    name,
                });
                None
            }
        }),
    };

    let mut layers = Vec::new();
    let mut seen = HashSet::new();
    if let Some(v) = root.get("layers") {
        match v.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let path = format!("layers[{i}]");
                    if let Some(layer) = layer(item, &path, &sprites, &mut errors) {
                        if !seen.insert(layer.name.clone()) {
                            errors.push(ValidationError::DuplicateLayer {
                                path: format!("{path}.name"),
                                name: layer.name.clone(),
                            });
                        }
                        layers.push(layer);
                    }
                }
            }
            None => errors.push(wrong_type("layers", "array", v)),
        }
    }

    let auto_layers = match root.get("auto_layers") {
        None | Some(Value::Null) => None,
        Some(v) => auto_layers(v, &sprites, &mut errors),
    };
    if let Some(spec) = &auto_layers {
        for generated in generate_auto_layers(spec) {
            if !seen.insert(generated.name.clone()) {
                errors.push(ValidationError::DuplicateLayer {
                    path: "auto_layers".into(),
                    name: generated.name.clone(),
                });
            }
            layers.push(generated);
        }
    }

    match bunny {
        Some(bunny) if errors.is_empty() => Ok(ValidatedConfig {
            settings,
            projection,
            sprites,
            layers,
            auto_layers,
            bunny,
            ground,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

// ---------------------------------------------------------------------------
// Typed sections
// ---------------------------------------------------------------------------

fn section<T: DeserializeOwned + Default>(root: &Map<String, Value>, key: &str, errors: &mut Errors) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            errors.push(ValidationError::Invalid {
                path: key.into(),
                message: e.to_string(),
            });
            T::default()
        }),
    }
}

fn check_settings(s: &Settings, errors: &mut Errors) {
    if s.fps == 0 {
        errors.push(invalid("settings.fps", "must be at least 1"));
    }
    let intervals = [
        ("settings.idle_frame_ms", s.idle_frame_ms),
        ("settings.walk_frame_ms", s.walk_frame_ms),
        ("settings.jump_frame_ms", s.jump_frame_ms),
        ("settings.transition_frame_ms", s.transition_frame_ms),
        ("settings.layer_frame_ms", s.layer_frame_ms),
        ("settings.size_step_ms", s.size_step_ms),
        ("settings.fade_ms", s.fade_ms),
    ];
    for (path, ms) in intervals {
        if !(ms > 0.0) {
            errors.push(invalid(path, "must be a positive duration"));
        }
    }
    if !(0.0..=1.0).contains(&s.bunny_anchor) {
        errors.push(invalid("settings.bunny_anchor", "must lie in [0, 1]"));
    }
}

fn check_projection(p: &ProjectionConfig, errors: &mut Errors) {
    if !(p.focal_length > 0.0) {
        errors.push(invalid("projection.focal_length", "must be positive"));
    }
    if !(p.near_z > 0.0) {
        errors.push(invalid("projection.near_z", "must be positive"));
    }
    if !(p.far_z > p.near_z) {
        errors.push(invalid("projection.far_z", "must be greater than near_z"));
    }
    if p.parallax_strength < 0.0 {
        errors.push(invalid("projection.parallax_strength", "must not be negative"));
    }
}

// ---------------------------------------------------------------------------
// Sprites
// ---------------------------------------------------------------------------

fn sprites(v: &Value, errors: &mut Errors) -> BTreeMap<String, Vec<u32>> {
    let mut out = BTreeMap::new();
    let Some(map) = v.as_object() else {
        errors.push(wrong_type("sprites", "object", v));
        return out;
    };

    for (name, entry) in map {
        let path = format!("sprites.{name}");
        let Some(obj) = entry.as_object() else {
            errors.push(wrong_type(&path, "object", entry));
            continue;
        };

        let widths = match (obj.get("widths"), obj.get("width_curve")) {
            (Some(_), Some(_)) => {
                errors.push(invalid(&path, "give either widths or width_curve, not both"));
                None
            }
            (Some(w), None) => sprite_widths(w, &format!("{path}.widths"), errors),
            (None, Some(c)) => sprite_curve(c, &format!("{path}.width_curve"), errors),
            (None, None) => {
                errors.push(ValidationError::Missing {
                    path: format!("{path}.widths"),
                });
                None
            }
        };

        if let Some(widths) = widths {
            out.insert(name.clone(), widths);
        }
    }
    out
}

fn sprite_widths(v: &Value, path: &str, errors: &mut Errors) -> Option<Vec<u32>> {
    let Some(items) = v.as_array() else {
        errors.push(wrong_type(path, "array of widths", v));
        return None;
    };
    if items.is_empty() {
        errors.push(invalid(path, "must list at least one width"));
        return None;
    }

    let before = errors.len();
    let mut widths = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{i}]");
        if let Some(w) = expect_uint(item, &item_path, errors) {
            if w == 0 {
                errors.push(invalid(&item_path, "width must be at least 1"));
            } else {
                widths.push(w);
            }
        }
    }
    if errors.len() > before {
        return None;
    }

    widths.sort_unstable();
    widths.dedup();
    Some(widths)
}

fn sprite_curve(v: &Value, path: &str, errors: &mut Errors) -> Option<Vec<u32>> {
    let Some(obj) = v.as_object() else {
        errors.push(wrong_type(path, "object", v));
        return None;
    };

    let steps = required(obj, "steps", path, errors).and_then(|v| expect_int(v, &format!("{path}.steps"), errors));
    let min = required(obj, "min_width", path, errors).and_then(|v| expect_uint(v, &format!("{path}.min_width"), errors));
    let max = required(obj, "max_width", path, errors).and_then(|v| expect_uint(v, &format!("{path}.max_width"), errors));
    let exponent = match obj.get("exponent") {
        Some(v) => expect_number(v, &format!("{path}.exponent"), errors),
        None => Some(DEFAULT_CURVE_EXPONENT),
    };

    let (steps, min, max, exponent) = (steps?, min?, max?, exponent?);
    match width_curve(steps, min, max, exponent) {
        Ok(widths) => Some(widths),
        Err(e) => {
            errors.push(invalid(path, &e.to_string()));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Bunny
// ---------------------------------------------------------------------------

fn bunny(v: &Value, errors: &mut Errors) -> Option<BunnyConfig> {
    let Some(obj) = v.as_object() else {
        errors.push(wrong_type("bunny", "object", v));
        return None;
    };

    let width = required(obj, "width", "bunny", errors).and_then(|v| expect_uint(v, "bunny.width", errors));
    let animations = required(obj, "animations", "bunny", errors).and_then(|v| {
        let Some(anim) = v.as_object() else {
            errors.push(wrong_type("bunny.animations", "object", v));
            return None;
        };
        let mut name = |key: &str| {
            required(anim, key, "bunny.animations", errors)
                .and_then(|v| expect_str(v, &format!("bunny.animations.{key}"), errors))
        };
        let idle = name("idle");
        let walk = name("walk");
        let jump = name("jump");
        let walk_to_idle = name("walk_to_idle");
        Some(BunnyAnimations {
            idle: idle?,
            walk: walk?,
            jump: jump?,
            walk_to_idle: walk_to_idle?,
        })
    });

    Some(BunnyConfig {
        width: width?,
        animations: animations?,
    })
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

fn layer(
    v: &Value,
    path: &str,
    sprites: &BTreeMap<String, Vec<u32>>,
    errors: &mut Errors,
) -> Option<ValidatedLayer> {
    let Some(obj) = v.as_object() else {
        errors.push(wrong_type(path, "object", v));
        return None;
    };
    let field = |key: &str| format!("{path}.{key}");

    let name = required(obj, "name", path, errors).and_then(|v| expect_str(v, &field("name"), errors));
    let rank = required(obj, "layer", path, errors).and_then(|v| expect_i32(v, &field("layer"), errors));
    let sprite_names = required(obj, "sprites", path, errors)
        .and_then(|v| sprite_refs(v, &field("sprites"), sprites, errors));

    let layer_kind = match obj.get("type") {
        None => Some(LayerKind::Background),
        Some(v) => expect_str(v, &field("type"), errors).and_then(|s| match s.as_str() {
            "background" => Some(LayerKind::Background),
            "foreground" => Some(LayerKind::Foreground),
            _ => {
                errors.push(ValidationError::UnknownVariant {
                    path: field("type"),
                    value: s,
                    allowed: "background, foreground",
                });
                None
            }
        }),
    };

    let behavior = match obj.get("behavior") {
        None => Some(LayerBehavior::Static),
        Some(v) => expect_str(v, &field("behavior"), errors).and_then(|s| match s.as_str() {
            "static" => Some(LayerBehavior::Static),
            "animated" => Some(LayerBehavior::Animated),
            _ => {
                errors.push(ValidationError::UnknownVariant {
                    path: field("behavior"),
                    value: s,
                    allowed: "static, animated",
                });
                None
            }
        }),
    };

    let positions = match obj.get("positions") {
        None | Some(Value::Null) => Some(None),
        Some(v) => number_list(v, &field("positions"), errors).map(Some),
    };
    let z_index = match obj.get("z_index") {
        None => Some(0),
        Some(v) => expect_i32(v, &field("z_index"), errors),
    };
    let tile = match obj.get("tile") {
        None => Some(false),
        Some(v) => expect_bool(v, &field("tile"), errors),
    };

    if let (Some(true), Some(Some(_))) = (tile, &positions) {
        errors.push(invalid(&field("positions"), "tiled layers compute their own positions"));
        return None;
    }

    Some(ValidatedLayer {
        name: name?,
        kind: layer_kind?,
        layer: rank?,
        sprite_names: sprite_names?,
        positions: positions?,
        z_index: z_index?,
        tile: tile?,
        behavior: behavior?,
    })
}

fn auto_layers(
    v: &Value,
    sprites: &BTreeMap<String, Vec<u32>>,
    errors: &mut Errors,
) -> Option<AutoLayerSpec> {
    const PATH: &str = "auto_layers";
    let Some(obj) = v.as_object() else {
        errors.push(wrong_type(PATH, "object", v));
        return None;
    };

    let min_layer = required(obj, "min_layer", PATH, errors).and_then(|v| expect_i32(v, "auto_layers.min_layer", errors));
    let max_layer = required(obj, "max_layer", PATH, errors).and_then(|v| expect_i32(v, "auto_layers.max_layer", errors));
    let names = required(obj, "sprites", PATH, errors)
        .and_then(|v| sprite_refs(v, "auto_layers.sprites", sprites, errors));
    let seed = match obj.get("seed") {
        None => Some(1),
        Some(v) => expect_uint(v, "auto_layers.seed", errors),
    };
    let per_layer = match obj.get("per_layer") {
        None => Some(1),
        Some(v) => expect_uint(v, "auto_layers.per_layer", errors),
    };
    let spread = match obj.get("spread") {
        None => Some(200.0),
        Some(v) => expect_number(v, "auto_layers.spread", errors),
    };

    if let (Some(lo), Some(hi)) = (min_layer, max_layer) {
        if lo > hi {
            errors.push(invalid("auto_layers.max_layer", "must not be below min_layer"));
            return None;
        }
        if hi as i64 - lo as i64 + 1 > MAX_AUTO_LAYERS {
            errors.push(invalid(
                "auto_layers.max_layer",
                &format!("span from min_layer must not exceed {MAX_AUTO_LAYERS} layers"),
            ));
            return None;
        }
    }
    match per_layer {
        Some(0) => {
            errors.push(invalid("auto_layers.per_layer", "must be at least 1"));
            return None;
        }
        Some(n) if n > MAX_PER_LAYER => {
            errors.push(invalid(
                "auto_layers.per_layer",
                &format!("must not exceed {MAX_PER_LAYER}"),
            ));
            return None;
        }
        _ => {}
    }
    if let Some(s) = spread {
        if !(s > 0.0) {
            errors.push(invalid("auto_layers.spread", "must be positive"));
            return None;
        }
    }

    Some(AutoLayerSpec {
        min_layer: min_layer?,
        max_layer: max_layer?,
        sprites: names?,
        seed: seed?,
        per_layer: per_layer? as usize,
        spread: spread?,
    })
}

fn sprite_refs(
    v: &Value,
    path: &str,
    sprites: &BTreeMap<String, Vec<u32>>,
    errors: &mut Errors,
) -> Option<Vec<String>> {
    let names = string_list(v, path, errors)?;
    if names.is_empty() {
        errors.push(ValidationError::EmptySprites { path: path.into() });
        return None;
    }
    let before = errors.len();
    for (i, name) in names.iter().enumerate() {
        if !sprites.contains_key(name) {
            errors.push(ValidationError::UnknownSprite {
                path: format!("{path}[{i}]"),
                name: name.clone(),
            });
        }
    }
    (errors.len() == before).then_some(names)
}

// ---------------------------------------------------------------------------
// Primitive accessors
// ---------------------------------------------------------------------------

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::WrongType {
        path: path.into(),
        expected,
        found: kind(found),
    }
}

fn invalid(path: &str, message: &str) -> ValidationError {
    ValidationError::Invalid {
        path: path.into(),
        message: message.into(),
    }
}

fn required<'v>(obj: &'v Map<String, Value>, key: &str, parent: &str, errors: &mut Errors) -> Option<&'v Value> {
    let v = obj.get(key);
    if v.is_none() {
        let path = if parent.is_empty() { key.to_string() } else { format!("{parent}.{key}") };
        errors.push(ValidationError::Missing { path });
    }
    v
}

fn expect_str(v: &Value, path: &str, errors: &mut Errors) -> Option<String> {
    match v.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            errors.push(wrong_type(path, "string", v));
            None
        }
    }
}

fn expect_bool(v: &Value, path: &str, errors: &mut Errors) -> Option<bool> {
    let b = v.as_bool();
    if b.is_none() {
        errors.push(wrong_type(path, "boolean", v));
    }
    b
}

fn expect_number(v: &Value, path: &str, errors: &mut Errors) -> Option<f64> {
    let n = v.as_f64();
    if n.is_none() {
        errors.push(wrong_type(path, "number", v));
    }
    n
}

fn expect_int(v: &Value, path: &str, errors: &mut Errors) -> Option<i64> {
    let n = v.as_i64();
    if n.is_none() {
        errors.push(wrong_type(path, "integer", v));
    }
    n
}

fn expect_i32(v: &Value, path: &str, errors: &mut Errors) -> Option<i32> {
    let n = expect_int(v, path, errors)?;
    match i32::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(invalid(path, "out of range"));
            None
        }
    }
}

fn expect_uint(v: &Value, path: &str, errors: &mut Errors) -> Option<u32> {
    let Some(n) = v.as_u64() else {
        errors.push(wrong_type(path, "non-negative integer", v));
        return None;
    };
    match u32::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(invalid(path, "out of range"));
            None
        }
    }
}

fn string_list(v: &Value, path: &str, errors: &mut Errors) -> Option<Vec<String>> {
    let Some(items) = v.as_array() else {
        errors.push(wrong_type(path, "array of strings", v));
        return None;
    };
    let before = errors.len();
    let out: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| expect_str(item, &format!("{path}[{i}]"), errors))
        .collect();
    (errors.len() == before).then_some(out)
}

fn number_list(v: &Value, path: &str, errors: &mut Errors) -> Option<Vec<f64>> {
    let Some(items) = v.as_array() else {
        errors.push(wrong_type(path, "array of numbers", v));
        return None;
    };
    let before = errors.len();
    let out: Vec<f64> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| expect_number(item, &format!("{path}[{i}]"), errors))
        .collect();
    (errors.len() == before).then_some(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal() -> Value {
        json!({
            "bunny": {
                "width": 12,
                "animations": {
                    "idle": "bunny-idle",
                    "walk": "bunny-walk",
                    "jump": "bunny-jump",
                    "walk_to_idle": "bunny-stop"
                }
            },
            "sprites": {
                "tree": { "widths": [12, 4, 8] },
                "grass": { "widths": [10] }
            },
            "layers": [
                { "name": "trees", "layer": 4, "sprites": ["tree"] },
                { "name": "tufts", "type": "foreground", "layer": 0, "sprites": ["grass"], "tile": true }
            ]
        })
    }

    #[test]
    fn accepts_minimal_scene_with_defaults() {
        let config = validate(&minimal()).expect("valid");
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.projection, ProjectionConfig::default());
        assert_eq!(config.sprites["tree"], vec![4, 8, 12]);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[0].kind, LayerKind::Background);
        assert_eq!(config.layers[0].positions, None);
        assert_eq!(config.layers[1].kind, LayerKind::Foreground);
        assert!(config.layers[1].tile);
    }

    #[test]
    fn reports_every_violation_with_its_path() {
        let mut v = minimal();
        v["layers"] = json!([
            { "name": "a", "layer": "deep", "sprites": ["tree"] },
            { "name": "a", "layer": 2, "sprites": [] },
            { "name": "b", "layer": 3, "sprites": ["rock", 7] },
            { "name": "c", "layer": 1, "sprites": ["tree"], "type": "sky" }
        ]);

        let errors = validate(&v).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path()).collect();
        assert!(paths.contains(&"layers[0].layer"), "{errors}");
        assert!(paths.contains(&"layers[1].sprites"), "{errors}");
        assert!(paths.contains(&"layers[2].sprites[1]"), "{errors}");
        assert!(paths.contains(&"layers[3].type"), "{errors}");
    }

    #[test]
    fn rejects_duplicate_layer_names() {
        let mut v = minimal();
        v["layers"] = json!([
            { "name": "trees", "layer": 4, "sprites": ["tree"] },
            { "name": "trees", "layer": 5, "sprites": ["tree"] }
        ]);
        let errors = validate(&v).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::DuplicateLayer {
                path: "layers[1].name".into(),
                name: "trees".into()
            }]
        );
    }

    #[test]
    fn rejects_unknown_sprite_reference() {
        let mut v = minimal();
        v["layers"][0]["sprites"] = json!(["oak"]);
        let errors = validate(&v).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::UnknownSprite {
                path: "layers[0].sprites[0]".into(),
                name: "oak".into()
            }]
        );
    }

    #[test]
    fn missing_bunny_is_an_error() {
        let mut v = minimal();
        v.as_object_mut().unwrap().remove("bunny");
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::Missing { path: "bunny".into() }]);
    }

    #[test]
    fn typed_sections_report_serde_errors() {
        let mut v = minimal();
        v["projection"] = json!({ "near_z": "close" });
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].path(), "projection");
    }

    #[test]
    fn misspelled_section_keys_are_reported() {
        let mut v = minimal();
        v["settings"] = json!({ "scrol_speed": 0.5 });
        v["projection"] = json!({ "near_z": 30, "farz": 120 });
        let errors = validate(&v).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["settings", "projection"]);
        assert!(errors.to_string().contains("scrol_speed"), "{errors}");
    }

    #[test]
    fn projection_ranges_are_checked() {
        let mut v = minimal();
        v["projection"] = json!({ "near_z": 100, "far_z": 50 });
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.0[0].path(), "projection.far_z");
    }

    #[test]
    fn width_curve_sprites_expand_to_widths() {
        let mut v = minimal();
        v["sprites"]["tree"] = json!({ "width_curve": { "steps": 5, "min_width": 4, "max_width": 40 } });
        let config = validate(&v).expect("valid");
        let widths = &config.sprites["tree"];
        assert_eq!(widths.first(), Some(&4));
        assert_eq!(widths.last(), Some(&40));
    }

    #[test]
    fn width_curve_rejects_inverted_range() {
        let mut v = minimal();
        v["sprites"]["tree"] = json!({ "width_curve": { "steps": 5, "min_width": 40, "max_width": 4 } });
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.0[0].path(), "sprites.tree.width_curve");
    }

    #[test]
    fn auto_layers_are_generated_into_the_layer_list() {
        let mut v = minimal();
        v["auto_layers"] = json!({ "min_layer": 6, "max_layer": 9, "sprites": ["tree", "grass"], "seed": 7 });
        let config = validate(&v).expect("valid");
        assert_eq!(config.layers.len(), 2 + 4);
        let ranks: Vec<i32> = config.layers[2..].iter().map(|l| l.layer).collect();
        assert_eq!(ranks, vec![6, 7, 8, 9]);
    }

    #[test]
    fn auto_layers_are_bounded() {
        let mut v = minimal();
        v["auto_layers"] = json!({ "min_layer": -2_000_000_000, "max_layer": 2_000_000_000, "sprites": ["tree"] });
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.0[0].path(), "auto_layers.max_layer");

        v["auto_layers"] = json!({ "min_layer": 1, "max_layer": 256, "sprites": ["tree"], "per_layer": 65 });
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].path(), "auto_layers.per_layer");

        v["auto_layers"]["per_layer"] = json!(64);
        assert!(validate(&v).is_ok());
    }

    #[test]
    fn tile_and_positions_conflict() {
        let mut v = minimal();
        v["layers"][1]["positions"] = json!([1.0, 2.0]);
        let errors = validate(&v).unwrap_err();
        assert_eq!(errors.0[0].path(), "layers[1].positions");
    }
}
