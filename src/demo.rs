//! Built-in meadow scene, so the binary runs without any asset files.
//!
//! Scenery art is generated per width, which means any width list or width
//! curve in a scene file resolves against [`library`] as long as the sprite
//! names start with one of the known kinds (`tree`, `bush`, `rock`, `grass`,
//! `flower`, `ground`). Anything else draws as a plain block.

use anyhow::Result;

use crate::config::{SceneConfig, ValidatedConfig};
use crate::sprites::SpriteLibrary;

pub const SCENE: &str = r#"{
    "settings": {
        "fps": 30,
        "scroll_speed": 0.02,
        "jump_speed": 30.0,
        "default_layer": 3
    },
    "projection": {
        "focal_length": 50,
        "horizon_y": 0.12,
        "near_z": 40,
        "far_z": 200,
        "ground_y": 0.85,
        "parallax_strength": 0.5
    },
    "bunny": {
        "width": 10,
        "animations": {
            "idle": "bunny-idle",
            "walk": "bunny-walk",
            "jump": "bunny-jump",
            "walk_to_idle": "bunny-stop"
        }
    },
    "ground": "ground",
    "sprites": {
        "tree": { "width_curve": { "steps": 6, "min_width": 3, "max_width": 15 } },
        "bush": { "widths": [2, 4, 6, 8, 10] },
        "rock": { "widths": [2, 3, 5, 7] },
        "grass": { "widths": [12] },
        "flower": { "widths": [3] },
        "ground": { "widths": [16] }
    },
    "layers": [
        { "name": "ridge", "layer": 14, "sprites": ["bush"], "tile": true },
        { "name": "oaks", "layer": 4, "sprites": ["tree"], "positions": [-30, 25, 70] },
        { "name": "boulders", "layer": 6, "sprites": ["rock"], "positions": [-12, 40] },
        { "name": "tufts", "type": "foreground", "layer": 1, "sprites": ["grass"], "tile": true, "z_index": 0 },
        { "name": "flowers", "type": "foreground", "layer": 1, "sprites": ["flower"],
          "positions": [-20, 15, 48], "z_index": 1, "behavior": "animated" }
    ],
    "auto_layers": {
        "min_layer": 7,
        "max_layer": 12,
        "sprites": ["tree", "bush", "rock"],
        "seed": 42,
        "per_layer": 2,
        "spread": 240
    }
}"#;

const BUNNY_IDLE: &[&str] = &[
    " (\\(\\\n ( -.-)\n o_(\")(\")",
    " (\\(\\\n ( o.o)\n o_(\")(\")",
];

const BUNNY_WALK: &[&str] = &[
    " (\\(\\\n ( o.o)\n o(\")(\")",
    " (\\(\\\n ( o.o)\n o/\")(\")",
    "  (\\(\\\n  ( o.o)\n  o(\")(\")",
    " (\\(\\\n ( o.o)\n o(\")/\")",
];

const BUNNY_JUMP: &[&str] = &[
    " (\\(\\\n ( o.o)\n o(\")(\")",
    " (\\(\\\n ( ^.^)\n o/   \\",
    " (\\(\\\n ( ^o^)\n  /   \\",
    " (\\(\\\n ( ^o^)\n  /   \\",
    " (\\(\\\n ( o.o)\n o/   \\",
    " (\\(\\\n ( o.o)\n o(\")(\")",
];

const BUNNY_STOP: &[&str] = &[
    " (\\(\\\n ( o.o)\n o(\")(\")",
    " (\\(\\\n ( o.-)\n o(\")(\")",
    " (\\(\\\n ( -.-)\n o_(\")(\")",
];

pub fn config() -> Result<ValidatedConfig> {
    SceneConfig::parse(SCENE)
}

/// Art for every `(sprite, width)` that `config` asks for, plus the bunny.
pub fn library(config: &ValidatedConfig) -> SpriteLibrary {
    let mut lib = SpriteLibrary::new();
    for (name, widths) in &config.sprites {
        for &w in widths {
            let frames = scenery(name, w as usize);
            let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
            lib.insert(name, w, &refs);
        }
    }

    let anim = &config.bunny.animations;
    let width = config.bunny.width;
    lib.insert(&anim.idle, width, BUNNY_IDLE);
    lib.insert(&anim.walk, width, BUNNY_WALK);
    lib.insert(&anim.jump, width, BUNNY_JUMP);
    lib.insert(&anim.walk_to_idle, width, BUNNY_STOP);
    lib
}

fn scenery(name: &str, w: usize) -> Vec<String> {
    let w = w.max(1);
    let single = |rows: Vec<String>| vec![rows.join("\n")];
    if name.starts_with("tree") {
        single(tree(w))
    } else if name.starts_with("bush") {
        single(bush(w))
    } else if name.starts_with("rock") {
        single(rock(w))
    } else if name.starts_with("grass") {
        vec![cycle("\\|/|", w, 0), cycle("\\|/|", w, 1)]
    } else if name.starts_with("flower") {
        ["@", "*"]
            .iter()
            .map(|head| [centered(head, w), centered("\\|/", w)].join("\n"))
            .collect()
    } else if name.starts_with("ground") {
        vec![cycle("_.__-_._", w, 0)]
    } else {
        vec!["#".repeat(w)]
    }
}

fn centered(row: &str, width: usize) -> String {
    let pad = width.saturating_sub(row.chars().count()) / 2;
    format!("{}{row}", " ".repeat(pad))
}

fn cycle(pattern: &str, width: usize, shift: usize) -> String {
    pattern.chars().cycle().skip(shift).take(width).collect()
}

fn tree(w: usize) -> Vec<String> {
    let canopy = w.div_ceil(2);
    let mut rows: Vec<String> = (0..canopy)
        .map(|r| {
            let span = (1 + 2 * r).min(w);
            if span < 3 {
                centered("^", w)
            } else {
                centered(&format!("/{}\\", "*".repeat(span - 2)), w)
            }
        })
        .collect();
    let trunk = if w >= 9 { "||" } else { "|" };
    for _ in 0..(w / 5).max(1) {
        rows.push(centered(trunk, w));
    }
    rows
}

fn bush(w: usize) -> Vec<String> {
    let height = (w / 4).max(1);
    (0..height)
        .map(|r| {
            let span = w.saturating_sub(2 * (height - 1 - r)).max(1);
            if span < 2 {
                centered("o", w)
            } else {
                centered(&format!("({})", "o".repeat(span - 2)), w)
            }
        })
        .collect()
}

fn rock(w: usize) -> Vec<String> {
    if w < 3 {
        return vec!["o".repeat(w)];
    }
    vec![centered(&"_".repeat(w - 2), w), format!("/{}\\", ".".repeat(w - 2))]
}
