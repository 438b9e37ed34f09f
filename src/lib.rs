//! ascii-meadow: a depth-projected character-cell scene with a bunny.
//!
//! - [`config`]: scene files, defaults and validation
//! - [`sprites`]: frames, loaders and progressively filled size lists
//! - [`engine`]: projection, transitions, layers, the bunny and the [`engine::Scene`]
//! - [`renderer`]: compositing a scene into a character frame
//! - [`player`]: the interactive terminal loop

pub mod config;
pub mod demo;
pub mod engine;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod sprites;
pub mod types;
