//! Character-art frames and where they come from.
//!
//! A sprite is identified by name and rendered at one of several widths
//! ("size variants"). Each variant is an ordered list of animation frames.
//! How frames are produced is up to the [`SpriteSource`]; the scene only
//! ever asks for `(name, width)`.

mod dir;
mod progressive;

use std::collections::HashMap;

pub use dir::SpriteDir;
pub use progressive::{insert_size, shared_sizes, ProgressiveLoader, SharedSizes, SizeVariant};

/// One frame of character art. Rows may have different lengths; missing
/// cells read as spaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpriteFrame {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl SpriteFrame {
    /// Build a frame from newline-delimited text. A single leading newline
    /// is dropped so raw string literals can start on their own line.
    pub fn from_text(text: &str) -> Self {
        let text = text.strip_prefix('\n').unwrap_or(text);
        let text = text.strip_suffix('\n').unwrap_or(text);
        let rows: Vec<Vec<char>> = text.split('\n').map(|line| line.trim_end_matches('\r').chars().collect()).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        SpriteFrame { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows.is_empty()
    }

    /// Character at `(col, row)`, space when out of range.
    pub fn get(&self, col: usize, row: usize) -> char {
        self.rows.get(row).and_then(|r| r.get(col)).copied().unwrap_or(' ')
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Left/right mirror image, with direction-bearing glyphs swapped.
    pub fn mirrored(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut padded = row.clone();
                padded.resize(self.width, ' ');
                padded.into_iter().rev().map(mirror_char).collect()
            })
            .collect();
        SpriteFrame {
            rows,
            width: self.width,
        }
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn mirror_char(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '/' => '\\',
        '\\' => '/',
        '<' => '>',
        '>' => '<',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '`' => '\'',
        '\'' => '`',
        other => other,
    }
}

/// Supplies frames for a sprite at a given width.
///
/// Returning `None` means "not available (yet)"; callers treat it as nothing
/// to draw rather than an error.
pub trait SpriteSource {
    fn load(&self, name: &str, width: u32) -> Option<Vec<SpriteFrame>>;
}

/// In-memory sprite store, keyed by name and width.
#[derive(Debug, Default, Clone)]
pub struct SpriteLibrary {
    frames: HashMap<(String, u32), Vec<SpriteFrame>>,
}

impl SpriteLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, width: u32, frames: &[&str]) {
        let frames = frames.iter().map(|t| SpriteFrame::from_text(t)).collect();
        self.frames.insert((name.to_string(), width), frames);
    }

    pub fn insert_frames(&mut self, name: &str, width: u32, frames: Vec<SpriteFrame>) {
        self.frames.insert((name.to_string(), width), frames);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl SpriteSource for SpriteLibrary {
    fn load(&self, name: &str, width: u32) -> Option<Vec<SpriteFrame>> {
        self.frames.get(&(name.to_string(), width)).cloned()
    }
}

/// Left- and right-facing versions of one animation, sharing frame indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirroredFrames {
    pub right: Vec<SpriteFrame>,
    pub left: Vec<SpriteFrame>,
}

impl MirroredFrames {
    /// Right-facing art as drawn; left-facing generated by mirroring.
    pub fn from_right(right: Vec<SpriteFrame>) -> Self {
        let left = right.iter().map(SpriteFrame::mirrored).collect();
        MirroredFrames { right, left }
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }

    pub fn frame(&self, idx: usize, facing_right: bool) -> Option<&SpriteFrame> {
        if facing_right {
            self.right.get(idx)
        } else {
            self.left.get(idx)
        }
    }
}
