//! Sprite blitting onto a [`FrameBuffer`].
//!
//! Spaces in a frame are transparent everywhere. Frames are placed by their
//! bottom-center point, so a sprite changing size stays planted on the same
//! ground spot.

use super::buffer::FrameBuffer;
use crate::sprites::SpriteFrame;

/// Densest to sparsest.
pub const DENSITY_RAMP: [char; 6] = ['#', '+', '=', '-', ':', '.'];

/// Top-left cell for a frame whose bottom-center sits at `(ax, ay)`.
///
/// `ay` is the row just below the frame's last row.
pub fn anchor_origin(frame: &SpriteFrame, ax: i32, ay: i32) -> (i32, i32) {
    box_origin(frame.width(), frame.height(), ax, ay)
}

fn box_origin(width: usize, height: usize, ax: i32, ay: i32) -> (i32, i32) {
    (ax - (width / 2) as i32, ay - height as i32)
}

/// Copy the non-space characters of `frame` with its top-left at `(left, top)`.
pub fn draw_sprite(buf: &mut FrameBuffer, frame: &SpriteFrame, left: i32, top: i32) {
    for (row, line) in frame.rows().enumerate() {
        for (col, &ch) in line.iter().enumerate() {
            if ch != ' ' {
                buf.set(left + col as i32, top + row as i32, ch);
            }
        }
    }
}

pub fn draw_sprite_anchored(buf: &mut FrameBuffer, frame: &SpriteFrame, ax: i32, ay: i32) {
    let (left, top) = anchor_origin(frame, ax, ay);
    draw_sprite(buf, frame, left, top);
}

pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Cross-fade from `old` to `new`, both anchored at `(ax, ay)`.
///
/// The box grows or shrinks from the old size to the new one as `progress`
/// goes from 0 to 1. Each cell samples both frames at the same relative
/// position. Where they differ, cells far from the anchor switch to the new
/// frame first. At `progress == 0` the result is exactly `old`, at
/// `progress == 1` exactly `new`.
///
/// `visibility < 1` thins every drawn character down the density ramp.
pub fn draw_sprite_fade(
    buf: &mut FrameBuffer,
    old: &SpriteFrame,
    new: &SpriteFrame,
    ax: i32,
    ay: i32,
    progress: f64,
    visibility: f64,
) {
    let eased = smoothstep(progress);
    let lerp = |a: usize, b: usize| (a as f64 + (b as f64 - a as f64) * eased).round() as usize;
    let out_w = lerp(old.width(), new.width());
    let out_h = lerp(old.height(), new.height());
    if out_w == 0 || out_h == 0 {
        return;
    }

    let (left, top) = box_origin(out_w, out_h, ax, ay);
    let half_w = out_w as f64 / 2.0;

    for row in 0..out_h {
        let v = (row as f64 + 0.5) / out_h as f64;
        for col in 0..out_w {
            let u = (col as f64 + 0.5) / out_w as f64;
            let from = sample(old, u, v);
            let to = sample(new, u, v);

            let ch = if from == to {
                from
            } else {
                let dx = ((col as f64 + 0.5) - half_w).abs() / half_w;
                let dy = 1.0 - v;
                let dist = ((dx * dx + dy * dy) / 2.0).sqrt().min(1.0);
                let threshold = 0.05 + 0.9 * (1.0 - dist);
                if eased > threshold { to } else { from }
            };
            if ch == ' ' {
                continue;
            }
            if let Some(ch) = fade_char(ch, visibility) {
                buf.set(left + col as i32, top + row as i32, ch);
            }
        }
    }
}

fn sample(frame: &SpriteFrame, u: f64, v: f64) -> char {
    let col = (u * frame.width() as f64).floor() as usize;
    let row = (v * frame.height() as f64).floor() as usize;
    frame.get(col, row)
}

/// Thin `ch` by `1 - visibility` of the density ramp. `None` once it has
/// faded past the sparsest step.
///
/// Characters outside the ramp count as the densest step.
pub fn fade_char(ch: char, visibility: f64) -> Option<char> {
    let shift = ((1.0 - visibility.clamp(0.0, 1.0)) * DENSITY_RAMP.len() as f64).round() as usize;
    if shift == 0 {
        return Some(ch);
    }
    let idx = DENSITY_RAMP.iter().position(|&c| c == ch).unwrap_or(0) + shift;
    DENSITY_RAMP.get(idx).copied()
}
