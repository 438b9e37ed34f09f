//! Size-step and visibility-fade state for one scenery entity.
//!
//! An entity is either steady (`size_idx == target_size_idx`, progress 0) or
//! transitioning one discrete step toward its target. Large depth jumps are
//! walked through one step at a time.

#[derive(Debug, Clone, PartialEq)]
pub struct EntityTransition {
    pub size_idx: usize,
    pub target_size_idx: usize,
    /// Fraction of the current step completed, in `[0, 1)`.
    pub progress: f64,
    /// -1 shrinking, 0 steady, 1 growing.
    pub direction: i8,
    /// 0 fully faded out, 1 fully visible.
    pub visibility: f64,
}

impl EntityTransition {
    pub fn new(size_idx: usize, visibility: f64) -> Self {
        EntityTransition {
            size_idx,
            target_size_idx: size_idx,
            progress: 0.0,
            direction: 0,
            visibility: visibility.clamp(0.0, 1.0),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.direction != 0
    }

    /// Index of the size the current step is heading to.
    pub fn next_size_idx(&self) -> usize {
        step(self.size_idx, self.direction)
    }

    /// Advance the size transition by `delta_ms` toward `target`.
    ///
    /// When the target flips to the other side mid-step, the step is turned
    /// around in place: the index moves to the step's destination and the
    /// progress is mirrored, so the rendered size stays where it was.
    pub fn update_size_transition(&mut self, target: usize, delta_ms: f64, step_ms: f64) {
        self.target_size_idx = target;

        if self.size_idx == target && self.progress == 0.0 {
            self.direction = 0;
            return;
        }

        let wanted = direction_toward(self.size_idx, target);
        if self.direction != 0 && wanted != self.direction {
            // Visually we sit at `size_idx + direction * progress`.
            self.size_idx = step(self.size_idx, self.direction);
            self.progress = 1.0 - self.progress;
            self.direction = -self.direction;
        } else if self.direction == 0 {
            self.direction = wanted;
            self.progress = 0.0;
        }

        if step_ms > 0.0 {
            self.progress += delta_ms.max(0.0) / step_ms;
        } else {
            self.progress = 1.0;
        }

        if self.progress >= 1.0 {
            self.size_idx = step(self.size_idx, self.direction);
            self.progress = 0.0;
            self.direction = if self.size_idx == self.target_size_idx {
                0
            } else {
                direction_toward(self.size_idx, self.target_size_idx)
            };
        }
    }

    /// Move visibility linearly toward 1 (visible) or 0 (hidden).
    pub fn update_visibility_fade(&mut self, visible: bool, delta_ms: f64, fade_ms: f64) {
        let rate = if fade_ms > 0.0 { delta_ms.max(0.0) / fade_ms } else { 1.0 };
        self.visibility = if visible {
            (self.visibility + rate).min(1.0)
        } else {
            (self.visibility - rate).max(0.0)
        };
    }

    /// Still worth drawing, including while fading out.
    pub fn is_drawn(&self) -> bool {
        self.visibility > 0.0
    }
}

/// True when `size_idx` is one of the two largest sizes.
pub fn is_entity_in_foreground(size_idx: usize, num_sizes: usize) -> bool {
    num_sizes > 0 && size_idx < num_sizes && size_idx + 2 >= num_sizes
}

fn direction_toward(from: usize, to: usize) -> i8 {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

fn step(idx: usize, direction: i8) -> usize {
    match direction {
        1 => idx + 1,
        -1 => idx.saturating_sub(1),
        _ => idx,
    }
}
