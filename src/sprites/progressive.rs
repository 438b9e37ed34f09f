//! Size lists that fill in while the scene is already running.
//!
//! Entities hold a [`SharedSizes`] handle rather than a private copy. The
//! loader inserts variants into the same list as they arrive, keeping it
//! sorted by width, so entities pick up new sizes on the next frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, trace};

use super::{SpriteFrame, SpriteSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeVariant {
    pub width: u32,
    pub frames: Vec<SpriteFrame>,
}

pub type SharedSizes = Rc<RefCell<Vec<SizeVariant>>>;

pub fn shared_sizes() -> SharedSizes {
    Rc::new(RefCell::new(Vec::new()))
}

/// Insert `variant` in ascending-width order, replacing an existing variant
/// of the same width. Returns the index it landed at.
pub fn insert_size(sizes: &SharedSizes, variant: SizeVariant) -> usize {
    let mut list = sizes.borrow_mut();
    match list.binary_search_by_key(&variant.width, |v| v.width) {
        Ok(i) => {
            list[i] = variant;
            i
        }
        Err(i) => {
            list.insert(i, variant);
            i
        }
    }
}

struct Pending {
    name: String,
    width: u32,
    target: SharedSizes,
}

/// Queue of `(sprite, width)` loads feeding shared size lists.
#[derive(Default)]
pub struct ProgressiveLoader {
    queue: VecDeque<Pending>,
    loaded: usize,
    missing: usize,
}

impl ProgressiveLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, name: &str, width: u32, target: &SharedSizes) {
        self.queue.push_back(Pending {
            name: name.to_string(),
            width,
            target: Rc::clone(target),
        });
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn missing(&self) -> usize {
        self.missing
    }

    /// Load at most `budget` queued variants. Returns how many were inserted.
    pub fn poll(&mut self, source: &dyn SpriteSource, budget: usize) -> usize {
        let mut inserted = 0;
        for _ in 0..budget {
            let Some(job) = self.queue.pop_front() else {
                break;
            };
            match source.load(&job.name, job.width) {
                Some(frames) if !frames.is_empty() => {
                    let at = insert_size(
                        &job.target,
                        SizeVariant {
                            width: job.width,
                            frames,
                        },
                    );
                    trace!("{}@{} inserted at size {at}", job.name, job.width);
                    self.loaded += 1;
                    inserted += 1;
                }
                _ => {
                    debug!("{}@{} unavailable, skipped", job.name, job.width);
                    self.missing += 1;
                }
            }
        }
        inserted
    }

    /// Drain the whole queue.
    pub fn finish(&mut self, source: &dyn SpriteSource) -> usize {
        let n = self.queue.len();
        self.poll(source, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::SpriteLibrary;

    fn variant(width: u32) -> SizeVariant {
        SizeVariant {
            width,
            frames: vec![SpriteFrame::from_text(&"#".repeat(width as usize))],
        }
    }

    #[test]
    fn inserts_keep_width_order() {
        let sizes = shared_sizes();
        assert_eq!(insert_size(&sizes, variant(8)), 0);
        assert_eq!(insert_size(&sizes, variant(2)), 0);
        assert_eq!(insert_size(&sizes, variant(5)), 1);
        assert_eq!(insert_size(&sizes, variant(5)), 1);
        let widths: Vec<u32> = sizes.borrow().iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![2, 5, 8]);
    }

    #[test]
    fn holders_see_sizes_loaded_later() {
        let mut lib = SpriteLibrary::new();
        lib.insert("bush", 3, &["###"]);
        lib.insert("bush", 6, &["######"]);

        let sizes = shared_sizes();
        let holder = Rc::clone(&sizes);
        let mut loader = ProgressiveLoader::new();
        loader.enqueue("bush", 6, &sizes);
        loader.enqueue("bush", 4, &sizes);
        loader.enqueue("bush", 3, &sizes);

        assert_eq!(loader.poll(&lib, 1), 1);
        assert_eq!(holder.borrow().len(), 1);

        assert_eq!(loader.poll(&lib, 10), 1);
        assert!(loader.is_done());
        assert_eq!(loader.missing(), 1);
        let widths: Vec<u32> = holder.borrow().iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![3, 6]);
    }
}
