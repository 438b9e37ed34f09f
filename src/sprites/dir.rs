use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{SpriteFrame, SpriteSource};

/// On-disk shape of one size variant: `<root>/<name>/<width>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteFile {
    pub frames: Vec<String>,
}

/// Loads sprites from a directory tree of JSON frame files.
#[derive(Debug, Clone)]
pub struct SpriteDir {
    root: PathBuf,
}

impl SpriteDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SpriteDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str, width: u32) -> PathBuf {
        self.root.join(name).join(format!("{width}.json"))
    }
}

impl SpriteSource for SpriteDir {
    fn load(&self, name: &str, width: u32) -> Option<Vec<SpriteFrame>> {
        let path = self.path_for(name, width);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                warn!("sprite {name}@{width}: cannot read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str::<SpriteFile>(&json) {
            Ok(file) => {
                debug!("sprite {name}@{width}: {} frames", file.frames.len());
                Some(file.frames.iter().map(|t| SpriteFrame::from_text(t)).collect())
            }
            Err(e) => {
                warn!("sprite {name}@{width}: invalid {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ascii-meadow-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_frames_from_json_files() {
        let root = scratch_dir("read");
        fs::create_dir_all(root.join("tree")).unwrap();
        fs::write(root.join("tree").join("3.json"), r#"{"frames": [" ^\n/|\\", " *\n/|\\"]}"#).unwrap();

        let dir = SpriteDir::new(&root);
        let frames = dir.load("tree", 3).expect("frames");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].height(), 2);
        assert_eq!(frames[1].get(1, 0), '*');

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn missing_or_broken_files_are_nothing_to_draw() {
        let root = scratch_dir("broken");
        fs::create_dir_all(root.join("rock")).unwrap();
        fs::write(root.join("rock").join("2.json"), "not json").unwrap();

        let dir = SpriteDir::new(&root);
        assert!(dir.load("rock", 2).is_none());
        assert!(dir.load("rock", 9).is_none());

        fs::remove_dir_all(root).unwrap();
    }
}
