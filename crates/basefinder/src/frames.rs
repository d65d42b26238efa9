//! Frame lists consumed by the CLI: image paths plus the tags the external
//! decoder found in each image.
//!
//! ```json
//! {"frames": [{"image": "f000.png", "tags": [{"id": 3, "corners": [[..], ..], "hamming": 0}]}]}
//! ```

use std::path::{Path, PathBuf};

use basefinder_pose::TagDetection;
use serde::{Deserialize, Serialize};

use crate::pipeline::{read_to_string, LocateError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub image: PathBuf,
    #[serde(default)]
    pub tags: Vec<TagDetection>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameList {
    pub frames: Vec<FrameEntry>,
}

impl FrameList {
    pub fn from_json_str(json: &str) -> Result<Self, LocateError> {
        serde_json::from_str(json).map_err(|source| LocateError::Json {
            what: "frame list".to_string(),
            source,
        })
    }

    /// Load a frame list; relative image paths are resolved against the
    /// list's own directory.
    pub fn load(path: &Path) -> Result<Self, LocateError> {
        let mut list = serde_json::from_str::<Self>(&read_to_string(path)?).map_err(|source| {
            LocateError::Json {
                what: path.display().to_string(),
                source,
            }
        })?;
        if let Some(dir) = path.parent() {
            for entry in &mut list.frames {
                if entry.image.is_relative() {
                    entry.image = dir.join(&entry.image);
                }
            }
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_default_to_empty() {
        let list = FrameList::from_json_str(
            r#"{"frames": [
                {"image": "a.png"},
                {"image": "b.png", "tags": [
                    {"id": 10, "corners": [[1, 2], [3, 2], [3, 4], [1, 4]]}
                ]}
            ]}"#,
        )
        .expect("list");
        assert_eq!(list.frames.len(), 2);
        assert!(list.frames[0].tags.is_empty());
        let tag = list.frames[1].tags[0];
        assert_eq!(tag.id, 10);
        assert_eq!(tag.hamming, 0);
        assert_eq!(tag.corners[2].x, 3.0);
    }

    #[test]
    fn relative_paths_follow_the_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frames.json");
        std::fs::write(
            &path,
            r#"{"frames": [{"image": "f0.png"}, {"image": "/abs/f1.png"}]}"#,
        )
        .expect("write");
        let list = FrameList::load(&path).expect("load");
        assert_eq!(list.frames[0].image, dir.path().join("f0.png"));
        assert_eq!(list.frames[1].image, PathBuf::from("/abs/f1.png"));
    }
}
