//! COCO-style caption annotation files.
//!
//! Only `image_id` and `caption` of each annotation are read.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::PreproError;

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionAnnotation {
    pub image_id: u64,
    pub caption: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationFile {
    /// Absent for splits released without captions.
    #[serde(default)]
    pub annotations: Vec<CaptionAnnotation>,
}

impl AnnotationFile {
    /// Captions grouped per image, by ascending image id, in file order
    /// within each image.
    pub fn img_to_anns(self) -> BTreeMap<u64, Vec<String>> {
        let mut grouped: BTreeMap<u64, Vec<String>> = BTreeMap::new();
        for ann in self.annotations {
            grouped.entry(ann.image_id).or_default().push(ann.caption);
        }
        grouped
    }
}

pub fn load_annotation_file(path: &Path) -> Result<AnnotationFile, PreproError> {
    let file = File::open(path).map_err(|e| PreproError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// `<ann_dir>/VizWiz_Captions_v1_<split>.json`
pub fn split_annotation_path(
    ann_dir: &Path,
    split: &str,
) -> PathBuf {
    ann_dir.join(format!("VizWiz_Captions_v1_{split}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_image() {
        let file: AnnotationFile = serde_json::from_str(
            r#"{
                "images": [{"id": 9, "file_name": "x.jpg"}],
                "annotations": [
                    {"image_id": 9, "id": 1, "caption": "second image first", "is_rejected": false},
                    {"image_id": 2, "id": 2, "caption": "first image"},
                    {"image_id": 9, "id": 3, "caption": "second image second"}
                ]
            }"#,
        )
        .unwrap();
        let grouped = file.img_to_anns();
        let ids: Vec<u64> = grouped.keys().copied().collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(grouped[&9], vec!["second image first", "second image second"]);
    }

    #[test]
    fn test_missing_annotations_is_empty() {
        let file: AnnotationFile = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert!(file.img_to_anns().is_empty());
    }

    #[test]
    fn test_split_path() {
        let p = split_annotation_path(Path::new("ann"), "val");
        assert_eq!(p, Path::new("ann").join("VizWiz_Captions_v1_val.json"));
    }
}
