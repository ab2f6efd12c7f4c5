//! Annotation normalization
//!
//! BDD100K labels come in two layouts: the legacy one ships one JSON file per image
//! with the objects nested inside a single frame, the consolidated one ships one JSON
//! array per fold with a flat `labels` list per image. Both are reduced to
//! [`ImageAnnotation`] so the record builder never sees the difference.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::{BoundingBox, DatasetInputs, ImageAnnotation, SceneAttributes};
use crate::utils::{read_json, split_image_filename};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Box2d {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    #[serde(default)]
    pub truncated: Option<bool>,
    #[serde(default)]
    pub occluded: Option<bool>,
}

/// One labelled object. Only objects carrying `box2d` become bounding boxes;
/// lane and drivable-area polygons are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelObject {
    #[serde(default)]
    pub id: i64,
    pub category: String,
    #[serde(default)]
    pub attributes: Option<ObjectAttributes>,
    #[serde(default)]
    pub box2d: Option<Box2d>,
}

impl LabelObject {
    fn to_bounding_box(&self) -> Option<BoundingBox> {
        let box2d = self.box2d.as_ref()?;
        let attributes = self.attributes.clone().unwrap_or_default();

        Some(BoundingBox {
            id: self.id,
            xmin: box2d.x1,
            xmax: box2d.x2,
            ymin: box2d.y1,
            ymax: box2d.y2,
            category: self.category.clone(),
            truncated: attributes.truncated.unwrap_or(false),
            occluded: attributes.occluded.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub objects: Vec<LabelObject>,
}

/// Per-image file of the legacy layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAnnotation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Option<SceneAttributes>,
    pub frames: Vec<Frame>,
}

/// One element of the consolidated per-fold array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedAnnotation {
    pub name: String,
    #[serde(default)]
    pub attributes: Option<SceneAttributes>,
    #[serde(default)]
    pub labels: Vec<LabelObject>,
}

/// Capability shared by both annotation layouts
pub trait ExtractBoxes {
    fn scene_attributes(&self) -> Option<&SceneAttributes>;

    fn extract_boxes(&self, image_id: &str) -> Result<Vec<BoundingBox>>;

    fn normalize(&self, image_id: &str) -> Result<ImageAnnotation> {
        Ok(ImageAnnotation {
            image_id: image_id.to_string(),
            attributes: self.scene_attributes().cloned(),
            boxes: self.extract_boxes(image_id)?,
        })
    }
}

impl ExtractBoxes for LegacyAnnotation {
    fn scene_attributes(&self) -> Option<&SceneAttributes> {
        self.attributes.as_ref()
    }

    fn extract_boxes(&self, image_id: &str) -> Result<Vec<BoundingBox>> {
        if self.frames.len() != 1 {
            return Err(ConvertError::FrameCount {
                image_id: image_id.to_string(),
                found: self.frames.len(),
            });
        }

        Ok(self
            .frames
            .iter()
            .flat_map(|frame| frame.objects.iter())
            .filter_map(LabelObject::to_bounding_box)
            .collect())
    }
}

impl ExtractBoxes for ConsolidatedAnnotation {
    fn scene_attributes(&self) -> Option<&SceneAttributes> {
        self.attributes.as_ref()
    }

    fn extract_boxes(&self, _image_id: &str) -> Result<Vec<BoundingBox>> {
        Ok(self
            .labels
            .iter()
            .filter_map(LabelObject::to_bounding_box)
            .collect())
    }
}

/// An annotation in either layout.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationRecord {
    Legacy(LegacyAnnotation),
    Consolidated(ConsolidatedAnnotation),
}

impl ExtractBoxes for AnnotationRecord {
    fn scene_attributes(&self) -> Option<&SceneAttributes> {
        match self {
            AnnotationRecord::Legacy(annotation) => annotation.scene_attributes(),
            AnnotationRecord::Consolidated(annotation) => annotation.scene_attributes(),
        }
    }

    fn extract_boxes(&self, image_id: &str) -> Result<Vec<BoundingBox>> {
        match self {
            AnnotationRecord::Legacy(annotation) => annotation.extract_boxes(image_id),
            AnnotationRecord::Consolidated(annotation) => annotation.extract_boxes(image_id),
        }
    }
}

/// Index consolidated elements by image id (the `.jpg`-stripped name).
/// A later element with the same name replaces an earlier one.
pub fn index_consolidated(
    elements: Vec<ConsolidatedAnnotation>,
) -> Result<HashMap<String, ConsolidatedAnnotation>> {
    let mut index = HashMap::with_capacity(elements.len());
    for element in elements {
        let image_id = match split_image_filename(&element.name) {
            Some((stem, _)) => stem.to_string(),
            None => {
                return Err(ConvertError::ConsolidatedFilename {
                    name: element.name.clone(),
                })
            }
        };
        index.insert(image_id, element);
    }
    Ok(index)
}

/// Where annotations are looked up during the write pass.
#[derive(Debug, Clone)]
pub enum AnnotationSource {
    /// No labels at all (e.g. the test fold); every lookup misses.
    Unlabelled,
    /// Directory holding `<image_id>.json` per image, read lazily.
    Legacy { labels_dir: PathBuf },
    /// Eagerly loaded consolidated array.
    Consolidated {
        index: HashMap<String, ConsolidatedAnnotation>,
    },
}

impl AnnotationSource {
    /// Open the label source described by `inputs`. The consolidated file is read in full here.
    pub fn open(inputs: &DatasetInputs) -> Result<Self> {
        match (&inputs.labels, inputs.consolidated) {
            (None, _) => {
                info!("No label source configured, every image will be skipped");
                Ok(AnnotationSource::Unlabelled)
            }
            (Some(path), true) => Self::load_consolidated(path),
            (Some(path), false) => {
                info!("Reading legacy per-image labels from {}", path.display());
                Ok(AnnotationSource::Legacy {
                    labels_dir: path.clone(),
                })
            }
        }
    }

    pub fn load_consolidated(path: &Path) -> Result<Self> {
        info!("Loading consolidated labels from {}", path.display());
        let elements: Vec<ConsolidatedAnnotation> = read_json(path)?;
        let index = index_consolidated(elements)?;
        info!("Indexed annotations for {} images", index.len());
        Ok(AnnotationSource::Consolidated { index })
    }

    /// Fetch and normalize the annotation of `image_id`. `Ok(None)` means the image is unannotated.
    pub fn lookup(&self, image_id: &str) -> Result<Option<ImageAnnotation>> {
        match self {
            AnnotationSource::Unlabelled => Ok(None),
            AnnotationSource::Legacy { labels_dir } => {
                let path = labels_dir.join(format!("{}.json", image_id));
                match read_json::<LegacyAnnotation>(&path) {
                    Ok(annotation) => {
                        AnnotationRecord::Legacy(annotation).normalize(image_id).map(Some)
                    }
                    Err(ConvertError::LabelRead { source, .. })
                        if source.kind() == io::ErrorKind::NotFound =>
                    {
                        debug!("No label file for {}", image_id);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
            AnnotationSource::Consolidated { index } => index
                .get(image_id)
                .map(|annotation| annotation.normalize(image_id))
                .transpose(),
        }
    }
}
