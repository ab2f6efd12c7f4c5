//! Per-image record assembly.

use std::fs;
use std::path::Path;
use tfrecord::{Example, Feature};

use crate::error::{ConvertError, Result};
use crate::schema;
use crate::types::ImageAnnotation;
use crate::vocabulary::LabelVocabulary;

/// The fixed-schema unit written for one image. All per-object vectors have one
/// entry per bounding box, at the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub image_id: String,
    pub source_id: String,
    pub height: i64,
    pub width: i64,
    pub encoded: Vec<u8>,
    pub format: String,
    pub filename: String,
    pub box_id: Vec<i64>,
    pub xmin: Vec<f32>,
    pub xmax: Vec<f32>,
    pub ymin: Vec<f32>,
    pub ymax: Vec<f32>,
    pub truncated: Vec<i64>,
    pub occluded: Vec<i64>,
    pub label_id: Vec<i64>,
    pub label_name: Vec<String>,
}

impl Record {
    pub fn shape(&self) -> [i64; 3] {
        [self.height, self.width, 3]
    }

    pub fn num_boxes(&self) -> usize {
        self.box_id.len()
    }

    /// Convert into the serializable example, consuming the record.
    pub fn into_example(self) -> Example {
        let shape = self.shape();
        let label_names: Vec<Vec<u8>> = self
            .label_name
            .into_iter()
            .map(String::into_bytes)
            .collect();

        vec![
            (schema::IMAGE_HEIGHT, Feature::from_i64_iter([self.height])),
            (schema::IMAGE_WIDTH, Feature::from_i64_iter([self.width])),
            (schema::IMAGE_SHAPE, Feature::from_i64_iter(shape)),
            (schema::BBOX_ID, Feature::from_i64_iter(self.box_id)),
            (schema::BBOX_XMIN, Feature::from_f32_iter(self.xmin)),
            (schema::BBOX_XMAX, Feature::from_f32_iter(self.xmax)),
            (schema::BBOX_YMIN, Feature::from_f32_iter(self.ymin)),
            (schema::BBOX_YMAX, Feature::from_f32_iter(self.ymax)),
            (schema::BBOX_TRUNCATED, Feature::from_i64_iter(self.truncated)),
            (schema::BBOX_OCCLUDED, Feature::from_i64_iter(self.occluded)),
            (
                schema::CLASS_LABEL_ID,
                Feature::from_i64_iter(self.label_id.iter().copied()),
            ),
            (schema::CLASS_LABEL, Feature::from_i64_iter(self.label_id)),
            (schema::CLASS_LABEL_NAME, Feature::from_bytes_iter(label_names)),
            (schema::IMAGE_ENCODED, Feature::from_bytes_iter([self.encoded])),
            (
                schema::IMAGE_FORMAT,
                Feature::from_bytes_iter([self.format.into_bytes()]),
            ),
            (
                schema::IMAGE_ID,
                Feature::from_bytes_iter([self.image_id.into_bytes()]),
            ),
            (
                schema::IMAGE_SOURCE_ID,
                Feature::from_bytes_iter([self.source_id.into_bytes()]),
            ),
            (
                schema::IMAGE_FILENAME,
                Feature::from_bytes_iter([self.filename.into_bytes()]),
            ),
        ]
        .into_iter()
        .map(|(key, feature)| (key.to_string(), feature))
        .collect()
    }
}

/// Builds records against an injected label vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'a> {
    vocabulary: &'a LabelVocabulary,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(vocabulary: &'a LabelVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        self.vocabulary
    }

    /// Build the record of one image. The image header is decoded for its
    /// dimensions and the file is read in full. Without an annotation every
    /// per-object vector is empty.
    pub fn build(
        &self,
        image_id: &str,
        image_path: &Path,
        format: &str,
        annotation: Option<&ImageAnnotation>,
    ) -> Result<Record> {
        let boxes = annotation.map(|a| a.boxes.as_slice()).unwrap_or_default();

        // resolve labels before touching the image
        let label_id = boxes
            .iter()
            .map(|bbox| self.vocabulary.resolve(&bbox.category))
            .collect::<Result<Vec<_>>>()?;

        let size = imagesize::size(image_path).map_err(|source| ConvertError::ImageSize {
            path: image_path.to_path_buf(),
            source,
        })?;
        let encoded = fs::read(image_path).map_err(|source| ConvertError::ImageRead {
            path: image_path.to_path_buf(),
            source,
        })?;

        let filename = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Record {
            image_id: image_id.to_string(),
            source_id: image_id.to_string(),
            height: size.height as i64,
            width: size.width as i64,
            encoded,
            format: format.to_string(),
            filename,
            box_id: boxes.iter().map(|b| b.id).collect(),
            xmin: boxes.iter().map(|b| b.xmin).collect(),
            xmax: boxes.iter().map(|b| b.xmax).collect(),
            ymin: boxes.iter().map(|b| b.ymin).collect(),
            ymax: boxes.iter().map(|b| b.ymax).collect(),
            truncated: boxes.iter().map(|b| b.truncated as i64).collect(),
            occluded: boxes.iter().map(|b| b.occluded as i64).collect(),
            label_id,
            label_name: boxes.iter().map(|b| b.category.clone()).collect(),
        })
    }
}
