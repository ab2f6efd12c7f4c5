use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One annotated object instance in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: i64,
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
    pub category: String,
    pub truncated: bool,
    pub occluded: bool,
}

/// Scene-level attributes attached to every image annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneAttributes {
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub timeofday: Option<String>,
}

/// All boxes of one image, keyed by the filename stem.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnnotation {
    pub image_id: String,
    pub attributes: Option<SceneAttributes>,
    pub boxes: Vec<BoundingBox>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fold {
    Train,
    Val,
    Test,
}

impl Fold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fold::Train => "train",
            Fold::Val => "val",
            Fold::Test => "test",
        }
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum DatasetVersion {
    #[default]
    #[value(name = "100k")]
    #[serde(rename = "100k")]
    V100k,
    #[value(name = "10k")]
    #[serde(rename = "10k")]
    V10k,
}

impl DatasetVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetVersion::V100k => "100k",
            DatasetVersion::V10k => "10k",
        }
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-resolved inputs of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInputs {
    pub images_dir: PathBuf,
    /// Directory of per-image JSON files, or one consolidated JSON array file.
    pub labels: Option<PathBuf>,
    pub consolidated: bool,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub files_examined: usize,
    pub records_written: usize,
    pub skipped_unparseable_name: usize,
    pub skipped_missing_annotation: usize,
    pub skipped_filtered: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Files examined: {}", self.files_examined);
        log::info!("Records written: {}", self.records_written);
        log::info!(
            "Skipped (filename not matching *.jpg): {}",
            self.skipped_unparseable_name
        );
        log::info!(
            "Skipped (no annotation): {}",
            self.skipped_missing_annotation
        );
        log::info!("Skipped (scene filter): {}", self.skipped_filtered);

        let total_skipped = self.skipped_unparseable_name
            + self.skipped_missing_annotation
            + self.skipped_filtered;
        if total_skipped > 0 && self.records_written == 0 {
            log::warn!(
                "All {} examined files were skipped, no records were written",
                total_skipped
            );
        }
    }
}
