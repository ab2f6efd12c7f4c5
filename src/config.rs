use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConvertError, Result};
use crate::filter::SceneFilter;
use crate::layout::resolve_dataset_root;
use crate::types::{DatasetInputs, DatasetVersion, Fold};
use crate::vocabulary::LabelVocabulary;

pub const DEFAULT_MAX_ELEMENTS_PER_FILE: usize = 1000;

/// Command-line arguments for converting BDD100K detection labels to TFRecord shards.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Root of an extracted BDD100K dataset containing images/ and labels/
    #[arg(long = "dataset_root", conflicts_with = "images_dir")]
    pub dataset_root: Option<PathBuf>,

    /// Directory containing the *.jpg images of one fold
    #[arg(long = "images_dir", required_unless_present = "dataset_root")]
    pub images_dir: Option<PathBuf>,

    /// Directory of per-image label JSON files, or the consolidated label JSON file
    #[arg(long = "labels", requires = "images_dir")]
    pub labels: Option<PathBuf>,

    /// Treat --labels as one consolidated JSON array
    #[arg(long = "consolidated", requires = "labels")]
    pub consolidated: bool,

    /// Directory the shards are written to [default: <root>/tfrecord/<version>/<fold>]
    #[arg(long = "output_dir")]
    pub output_dir: Option<PathBuf>,

    /// Dataset fold to convert
    #[arg(long = "fold", value_enum, default_value = "train")]
    pub fold: Fold,

    /// Dataset release
    #[arg(long = "dataset_version", value_enum, default_value = "100k")]
    pub dataset_version: DatasetVersion,

    /// Number of records per shard file
    #[arg(
        long = "max_elements_per_file",
        default_value_t = DEFAULT_MAX_ELEMENTS_PER_FILE,
        value_parser = validate_positive
    )]
    pub max_elements_per_file: usize,

    /// Stop after this many records in total
    #[arg(long = "small_size", value_parser = validate_positive)]
    pub small_size: Option<usize>,

    /// Keep only images with this weather attribute
    #[arg(long = "weather")]
    pub weather: Option<String>,

    /// Keep only images with this scene attribute
    #[arg(long = "scene")]
    pub scene: Option<String>,

    /// Keep only images with this time-of-day attribute
    #[arg(long = "daytime")]
    pub daytime: Option<String>,

    /// Ordered label list overriding the BDD100K detection categories
    #[arg(long = "label_list", use_value_delimiter = true)]
    pub label_list: Vec<String>,

    /// Also write features.json describing how to read the shards
    #[arg(long = "write_schema")]
    pub write_schema: bool,
}

/// Configuration consumed by the shard writing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub fold: Fold,
    pub version: DatasetVersion,
    pub max_elements_per_file: usize,
    pub small_size: Option<usize>,
    pub filter: SceneFilter,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            fold: Fold::Train,
            version: DatasetVersion::V100k,
            max_elements_per_file: DEFAULT_MAX_ELEMENTS_PER_FILE,
            small_size: None,
            filter: SceneFilter::default(),
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_elements_per_file == 0 {
            return Err(ConvertError::Configuration(
                "max_elements_per_file must be positive".to_string(),
            ));
        }
        if self.small_size == Some(0) {
            return Err(ConvertError::Configuration(
                "small_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Args {
    pub fn to_writer_config(&self) -> Result<WriterConfig> {
        let config = WriterConfig {
            fold: self.fold,
            version: self.dataset_version,
            max_elements_per_file: self.max_elements_per_file,
            small_size: self.small_size,
            filter: SceneFilter {
                weather: self.weather.clone(),
                scene: self.scene.clone(),
                timeofday: self.daytime.clone(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn vocabulary(&self) -> LabelVocabulary {
        if self.label_list.is_empty() {
            LabelVocabulary::deepdrive()
        } else {
            LabelVocabulary::new("custom", self.label_list.iter().cloned())
        }
    }

    pub fn resolve_inputs(&self) -> Result<DatasetInputs> {
        match (&self.dataset_root, &self.images_dir) {
            (Some(root), _) => resolve_dataset_root(root, self.fold, self.dataset_version),
            (None, Some(images_dir)) => Ok(DatasetInputs {
                images_dir: images_dir.clone(),
                labels: self.labels.clone(),
                consolidated: self.consolidated,
            }),
            (None, None) => Err(ConvertError::Configuration(
                "either --dataset_root or --images_dir is required".to_string(),
            )),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .dataset_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tfrecord")
                .join(self.dataset_version.as_str())
                .join(self.fold.as_str()),
        }
    }
}

// Validate that the value is a positive integer
fn validate_positive(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("value must be a positive integer".to_string()),
    }
}
