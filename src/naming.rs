use std::path::{Path, PathBuf};

use crate::filter::SceneFilter;
use crate::types::{DatasetVersion, Fold};

pub const SHARD_EXTENSION: &str = "tfrecord";

/// Deterministic shard filename pattern. The only free slot is the shard index,
/// rendered zero-padded to six digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardNameTemplate {
    output_dir: PathBuf,
    prefix: String,
}

impl ShardNameTemplate {
    pub fn new(
        output_dir: &Path,
        fold: Fold,
        version: DatasetVersion,
        small_size: Option<usize>,
        filter: &SceneFilter,
    ) -> Self {
        let mut extra_parts = String::new();
        if let Some(small_size) = small_size {
            extra_parts.push_str(&format!("number_of_files_{}_", small_size));
        }
        if let Some(weather) = &filter.weather {
            extra_parts.push_str(&format!("weather_{}_", weather));
        }
        if let Some(scene) = &filter.scene {
            extra_parts.push_str(&format!("scene_{}_", scene));
        }
        if let Some(timeofday) = &filter.timeofday {
            extra_parts.push_str(&format!("daytime_{}_", timeofday));
        }

        Self {
            output_dir: output_dir.to_path_buf(),
            prefix: format!("output_{}{}_{}", fold, version, extra_parts),
        }
    }

    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{:06}.{}", self.prefix, index, SHARD_EXTENSION)
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.output_dir.join(self.file_name(index))
    }
}
