use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while normalizing annotations and writing record shards.
///
/// Missing annotations and unparseable image filenames are not errors; they are
/// counted in [`crate::types::ProcessingStats`] and the file is skipped.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("annotation for '{image_id}' must contain exactly one frame, found {found}")]
    FrameCount { image_id: String, found: usize },
    #[error("category '{category}' is not part of label vocabulary '{vocabulary}'")]
    UnknownCategory {
        category: String,
        vocabulary: String,
    },
    #[error("consolidated annotation name '{name}' does not end in '.jpg'")]
    ConsolidatedFilename { name: String },
    #[error("failed to read labels from {}: {source}", path.display())]
    LabelRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse labels from {}: {source}", path.display())]
    LabelSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read image dimensions of {}: {source}", path.display())]
    ImageSize {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },
    #[error("failed to write shard {}: {source}", path.display())]
    ShardWrite {
        path: PathBuf,
        #[source]
        source: tfrecord::Error,
    },
    #[error("failed to read shard {}: {source}", path.display())]
    ShardRead {
        path: PathBuf,
        #[source]
        source: tfrecord::Error,
    },
    #[error("dataset layout error: {0}")]
    Layout(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConvertError {
    /// True for errors caused by input data that does not follow either annotation schema.
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            ConvertError::FrameCount { .. }
                | ConvertError::UnknownCategory { .. }
                | ConvertError::ConsolidatedFilename { .. }
        )
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
