//! BDD100K to TFRecord converter
//!
//! This library normalizes the two BDD100K detection label layouts into one bounding-box
//! representation and writes one `tf.train.Example` per image into size-bounded
//! TFRecord shards.

pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod layout;
pub mod naming;
pub mod record;
pub mod schema;
pub mod shard;
pub mod types;
pub mod utils;
pub mod vocabulary;

// Re-export commonly used types and functions
pub use annotation::{AnnotationRecord, AnnotationSource, ExtractBoxes};
pub use config::{Args, WriterConfig};
pub use dataset::{write_dataset, write_schema_file, write_shards, RunSummary};
pub use error::ConvertError;
pub use filter::SceneFilter;
pub use naming::ShardNameTemplate;
pub use record::{Record, RecordBuilder};
pub use shard::{count_records, read_examples, ShardSummary, ShardWriter};
pub use types::{
    BoundingBox, DatasetInputs, DatasetVersion, Fold, ImageAnnotation, SceneAttributes,
};
pub use vocabulary::LabelVocabulary;
