//! Wire schema of a record and the matching reading-shape descriptor.

use serde::Serialize;

pub const IMAGE_HEIGHT: &str = "image/height";
pub const IMAGE_WIDTH: &str = "image/width";
pub const IMAGE_SHAPE: &str = "image/shape";
pub const BBOX_ID: &str = "image/object/bbox/id";
pub const BBOX_XMIN: &str = "image/object/bbox/xmin";
pub const BBOX_XMAX: &str = "image/object/bbox/xmax";
pub const BBOX_YMIN: &str = "image/object/bbox/ymin";
pub const BBOX_YMAX: &str = "image/object/bbox/ymax";
pub const BBOX_TRUNCATED: &str = "image/object/bbox/truncated";
pub const BBOX_OCCLUDED: &str = "image/object/bbox/occluded";
pub const CLASS_LABEL_ID: &str = "image/object/class/label/id";
pub const CLASS_LABEL: &str = "image/object/class/label";
pub const CLASS_LABEL_NAME: &str = "image/object/class/label/name";
pub const IMAGE_ENCODED: &str = "image/encoded";
pub const IMAGE_FORMAT: &str = "image/format";
pub const IMAGE_ID: &str = "image/id";
pub const IMAGE_SOURCE_ID: &str = "image/source_id";
pub const IMAGE_FILENAME: &str = "image/filename";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int64,
    Float32,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Int64(i64),
    String(String),
}

/// How a reader should parse one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    FixedLen {
        shape: Vec<usize>,
        dtype: DataType,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<DefaultValue>,
    },
    VarLen {
        dtype: DataType,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDescriptor {
    pub key: &'static str,
    #[serde(flatten)]
    pub spec: FeatureSpec,
}

fn scalar(key: &'static str, dtype: DataType, default: Option<DefaultValue>) -> FeatureDescriptor {
    FeatureDescriptor {
        key,
        spec: FeatureSpec::FixedLen {
            shape: vec![],
            dtype,
            default,
        },
    }
}

fn var_len(key: &'static str, dtype: DataType) -> FeatureDescriptor {
    FeatureDescriptor {
        key,
        spec: FeatureSpec::VarLen { dtype },
    }
}

fn empty_string(key: &'static str) -> FeatureDescriptor {
    scalar(
        key,
        DataType::String,
        Some(DefaultValue::String(String::new())),
    )
}

/// Reading shape of every feature written to a shard, in wire order.
pub fn feature_description() -> Vec<FeatureDescriptor> {
    vec![
        scalar(IMAGE_HEIGHT, DataType::Int64, Some(DefaultValue::Int64(1))),
        scalar(IMAGE_WIDTH, DataType::Int64, Some(DefaultValue::Int64(1))),
        FeatureDescriptor {
            key: IMAGE_SHAPE,
            spec: FeatureSpec::FixedLen {
                shape: vec![3],
                dtype: DataType::Int64,
                default: None,
            },
        },
        var_len(BBOX_ID, DataType::Int64),
        var_len(BBOX_XMIN, DataType::Float32),
        var_len(BBOX_XMAX, DataType::Float32),
        var_len(BBOX_YMIN, DataType::Float32),
        var_len(BBOX_YMAX, DataType::Float32),
        var_len(BBOX_TRUNCATED, DataType::Int64),
        var_len(BBOX_OCCLUDED, DataType::Int64),
        var_len(CLASS_LABEL_ID, DataType::Int64),
        var_len(CLASS_LABEL, DataType::Int64),
        var_len(CLASS_LABEL_NAME, DataType::String),
        empty_string(IMAGE_ENCODED),
        empty_string(IMAGE_FORMAT),
        empty_string(IMAGE_ID),
        empty_string(IMAGE_SOURCE_ID),
        empty_string(IMAGE_FILENAME),
    ]
}
