mod common;

use bdd2tfrecord::annotation::{
    index_consolidated, AnnotationRecord, ConsolidatedAnnotation, ExtractBoxes, LegacyAnnotation,
};
use bdd2tfrecord::config::DEFAULT_MAX_ELEMENTS_PER_FILE;
use bdd2tfrecord::schema::{self, feature_description, DataType, FeatureSpec};
use bdd2tfrecord::types::DatasetInputs;
use bdd2tfrecord::utils::split_image_filename;
use bdd2tfrecord::vocabulary::DEEPDRIVE_LABELS;
use bdd2tfrecord::{
    AnnotationSource, Args, BoundingBox, ConvertError, DatasetVersion, Fold, ImageAnnotation,
    LabelVocabulary, RecordBuilder, SceneAttributes, SceneFilter, ShardNameTemplate,
};
use clap::Parser;
use common::*;
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn legacy(value: serde_json::Value) -> LegacyAnnotation {
    serde_json::from_value(value).unwrap()
}

fn consolidated(value: serde_json::Value) -> ConsolidatedAnnotation {
    serde_json::from_value(value).unwrap()
}

fn attributes(weather: &str, scene: &str, timeofday: &str) -> SceneAttributes {
    SceneAttributes {
        weather: Some(weather.to_string()),
        scene: Some(scene.to_string()),
        timeofday: Some(timeofday.to_string()),
    }
}

fn annotation_with(categories: &[&str]) -> ImageAnnotation {
    ImageAnnotation {
        image_id: "img".to_string(),
        attributes: None,
        boxes: categories
            .iter()
            .enumerate()
            .map(|(i, category)| BoundingBox {
                id: i as i64,
                xmin: 0.0,
                xmax: 1.0,
                ymin: 0.0,
                ymax: 1.0,
                category: category.to_string(),
                truncated: i % 2 == 0,
                occluded: false,
            })
            .collect(),
    }
}

#[test]
fn test_split_image_filename() {
    assert_eq!(split_image_filename("abc.jpg"), Some(("abc", "jpg")));
    assert_eq!(
        split_image_filename("0a0a0b1a-7c39d841.jpg"),
        Some(("0a0a0b1a-7c39d841", "jpg"))
    );
    assert_eq!(split_image_filename("abc.JPG"), None);
    assert_eq!(split_image_filename("abc.png"), None);
    assert_eq!(split_image_filename("abc.jpg.json"), None);
}

#[test]
fn test_vocabulary_label_ids() {
    let vocabulary = LabelVocabulary::deepdrive();
    assert_eq!(vocabulary.len(), DEEPDRIVE_LABELS.len());

    for (index, label) in DEEPDRIVE_LABELS.iter().enumerate() {
        assert_eq!(vocabulary.resolve(label).unwrap(), index as i64 + 1);
    }

    let err = vocabulary.resolve("unicorn").unwrap_err();
    assert!(err.is_schema_violation());
    assert!(matches!(err, ConvertError::UnknownCategory { .. }));
    // lookup is case-sensitive
    assert!(vocabulary.get("Car").is_none());
}

#[test]
fn test_custom_vocabulary_ignores_duplicates() {
    let vocabulary = LabelVocabulary::new("custom", ["car", "bus", "car"]);
    assert_eq!(vocabulary.len(), 2);
    assert_eq!(vocabulary.get("car"), Some(1));
    assert_eq!(vocabulary.get("bus"), Some(2));
    assert_eq!(vocabulary.version(), "custom");
}

#[test]
fn test_legacy_extracts_only_box2d_objects() {
    let annotation = legacy(legacy_annotation(
        "img",
        scene("rainy", "highway", "night"),
        sample_objects(),
    ));

    let boxes = annotation.extract_boxes("img").unwrap();
    assert_eq!(boxes.len(), 3);
    assert_eq!(
        boxes[0],
        BoundingBox {
            id: 7,
            xmin: 10.5,
            xmax: 30.25,
            ymin: 20.0,
            ymax: 40.0,
            category: "car".to_string(),
            truncated: false,
            occluded: true,
        }
    );
    // null and absent flags default to false
    assert!(!boxes[1].truncated);
    assert!(!boxes[2].truncated && !boxes[2].occluded);

    let normalized = annotation.normalize("img").unwrap();
    assert_eq!(normalized.image_id, "img");
    assert_eq!(
        normalized.attributes,
        Some(attributes("rainy", "highway", "night"))
    );
}

#[test]
fn test_legacy_requires_exactly_one_frame() {
    let mut value = legacy_annotation("img", scene("clear", "city street", "daytime"), vec![]);
    value["frames"] = json!([]);
    let err = legacy(value.clone()).extract_boxes("img").unwrap_err();
    assert!(matches!(err, ConvertError::FrameCount { found: 0, .. }));
    assert!(err.is_schema_violation());

    value["frames"] = json!([{ "objects": [] }, { "objects": [] }]);
    let err = legacy(value).extract_boxes("img").unwrap_err();
    assert!(matches!(err, ConvertError::FrameCount { found: 2, .. }));
}

#[test]
fn test_consolidated_index_rejects_non_jpg_names() {
    let elements = vec![
        consolidated(consolidated_element("a.jpg", scene("clear", "highway", "dawn/dusk"), vec![])),
        consolidated(consolidated_element("b.png", scene("clear", "highway", "dawn/dusk"), vec![])),
    ];

    let err = index_consolidated(elements).unwrap_err();
    assert!(err.is_schema_violation());
    assert!(matches!(err, ConvertError::ConsolidatedFilename { ref name } if name == "b.png"));
}

#[test]
fn test_consolidated_lookup() {
    let temp_dir = tempfile::tempdir().unwrap();
    let labels = temp_dir.path().join("labels.json");
    write_json(
        &labels,
        &json!([
            consolidated_element("a.jpg", scene("clear", "highway", "daytime"), sample_objects()),
            consolidated_element("b.jpg", scene("snowy", "residential", "night"), vec![]),
        ]),
    );

    let source = AnnotationSource::open(&DatasetInputs {
        images_dir: temp_dir.path().to_path_buf(),
        labels: Some(labels),
        consolidated: true,
    })
    .unwrap();

    let a = source.lookup("a").unwrap().unwrap();
    assert_eq!(a.boxes.len(), 3);
    let b = source.lookup("b").unwrap().unwrap();
    assert!(b.boxes.is_empty());
    assert_eq!(b.attributes, Some(attributes("snowy", "residential", "night")));
    assert!(source.lookup("c").unwrap().is_none());
}

#[test]
fn test_consolidated_load_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let labels = temp_dir.path().join("labels.json");
    std::fs::write(&labels, b"{ not json").unwrap();

    let err = AnnotationSource::load_consolidated(&labels).unwrap_err();
    assert!(matches!(err, ConvertError::LabelSource { .. }));

    let err = AnnotationSource::load_consolidated(&temp_dir.path().join("missing.json"))
        .unwrap_err();
    assert!(matches!(err, ConvertError::LabelRead { .. }));
}

#[test]
fn test_legacy_lookup_missing_file_is_unannotated() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_json(
        &temp_dir.path().join("a.json"),
        &legacy_annotation("a", scene("clear", "highway", "daytime"), vec![car(1, 0.0, 0.0, 1.0, 1.0)]),
    );

    let source = AnnotationSource::Legacy {
        labels_dir: temp_dir.path().to_path_buf(),
    };
    assert_eq!(source.lookup("a").unwrap().unwrap().boxes.len(), 1);
    assert!(source.lookup("b").unwrap().is_none());
    assert!(AnnotationSource::Unlabelled.lookup("a").unwrap().is_none());
}

#[test]
fn test_schema_equivalence() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = write_jpeg(temp_dir.path(), "img.jpg", 16, 8);

    let from_legacy = AnnotationRecord::Legacy(legacy(legacy_annotation(
        "img",
        scene("overcast", "tunnel", "daytime"),
        sample_objects(),
    )))
    .normalize("img")
    .unwrap();
    let from_consolidated = AnnotationRecord::Consolidated(consolidated(consolidated_element(
        "img.jpg",
        scene("overcast", "tunnel", "daytime"),
        sample_objects(),
    )))
    .normalize("img")
    .unwrap();
    assert_eq!(from_legacy, from_consolidated);

    let vocabulary = LabelVocabulary::deepdrive();
    let builder = RecordBuilder::new(&vocabulary);
    let legacy_record = builder
        .build("img", &image_path, "jpg", Some(&from_legacy))
        .unwrap();
    let consolidated_record = builder
        .build("img", &image_path, "jpg", Some(&from_consolidated))
        .unwrap();
    assert_eq!(legacy_record, consolidated_record);
}

#[test]
fn test_record_parallel_arrays() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = write_jpeg(temp_dir.path(), "img.jpg", 32, 24);
    let vocabulary = LabelVocabulary::deepdrive();
    let annotation = annotation_with(&["car", "bus", "rider"]);

    let record = RecordBuilder::new(&vocabulary)
        .build("img", &image_path, "jpg", Some(&annotation))
        .unwrap();

    let lengths = [
        record.box_id.len(),
        record.xmin.len(),
        record.xmax.len(),
        record.ymin.len(),
        record.ymax.len(),
        record.truncated.len(),
        record.occluded.len(),
        record.label_id.len(),
        record.label_name.len(),
    ];
    assert!(lengths.iter().all(|&len| len == 3));
    assert_eq!(record.label_id, vec![8, 1, 10]);
    assert_eq!(record.truncated, vec![1, 0, 1]);
    assert_eq!(record.occluded, vec![0, 0, 0]);
    assert_eq!(record.height, 24);
    assert_eq!(record.width, 32);
    assert_eq!(record.shape(), [24, 32, 3]);
    assert_eq!(record.filename, "img.jpg");
    assert_eq!(record.image_id, "img");
    assert_eq!(record.source_id, "img");
    assert_eq!(record.encoded, std::fs::read(&image_path).unwrap());
}

#[test]
fn test_record_without_annotation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = write_jpeg(temp_dir.path(), "bg.jpg", 4, 4);
    let vocabulary = LabelVocabulary::deepdrive();

    let record = RecordBuilder::new(&vocabulary)
        .build("bg", &image_path, "jpg", None)
        .unwrap();
    assert_eq!(record.num_boxes(), 0);
    assert!(record.label_name.is_empty() && record.xmin.is_empty() && record.occluded.is_empty());
    assert_eq!(record.shape(), [4, 4, 3]);
}

#[test]
fn test_record_unknown_category_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = write_jpeg(temp_dir.path(), "img.jpg", 4, 4);
    let vocabulary = LabelVocabulary::deepdrive();

    let err = RecordBuilder::new(&vocabulary)
        .build("img", &image_path, "jpg", Some(&annotation_with(&["car", "tram"])))
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnknownCategory { ref category, .. } if category == "tram"));
}

#[test]
fn test_record_missing_image_is_fatal() {
    let vocabulary = LabelVocabulary::deepdrive();
    let err = RecordBuilder::new(&vocabulary)
        .build("nope", Path::new("/nonexistent/nope.jpg"), "jpg", None)
        .unwrap_err();
    assert!(!err.is_schema_violation());
}

#[test]
fn test_record_into_example() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = write_jpeg(temp_dir.path(), "img.jpg", 6, 5);
    let vocabulary = LabelVocabulary::deepdrive();
    let record = RecordBuilder::new(&vocabulary)
        .build("img", &image_path, "jpg", Some(&annotation_with(&["car", "truck"])))
        .unwrap();
    let encoded = record.encoded.clone();

    let features = record.into_example().into_hash_map();
    assert_eq!(features.len(), feature_description().len());

    let shape = features[schema::IMAGE_SHAPE].as_i64_list().unwrap();
    assert_eq!(shape, [5, 6, 3]);
    let labels = features[schema::CLASS_LABEL].as_i64_list().unwrap();
    assert_eq!(labels, [8, 6]);
    let label_ids = features[schema::CLASS_LABEL_ID].as_i64_list().unwrap();
    assert_eq!(label_ids, [8, 6]);
    let names = features[schema::CLASS_LABEL_NAME].as_bytes_list().unwrap();
    assert_eq!(names, [b"car".to_vec(), b"truck".to_vec()]);
    let xmax = features[schema::BBOX_XMAX].as_f32_list().unwrap();
    assert_eq!(xmax, [1.0, 1.0]);
    assert!(features[schema::BBOX_XMAX].as_i64_list().is_none());
    let bytes = features[schema::IMAGE_ENCODED].as_bytes_list().unwrap();
    assert_eq!(bytes, [encoded]);
    let format = features[schema::IMAGE_FORMAT].as_bytes_list().unwrap();
    assert_eq!(format, [b"jpg".to_vec()]);
}

#[test]
fn test_feature_description() {
    let description = feature_description();
    assert_eq!(description.len(), 18);

    let keys: HashSet<_> = description.iter().map(|d| d.key).collect();
    assert_eq!(keys.len(), description.len());

    let shape = description
        .iter()
        .find(|d| d.key == schema::IMAGE_SHAPE)
        .unwrap();
    assert_eq!(
        shape.spec,
        FeatureSpec::FixedLen {
            shape: vec![3],
            dtype: DataType::Int64,
            default: None
        }
    );
    let names = description
        .iter()
        .find(|d| d.key == schema::CLASS_LABEL_NAME)
        .unwrap();
    assert_eq!(
        names.spec,
        FeatureSpec::VarLen {
            dtype: DataType::String
        }
    );

    let value = serde_json::to_value(&description).unwrap();
    assert_eq!(value[0]["key"], "image/height");
    assert_eq!(value[0]["kind"], "fixed_len");
    assert_eq!(value[0]["default"], 1);
    assert_eq!(value[3]["kind"], "var_len");
    assert_eq!(value[13]["default"], "");
}

#[test]
fn test_scene_filter() {
    let attrs = attributes("rainy", "city street", "night");

    assert!(SceneFilter::default().accepts(Some(&attrs)));
    assert!(SceneFilter::default().accepts(None));

    let filter = SceneFilter {
        weather: Some("rainy".to_string()),
        timeofday: Some("night".to_string()),
        ..Default::default()
    };
    assert!(filter.accepts(Some(&attrs)));
    assert!(!filter.accepts(None));

    let wrong_case = SceneFilter {
        weather: Some("Rainy".to_string()),
        ..Default::default()
    };
    assert!(!wrong_case.accepts(Some(&attrs)));

    let scene = SceneFilter {
        scene: Some("highway".to_string()),
        ..Default::default()
    };
    assert!(!scene.accepts(Some(&attrs)));

    let missing = SceneAttributes {
        weather: None,
        ..attrs.clone()
    };
    assert!(!filter.accepts(Some(&missing)));
}

#[test]
fn test_shard_name_template() {
    let dir = PathBuf::from("/out");
    let plain = ShardNameTemplate::new(
        &dir,
        Fold::Train,
        DatasetVersion::V100k,
        None,
        &SceneFilter::default(),
    );
    assert_eq!(plain.file_name(0), "output_train100k__000000.tfrecord");
    assert_eq!(plain.path(3), dir.join("output_train100k__000003.tfrecord"));

    let filter = SceneFilter {
        weather: Some("rainy".to_string()),
        scene: Some("city street".to_string()),
        timeofday: Some("night".to_string()),
    };
    let filtered = ShardNameTemplate::new(&dir, Fold::Val, DatasetVersion::V10k, Some(5), &filter);
    assert_eq!(
        filtered.file_name(12),
        "output_val10k_number_of_files_5_weather_rainy_scene_city street_daytime_night__000012.tfrecord"
    );
    assert_eq!(
        filtered,
        ShardNameTemplate::new(&dir, Fold::Val, DatasetVersion::V10k, Some(5), &filter)
    );
}

#[test]
fn test_args_to_writer_config() {
    let args = Args::try_parse_from([
        "bdd2tfrecord",
        "--images_dir",
        "images",
        "--labels",
        "labels.json",
        "--consolidated",
        "--fold",
        "val",
        "--dataset_version",
        "10k",
        "--small_size",
        "10",
        "--weather",
        "rainy",
    ])
    .unwrap();

    let config = args.to_writer_config().unwrap();
    assert_eq!(config.fold, Fold::Val);
    assert_eq!(config.version, DatasetVersion::V10k);
    assert_eq!(config.max_elements_per_file, DEFAULT_MAX_ELEMENTS_PER_FILE);
    assert_eq!(config.small_size, Some(10));
    assert_eq!(config.filter.weather.as_deref(), Some("rainy"));
    assert!(config.filter.scene.is_none());

    let inputs = args.resolve_inputs().unwrap();
    assert_eq!(inputs.images_dir, PathBuf::from("images"));
    assert_eq!(inputs.labels, Some(PathBuf::from("labels.json")));
    assert!(inputs.consolidated);
    assert_eq!(args.output_dir(), PathBuf::from("./tfrecord/10k/val"));
    assert_eq!(args.vocabulary(), LabelVocabulary::deepdrive());
}

#[test]
fn test_args_validation() {
    assert!(Args::try_parse_from(["bdd2tfrecord"]).is_err());
    assert!(Args::try_parse_from([
        "bdd2tfrecord",
        "--images_dir",
        "images",
        "--max_elements_per_file",
        "0"
    ])
    .is_err());
    assert!(
        Args::try_parse_from(["bdd2tfrecord", "--images_dir", "images", "--small_size", "0"])
            .is_err()
    );
    assert!(Args::try_parse_from([
        "bdd2tfrecord",
        "--images_dir",
        "images",
        "--dataset_root",
        "bdd"
    ])
    .is_err());

    let args = Args::try_parse_from([
        "bdd2tfrecord",
        "--images_dir",
        "images",
        "--label_list",
        "car,bus",
    ])
    .unwrap();
    let vocabulary = args.vocabulary();
    assert_eq!(vocabulary.labels(), &["car".to_string(), "bus".to_string()]);
    assert_eq!(vocabulary.get("bus"), Some(2));
}
