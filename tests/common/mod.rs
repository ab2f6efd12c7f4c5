#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a black JPEG of the given size.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(width, height).save(&path).unwrap();
    path
}

pub fn scene(weather: &str, scene: &str, timeofday: &str) -> Value {
    json!({ "weather": weather, "scene": scene, "timeofday": timeofday })
}

pub fn car(id: i64, x1: f64, y1: f64, x2: f64, y2: f64) -> Value {
    json!({
        "category": "car",
        "id": id,
        "attributes": { "occluded": false, "truncated": false, "trafficLightColor": "none" },
        "box2d": { "x1": x1, "y1": y1, "x2": x2, "y2": y2 }
    })
}

pub fn lane(id: i64) -> Value {
    json!({
        "category": "lane/single white",
        "id": id,
        "attributes": { "laneDirection": "parallel" },
        "poly2d": [{ "vertices": [[0.0, 0.0], [10.0, 10.0]], "types": "LL", "closed": false }]
    })
}

/// Objects shared by the legacy and consolidated fixtures.
pub fn sample_objects() -> Vec<Value> {
    vec![
        json!({
            "category": "car",
            "id": 7,
            "attributes": { "occluded": true, "truncated": false },
            "box2d": { "x1": 10.5, "y1": 20.0, "x2": 30.25, "y2": 40.0 }
        }),
        json!({
            "category": "traffic light",
            "id": 8,
            "attributes": { "occluded": false, "truncated": null },
            "box2d": { "x1": 1.0, "y1": 2.0, "x2": 3.0, "y2": 4.0 }
        }),
        json!({
            "category": "person",
            "id": 9,
            "box2d": { "x1": 5.0, "y1": 6.0, "x2": 7.0, "y2": 8.0 }
        }),
        lane(10),
    ]
}

pub fn legacy_annotation(name: &str, attributes: Value, objects: Vec<Value>) -> Value {
    json!({
        "name": name,
        "attributes": attributes,
        "frames": [{ "timestamp": 10000, "objects": objects }]
    })
}

pub fn consolidated_element(filename: &str, attributes: Value, labels: Vec<Value>) -> Value {
    json!({
        "name": filename,
        "attributes": attributes,
        "timestamp": 10000,
        "labels": labels
    })
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// File names of the regular files in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
