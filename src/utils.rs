use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// The only image extension accepted by the converter (case-sensitive)
pub const IMAGE_EXTENSION: &str = "jpg";

/// Split `<stem>.jpg` into its stem and extension. Any other name yields `None`.
pub fn split_image_filename(filename: &str) -> Option<(&str, &str)> {
    let stem = filename.strip_suffix(".jpg")?;
    Some((stem, IMAGE_EXTENSION))
}

/// Read and parse a JSON file directly from a buffered file stream
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path).map_err(|source| ConvertError::LabelRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConvertError::LabelSource {
        path: path.to_path_buf(),
        source,
    })
}

/// List the regular files directly inside `dir`, in the lister's (lexical) order
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir.to_str().ok_or_else(|| {
        ConvertError::Configuration(format!("non UTF-8 directory path: {}", dir.display()))
    })?;
    let pattern = format!("{}/*", Pattern::escape(dir_str));

    let entries = glob(&pattern)
        .map_err(|e| ConvertError::Configuration(format!("invalid glob pattern: {}", e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConvertError::Io(e.into()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .progress_chars("#>-"),
    );
    pb
}

/// Create the output directory if needed. Existing shards are overwritten, never deleted.
pub fn create_output_directory(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Shards with the same name will be overwritten.",
            path
        );
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}
