//! Resolution of an extracted BDD100K dataset root to the inputs of one fold.
//!
//! Expected layout:
//!
//! ```text
//! <root>/images/bdd100k/images/<version>/<fold>/*.jpg
//! <root>/labels/bdd100k/labels/bdd100k_labels_images_<fold>.json   (consolidated)
//! <root>/labels/bdd100k/labels/<version>/<fold>/<image_id>.json    (legacy)
//! ```

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::{DatasetInputs, DatasetVersion, Fold};
use crate::utils::list_files;

pub fn images_dir(root: &Path, fold: Fold, version: DatasetVersion) -> PathBuf {
    root.join("images/bdd100k/images")
        .join(version.as_str())
        .join(fold.as_str())
}

pub fn labels_root(root: &Path) -> PathBuf {
    root.join("labels/bdd100k/labels")
}

pub fn consolidated_labels_file(root: &Path, fold: Fold) -> PathBuf {
    labels_root(root).join(format!("bdd100k_labels_images_{}.json", fold))
}

pub fn legacy_labels_dir(root: &Path, fold: Fold, version: DatasetVersion) -> PathBuf {
    labels_root(root).join(version.as_str()).join(fold.as_str())
}

pub fn resolve_dataset_root(
    root: &Path,
    fold: Fold,
    version: DatasetVersion,
) -> Result<DatasetInputs> {
    let images_dir = images_dir(root, fold, version);
    if !images_dir.is_dir() || list_files(&images_dir)?.is_empty() {
        return Err(ConvertError::Layout(format!(
            "no images found in {}",
            images_dir.display()
        )));
    }

    if fold == Fold::Test {
        info!("The test fold has no labels");
        return Ok(DatasetInputs {
            images_dir,
            labels: None,
            consolidated: true,
        });
    }

    let consolidated = consolidated_labels_file(root, fold);
    if consolidated.is_file() {
        info!("Using consolidated labels: {}", consolidated.display());
        return Ok(DatasetInputs {
            images_dir,
            labels: Some(consolidated),
            consolidated: true,
        });
    }

    let legacy = legacy_labels_dir(root, fold, version);
    if legacy.is_dir() {
        info!("Using legacy per-image labels: {}", legacy.display());
        return Ok(DatasetInputs {
            images_dir,
            labels: Some(legacy),
            consolidated: false,
        });
    }

    warn!(
        "Neither {} nor {} exists",
        consolidated.display(),
        legacy.display()
    );
    Err(ConvertError::Layout(format!(
        "no labels found below {}",
        labels_root(root).display()
    )))
}
