use log::{debug, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::annotation::AnnotationSource;
use crate::config::WriterConfig;
use crate::error::Result;
use crate::naming::ShardNameTemplate;
use crate::record::RecordBuilder;
use crate::schema::feature_description;
use crate::shard::{ShardSummary, ShardWriter};
use crate::types::{DatasetInputs, ProcessingStats};
use crate::utils::{create_output_directory, create_progress_bar, list_files, split_image_filename};
use crate::vocabulary::LabelVocabulary;

const PROGRESS_LOG_INTERVAL: usize = 250;
pub const SCHEMA_FILE_NAME: &str = "features.json";

/// Outcome of one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: ProcessingStats,
    pub shards: Vec<ShardSummary>,
}

/// Main conversion pipeline: open the label source, list the images and write the shards
pub fn write_dataset(
    inputs: &DatasetInputs,
    output_dir: &Path,
    config: &WriterConfig,
    vocabulary: &LabelVocabulary,
) -> Result<RunSummary> {
    config.validate()?;
    info!(
        "Converting {} ({} labels) for fold {}{}",
        inputs.images_dir.display(),
        if inputs.consolidated {
            "consolidated"
        } else {
            "legacy"
        },
        config.fold,
        config.version
    );

    let source = AnnotationSource::open(inputs)?;
    let image_files = list_files(&inputs.images_dir)?;
    create_output_directory(output_dir)?;

    write_shards(&image_files, &source, output_dir, config, vocabulary)
}

/// Stream `image_files` in the given order into size-bounded shards.
///
/// Files not named `*.jpg`, images without an annotation and images rejected by
/// the scene filter are skipped and never count toward shard rotation.
pub fn write_shards(
    image_files: &[PathBuf],
    source: &AnnotationSource,
    output_dir: &Path,
    config: &WriterConfig,
    vocabulary: &LabelVocabulary,
) -> Result<RunSummary> {
    config.validate()?;
    if let Some(small_size) = config.small_size {
        info!(
            "Limiting the number of records written to {} records",
            small_size
        );
    }
    config.filter.log_configuration();

    let template = ShardNameTemplate::new(
        output_dir,
        config.fold,
        config.version,
        config.small_size,
        &config.filter,
    );
    let mut writer = ShardWriter::new(template, config.max_elements_per_file)?;
    let builder = RecordBuilder::new(vocabulary);
    let mut stats = ProcessingStats::new();

    let pb = create_progress_bar(image_files.len() as u64, config.fold.as_str());

    for image_path in image_files {
        stats.files_examined += 1;
        pb.inc(1);

        let filename = image_path.file_name().and_then(|name| name.to_str());
        let Some((image_id, format)) = filename.and_then(split_image_filename) else {
            info!(
                "Filename did not match *.jpg: {}. Skipping file.",
                image_path.display()
            );
            stats.skipped_unparseable_name += 1;
            continue;
        };

        let Some(annotation) = source.lookup(image_id)? else {
            stats.skipped_missing_annotation += 1;
            continue;
        };

        if !config.filter.accepts(annotation.attributes.as_ref()) {
            debug!("Scene filter rejected {}", image_id);
            stats.skipped_filtered += 1;
            continue;
        }

        let record = builder.build(image_id, image_path, format, Some(&annotation))?;
        writer.append(record.into_example())?;
        stats.records_written += 1;

        if stats.records_written % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                "Processed file: {}/{} ({} records written)",
                stats.files_examined,
                image_files.len(),
                stats.records_written
            );
        }

        if config
            .small_size
            .is_some_and(|small_size| writer.written() >= small_size)
        {
            info!("Reached the limit of {} records", writer.written());
            break;
        }
    }

    pb.finish_with_message("Conversion complete");
    let shards = writer.finish()?;

    Ok(RunSummary { stats, shards })
}

/// Write the reading-shape descriptor next to the shards
pub fn write_schema_file(output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(SCHEMA_FILE_NAME);
    let mut file = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut file, &feature_description()).map_err(io::Error::from)?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(path)
}
