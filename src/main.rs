use clap::Parser;
use log::{error, info};
use std::process;

use bdd2tfrecord::{write_dataset, write_schema_file, Args, ConvertError};

fn run(args: &Args) -> Result<(), ConvertError> {
    let config = args.to_writer_config()?;
    let vocabulary = args.vocabulary();
    let inputs = args.resolve_inputs()?;
    let output_dir = args.output_dir();

    info!(
        "Label vocabulary '{}' with {} categories",
        vocabulary.version(),
        vocabulary.len()
    );

    let summary = write_dataset(&inputs, &output_dir, &config, &vocabulary)?;
    summary.stats.print_summary();
    for shard in &summary.shards {
        info!("{}: {} records", shard.path.display(), shard.records);
    }

    if args.write_schema {
        let path = write_schema_file(&output_dir)?;
        info!("Wrote feature description to {}", path.display());
    }

    Ok(())
}

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting the conversion process...");

    if let Err(e) = run(&args) {
        error!("Failed to convert dataset: {}", e);
        process::exit(1);
    }

    info!("Conversion process completed successfully.");
}
