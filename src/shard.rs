//! Size-bounded record shards.
//!
//! A [`ShardWriter`] moves through `AwaitingFirstShard -> Writing -> ... -> Closed`.
//! The shard is rotated before an append whenever the number of records written so far
//! is a multiple of `max_elements_per_file`, so shard `k` holds records
//! `k * max .. (k + 1) * max`. No file is created until the first record arrives.

use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::mem;
use std::path::{Path, PathBuf};
use tfrecord::{Example, ExampleIter, ExampleWriter, RecordWriter};

use crate::error::{ConvertError, Result};
use crate::naming::ShardNameTemplate;

/// A closed shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSummary {
    pub index: usize,
    pub path: PathBuf,
    pub records: usize,
}

struct OpenShard {
    index: usize,
    path: PathBuf,
    records: usize,
    writer: ExampleWriter<BufWriter<File>>,
}

enum ShardState {
    AwaitingFirstShard,
    Writing(OpenShard),
    Closed,
}

pub struct ShardWriter {
    template: ShardNameTemplate,
    max_elements_per_file: usize,
    state: ShardState,
    next_index: usize,
    written: usize,
    closed: Vec<ShardSummary>,
}

impl ShardWriter {
    pub fn new(template: ShardNameTemplate, max_elements_per_file: usize) -> Result<Self> {
        if max_elements_per_file == 0 {
            return Err(ConvertError::Configuration(
                "max_elements_per_file must be positive".to_string(),
            ));
        }

        Ok(Self {
            template,
            max_elements_per_file,
            state: ShardState::AwaitingFirstShard,
            next_index: 0,
            written: 0,
            closed: Vec::new(),
        })
    }

    /// Total records appended across all shards.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Index of the shard currently open, if any.
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            ShardState::Writing(shard) => Some(shard.index),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ShardState::Closed)
    }

    /// Append one example, opening or rotating the shard first when required.
    pub fn append(&mut self, example: Example) -> Result<()> {
        if self.is_closed() {
            return Err(ConvertError::Configuration(
                "cannot append to a closed shard writer".to_string(),
            ));
        }

        let shard = self.shard_for_next_record()?;
        shard
            .writer
            .send(example)
            .map_err(|source| ConvertError::ShardWrite {
                path: shard.path.clone(),
                source,
            })?;
        shard.records += 1;
        self.written += 1;
        Ok(())
    }

    fn shard_for_next_record(&mut self) -> Result<&mut OpenShard> {
        if self.written % self.max_elements_per_file == 0 {
            self.rotate()?;
        }
        match &mut self.state {
            ShardState::Writing(shard) => Ok(shard),
            _ => Err(ConvertError::Configuration(
                "no shard open for writing".to_string(),
            )),
        }
    }

    fn rotate(&mut self) -> Result<()> {
        self.close_current()?;

        let index = self.next_index;
        let path = self.template.path(index);
        info!(
            "Create shard file: {} after {} records",
            path.display(),
            self.written
        );
        let writer: ExampleWriter<BufWriter<File>> =
            RecordWriter::create(&path).map_err(|source| ConvertError::ShardWrite {
                path: path.clone(),
                source,
            })?;

        self.next_index += 1;
        self.state = ShardState::Writing(OpenShard {
            index,
            path,
            records: 0,
            writer,
        });
        Ok(())
    }

    fn close_current(&mut self) -> Result<()> {
        let state = mem::replace(&mut self.state, ShardState::AwaitingFirstShard);
        if let ShardState::Writing(mut shard) = state {
            shard
                .writer
                .flush()
                .map_err(|source| ConvertError::ShardWrite {
                    path: shard.path.clone(),
                    source,
                })?;
            debug!(
                "Closed shard {} with {} records",
                shard.path.display(),
                shard.records
            );
            self.closed.push(ShardSummary {
                index: shard.index,
                path: shard.path,
                records: shard.records,
            });
        }
        Ok(())
    }

    /// Close the open shard, if any. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.close_current()?;
        self.state = ShardState::Closed;
        Ok(())
    }

    /// Close and return the summaries of every shard written, in index order.
    pub fn finish(mut self) -> Result<Vec<ShardSummary>> {
        self.close()?;
        Ok(mem::take(&mut self.closed))
    }
}

/// Read every example of a shard back, in write order. Record checksums are verified.
pub fn read_examples(path: &Path) -> Result<Vec<Example>> {
    let shard_read = |source: tfrecord::Error| ConvertError::ShardRead {
        path: path.to_path_buf(),
        source,
    };
    ExampleIter::open(path, Default::default())
        .map_err(shard_read)?
        .map(|example| example.map_err(shard_read))
        .collect()
}

pub fn count_records(path: &Path) -> Result<usize> {
    Ok(read_examples(path)?.len())
}
