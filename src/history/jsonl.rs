//! File-backed history: one JSON record per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{HistoryError, ObservationLog, PointingRecord};
use crate::queue::WorkItem;
use crate::resource::ResourceState;
use crate::Id;

/// History persisted at `<dir>/<run_id>.jsonl`.
///
/// Records are flushed as they are written so a crashed run keeps everything
/// logged up to that point.
#[derive(Debug)]
pub struct JsonlHistory {
    run_id: Id,
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    prev: Option<PointingRecord>,
}

impl JsonlHistory {
    /// Opens the history for `run_id` under `dir`.
    ///
    /// Existing non-empty history is truncated when `clobber` is set and
    /// rejected with [`HistoryError::HistoryExists`] otherwise.
    pub fn create(
        dir: impl AsRef<Path>,
        run_id: impl Into<Id>,
        clobber: bool,
    ) -> Result<Self, HistoryError> {
        let run_id: Id = run_id.into();
        let dir = dir.as_ref();
        let path = dir.join(format!("{run_id}.jsonl"));

        let has_data = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if has_data {
            if !clobber {
                return Err(HistoryError::HistoryExists { run_id, path });
            }
            info!("Overwriting history for run '{}' at {}", run_id, path.display());
        }

        fs::create_dir_all(dir)?;
        let file = File::create(&path)?;
        debug!("History for run '{}' at {}", run_id, path.display());
        Ok(Self {
            run_id,
            path,
            writer: BufWriter::new(file),
            written: 0,
            prev: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }
}

impl ObservationLog for JsonlHistory {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    fn log_pointing(&mut self, state: &ResourceState, item: &WorkItem) -> Result<(), HistoryError> {
        let record = PointingRecord::new(&self.run_id, self.written, state, item, self.prev.as_ref());
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        self.prev = Some(record);
        Ok(())
    }

    fn prev_obs(&self) -> Option<&PointingRecord> {
        self.prev.as_ref()
    }

    fn clear_prev_obs(&mut self) {
        self.prev = None;
    }
}

/// Reads back every record of a history file.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<PointingRecord>, HistoryError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
