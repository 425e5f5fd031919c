//! TOML run configuration.
//!
//! A run file describes the scheduler settings, the block grid, the capacity
//! model and the initial set of queues:
//!
//! ```toml
//! [scheduler]
//! run_name = "night_59000"
//! output_dir = "runs"
//! start_mjd = 59000.1
//! stop_mjd = 59000.5
//!
//! [blocks]
//! block_size_min = 20.0
//!
//! [capacity]
//! exposure_time_s = 30.0
//! readout_time_s = 15.0
//! programs = [1, 2, 3]
//!
//! [[queues]]
//! name = "default"
//! kind = "list"
//!
//! [[queues]]
//! name = "too_grb"
//! override = true
//! window = [59000.25, 59000.3]
//! requests = [{ request_id = 1, program_id = 2, ra_deg = 120.0, dec_deg = 30.0 }]
//! ```

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use qtty::{Minute, Quantity};
use serde::{Deserialize, Serialize};

use crate::blocks::BlockGrid;
use crate::history::{HistoryError, JsonlHistory};
use crate::queue::{ListQueue, ObservationQueue, ProgramId, QueueKind, Request, RequestId};
use crate::resource::Target;
use crate::runner::RunnerConfig;
use crate::scheduler::{CapacityModel, QueueRegistry};
use crate::units::{Mjd, Seconds};
use crate::window::ValidityWindow;
use crate::Id;

/// Complete run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub blocks: BlockSettings,
    #[serde(default)]
    pub capacity: CapacitySettings,
    #[serde(default)]
    pub queues: Vec<QueueConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Run identifier; also names the history file. A UUID when omitted.
    #[serde(default = "crate::generate_id")]
    pub run_name: Id,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub clobber_history: bool,
    #[serde(default)]
    pub start_mjd: Option<f64>,
    #[serde(default)]
    pub stop_mjd: Option<f64>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            run_name: crate::generate_id(),
            output_dir: default_output_dir(),
            clobber_history: false,
            start_mjd: None,
            stop_mjd: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSettings {
    #[serde(default = "default_block_size_min")]
    pub block_size_min: f64,
    #[serde(default)]
    pub origin_mjd: f64,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            block_size_min: default_block_size_min(),
            origin_mjd: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySettings {
    #[serde(default = "default_exposure_time_s")]
    pub exposure_time_s: f64,
    #[serde(default = "default_readout_time_s")]
    pub readout_time_s: f64,
    #[serde(default = "default_programs")]
    pub programs: Vec<ProgramId>,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            exposure_time_s: default_exposure_time_s(),
            readout_time_s: default_readout_time_s(),
            programs: default_programs(),
        }
    }
}

/// One `[[queues]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub name: Id,
    #[serde(default = "default_kind")]
    pub kind: QueueKind,
    /// `[start, end)` in MJD.
    #[serde(default)]
    pub window: Option<[f64; 2]>,
    #[serde(default, rename = "override", alias = "is_too")]
    pub is_override: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub requests: Vec<RequestConfig>,
}

impl QueueConfig {
    /// The configured window, if any.
    pub fn validity_window(&self) -> Result<Option<ValidityWindow>, ConfigError> {
        self.window
            .map(|[start, end]| {
                ValidityWindow::from_mjd(start, end).map_err(|source| ConfigError::Window {
                    queue: self.name.clone(),
                    source,
                })
            })
            .transpose()
    }

    fn to_list_queue(&self) -> Result<ListQueue, ConfigError> {
        let mut queue = ListQueue::new(self.name.clone())
            .with_priority(self.priority)
            .with_requests(self.requests.iter().map(Request::from).collect());
        if let Some(window) = self.validity_window()? {
            queue = queue.with_window(window);
        }
        if self.is_override {
            queue = queue.as_override();
        }
        Ok(queue)
    }
}

/// One request row of a list queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub request_id: RequestId,
    pub program_id: ProgramId,
    #[serde(default)]
    pub field_id: u64,
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default = "default_exposure_time_s")]
    pub exposure_time_s: f64,
    #[serde(default = "default_repeats")]
    pub n_repeats: u32,
    #[serde(default)]
    pub filter_id: Option<u32>,
}

impl From<&RequestConfig> for Request {
    fn from(r: &RequestConfig) -> Self {
        let request = Request::new(
            r.request_id,
            r.program_id,
            Target::new(r.ra_deg, r.dec_deg),
            Seconds::new(r.exposure_time_s),
        )
        .with_field(r.field_id)
        .with_repeats(r.n_repeats);
        match r.filter_id {
            Some(filter) => request.with_filter(filter),
            None => request,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_block_size_min() -> f64 {
    20.0
}

fn default_exposure_time_s() -> f64 {
    30.0
}

fn default_readout_time_s() -> f64 {
    15.0
}

fn default_programs() -> Vec<ProgramId> {
    vec![1, 2, 3]
}

fn default_kind() -> QueueKind {
    QueueKind::List
}

fn default_repeats() -> u32 {
    1
}

impl SchedulerConfig {
    /// Load a run configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded run configuration from {}", path.display());
        content.parse()
    }

    pub fn block_grid(&self) -> Result<BlockGrid, ConfigError> {
        let grid = BlockGrid::new(
            Mjd::new(self.blocks.origin_mjd),
            Quantity::<Minute>::new(self.blocks.block_size_min),
        )?;
        Ok(grid)
    }

    pub fn capacity_model(&self) -> Result<CapacityModel, ConfigError> {
        let model = CapacityModel::new(
            Seconds::new(self.capacity.exposure_time_s),
            Seconds::new(self.capacity.readout_time_s),
            self.capacity.programs.clone(),
        )?;
        Ok(model)
    }

    /// Run bounds from `start_mjd` and `stop_mjd`.
    pub fn runner_config(&self) -> Result<RunnerConfig, ConfigError> {
        let start = self
            .scheduler
            .start_mjd
            .ok_or(ConfigError::Missing("scheduler.start_mjd"))?;
        let stop = self
            .scheduler
            .stop_mjd
            .ok_or(ConfigError::Missing("scheduler.stop_mjd"))?;
        RunnerConfig::new(Mjd::new(start), Mjd::new(stop))
            .map_err(|_| ConfigError::InvalidRunBounds { start, stop })
    }

    /// Opens `<output_dir>/<run_name>.jsonl` for this run.
    pub fn open_history(&self) -> Result<JsonlHistory, HistoryError> {
        JsonlHistory::create(
            &self.scheduler.output_dir,
            self.scheduler.run_name.clone(),
            self.scheduler.clobber_history,
        )
    }

    /// Builds the registry from list queues only.
    ///
    /// Any non-list queue fails with [`ConfigError::UnsupportedKind`].
    pub fn build_registry(&self) -> Result<QueueRegistry, ConfigError> {
        self.build_registry_with(|queue| {
            Err(ConfigError::UnsupportedKind {
                queue: queue.name.clone(),
                kind: queue.kind,
            })
        })
    }

    /// Builds the registry, delegating non-list queues to `factory`.
    pub fn build_registry_with<F>(&self, mut factory: F) -> Result<QueueRegistry, ConfigError>
    where
        F: FnMut(&QueueConfig) -> Result<Box<dyn ObservationQueue>, ConfigError>,
    {
        let grid = self.block_grid()?;
        let mut queues: Vec<Box<dyn ObservationQueue>> = Vec::with_capacity(self.queues.len());
        for entry in &self.queues {
            let queue: Box<dyn ObservationQueue> = match entry.kind {
                QueueKind::List => Box::new(entry.to_list_queue()?),
                _ => factory(entry)?,
            };
            queues.push(queue);
        }

        let registry = QueueRegistry::new(queues)?.with_grid(grid);
        info!(
            "Built registry for run '{}' with queues [{}]",
            self.scheduler.run_name,
            registry.names().join(", ")
        );
        Ok(registry)
    }
}

impl std::str::FromStr for SchedulerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
