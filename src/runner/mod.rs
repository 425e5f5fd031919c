//! Night runner: the single-threaded driver loop.
//!
//! Each step follows the same sequence:
//! prune and refresh queues → check ready → select work → slew → expose → log → retire.
//!
//! Slew and exposure failures are absorbed: the resource is marked unable to
//! observe, the history forgets its previous observation, simulated time
//! advances, and the request stays in its queue for a later retry.

mod error;


pub use error::RunnerError;

use log::{debug, info, warn};

use crate::history::ObservationLog;
use crate::queue::{QueueError, RequestId, WorkItem, FALLBACK_QUEUE};
use crate::resource::{ResourceState, ResourceStateMachine};
use crate::scheduler::{CapacityModel, NightPlan, NightlyOptimizer, QueueRegistry};
use crate::units::Mjd;
use crate::Id;

/// Time bounds of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    start: Mjd,
    stop: Mjd,
}

impl RunnerConfig {
    pub fn new(start: Mjd, stop: Mjd) -> Result<Self, RunnerError> {
        if start.value().is_nan() || stop.value().is_nan() || start.value() >= stop.value() {
            return Err(RunnerError::InvalidBounds {
                start: start.value(),
                stop: stop.value(),
            });
        }
        Ok(Self { start, stop })
    }

    pub fn start(&self) -> Mjd {
        self.start
    }

    pub fn stop(&self) -> Mjd {
        self.stop
    }
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Resource not ready, or the run has not started yet.
    Idle,
    /// No queue could produce a work item.
    NoWork,
    SlewFailed { request_id: RequestId },
    ExposureFailed { request_id: RequestId },
    Observed { queue: Id, request_id: RequestId },
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightSummary {
    pub observations: usize,
    pub failed_slews: usize,
    pub failed_exposures: usize,
    pub idle_steps: usize,
    pub no_work_steps: usize,
    pub queue_switches: usize,
}

impl NightSummary {
    fn record(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Idle => self.idle_steps += 1,
            StepOutcome::NoWork => self.no_work_steps += 1,
            StepOutcome::SlewFailed { .. } => self.failed_slews += 1,
            StepOutcome::ExposureFailed { .. } => self.failed_exposures += 1,
            StepOutcome::Observed { .. } => self.observations += 1,
        }
    }
}

/// Steps a resource through the night, dispatching work from the active queue.
///
/// # Lifecycle
///
/// 1. Build with [`NightRunner::new`].
/// 2. Optionally call [`NightRunner::begin_night`] to prune queues and hand
///    the committed capacity to a whole-night optimizer.
/// 3. Call [`NightRunner::run`] (or [`NightRunner::step`] repeatedly).
#[derive(Debug)]
pub struct NightRunner<R, H> {
    registry: QueueRegistry,
    resource: R,
    history: H,
    config: RunnerConfig,
    summary: NightSummary,
}

impl<R, H> NightRunner<R, H>
where
    R: ResourceStateMachine,
    H: ObservationLog,
{
    pub fn new(registry: QueueRegistry, resource: R, history: H, config: RunnerConfig) -> Self {
        Self {
            registry,
            resource,
            history,
            config,
            summary: NightSummary::default(),
        }
    }

    pub fn registry(&self) -> &QueueRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut QueueRegistry {
        &mut self.registry
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn summary(&self) -> &NightSummary {
        &self.summary
    }

    pub fn into_parts(self) -> (QueueRegistry, R, H) {
        (self.registry, self.resource, self.history)
    }

    /// Prepares the night at the resource's current time and hands the plan
    /// to `optimizer`.
    pub fn begin_night<O: NightlyOptimizer>(
        &mut self,
        capacity: &CapacityModel,
        optimizer: &mut O,
    ) -> Result<NightPlan, RunnerError> {
        let now = self.resource.current_time();
        let plan = self.registry.plan_night(now, capacity);
        info!(
            "Night plan: {} excluded block(s), timed queues [{}]",
            plan.excluded_blocks.len(),
            plan.timed_queues.join(", ")
        );
        optimizer
            .assign_night(&plan)
            .map_err(|e| RunnerError::Optimizer(e.to_string()))?;
        Ok(plan)
    }

    /// Runs until the resource clock reaches the stop time.
    pub fn run(&mut self) -> Result<NightSummary, RunnerError> {
        info!(
            "Running night from MJD {:.5} to {:.5} starting on queue '{}'",
            self.config.start.value(),
            self.config.stop.value(),
            self.registry.active_name()
        );
        while self.resource.current_time().value() < self.config.stop.value() {
            self.step()?;
        }
        info!("Night finished: {:?}", self.summary);
        Ok(self.summary.clone())
    }

    /// Performs one iteration of the driver loop.
    pub fn step(&mut self) -> Result<StepOutcome, RunnerError> {
        let outcome = self.advance()?;
        self.summary.record(&outcome);
        Ok(outcome)
    }

    fn advance(&mut self) -> Result<StepOutcome, RunnerError> {
        let now = self.resource.current_time();
        if now.value() < self.config.start.value() {
            self.idle()?;
            return Ok(StepOutcome::Idle);
        }

        let before = self.registry.active_name().to_string();
        self.registry.prune_expired_and_empty(now);
        self.registry.refresh(now);
        if self.registry.active_name() != before {
            self.summary.queue_switches += 1;
        }

        if !self.resource.check_if_ready() {
            self.idle()?;
            return Ok(StepOutcome::Idle);
        }

        let state = self.resource.current_state();
        let Some((queue, item)) = self.dispatch(&state)? else {
            self.idle()?;
            return Ok(StepOutcome::NoWork);
        };

        if !self.resource.start_slew(item.target) {
            warn!("Slew to {} for request {} failed", item.target, item.request_id);
            self.recover()?;
            return Ok(StepOutcome::SlewFailed {
                request_id: item.request_id,
            });
        }

        if !self.resource.start_exposing() {
            warn!("Exposure for request {} failed", item.request_id);
            self.recover()?;
            return Ok(StepOutcome::ExposureFailed {
                request_id: item.request_id,
            });
        }

        self.history
            .log_pointing(&self.resource.current_state(), &item)?;
        self.registry
            .queue_mut(&queue)?
            .remove_requests(item.request_id);
        debug!("Observed request {} from queue '{}'", item.request_id, queue);

        Ok(StepOutcome::Observed {
            queue,
            request_id: item.request_id,
        })
    }

    /// Asks the active queue for work, then `fallback` if it has none.
    fn dispatch(&mut self, state: &ResourceState) -> Result<Option<(Id, WorkItem)>, RunnerError> {
        let active = self.registry.active_name().to_string();
        let mut candidates = vec![active];
        if candidates[0] != FALLBACK_QUEUE && self.registry.contains(FALLBACK_QUEUE) {
            candidates.push(FALLBACK_QUEUE.to_string());
        }

        for name in candidates {
            match self.registry.queue_mut(&name)?.next_item(state) {
                Ok(item) => return Ok(Some((name, item))),
                Err(QueueError::NoEligibleWork { .. }) => {
                    debug!("Queue '{}' has no eligible work", name);
                }
                Err(e) => warn!("Queue '{}' failed to select work: {}", name, e),
            }
        }
        Ok(None)
    }

    /// Recovery after a failed slew or exposure.
    fn recover(&mut self) -> Result<(), RunnerError> {
        self.history.clear_prev_obs();
        self.idle()
    }

    fn idle(&mut self) -> Result<(), RunnerError> {
        self.resource.set_cant_observe();
        let before = self.resource.current_time();
        self.resource.wait();
        if self.resource.current_time().value() <= before.value() {
            return Err(RunnerError::ClockStalled { at: before.value() });
        }
        Ok(())
    }
}
