//! Meta-scheduler: the registry of competing observation queues.
//!
//! [`QueueRegistry`] owns every named queue plus the single *active* pointer.
//! At each decision point it decides which queue is authoritative:
//!
//! 1. **Override preemption**: a valid, non-empty target-of-opportunity queue
//!    takes over from any non-override queue.
//! 2. **Timed switching**: an expired active queue drops back to `default`;
//!    from `default`/`fallback` the first valid timed queue with work takes over.
//! 3. **Pruning**: expired and exhausted queues are retired.
//!
//! Once per night it also computes the blocks already committed to timed
//! queues and the equivalent-observation tally per program, so a whole-night
//! optimizer can plan around them.
//!
//! # Scan order
//!
//! When several queues become eligible at once the winner is the first in
//! scan order: descending [`priority`](ObservationQueue::priority), then
//! registration order. Replacing a queue through a clobbering
//! [`add`](QueueRegistry::add) keeps its original registration slot.

pub mod capacity;
pub mod errors;
pub mod plan;


use std::collections::{BTreeSet, HashMap};

use log::{debug, info, warn};

use crate::blocks::{clamp_blocks, BlockGrid, BlockIndex};
use crate::queue::{is_reserved, ObservationQueue, QueueKind, DEFAULT_QUEUE};
use crate::units::Mjd;
use crate::Id;

pub use capacity::{CapacityModel, ProgramTally};
pub use errors::SchedulerError;
pub use plan::{NightPlan, NightlyOptimizer};

#[derive(Debug)]
struct Slot {
    queue: Box<dyn ObservationQueue>,
    seq: u64,
}

/// Registry of named queues with exactly one active queue.
///
/// # Examples
///
/// ```
/// use skyqueue::queue::{ListQueue, ObservationQueue};
/// use skyqueue::scheduler::{QueueRegistry, SchedulerError};
///
/// let mut registry = QueueRegistry::new(vec![
///     Box::new(ListQueue::new("default")) as Box<dyn ObservationQueue>,
/// ])
/// .unwrap();
///
/// assert_eq!(registry.active_name(), "default");
/// assert_eq!(
///     registry.set_active("missing"),
///     Err(SchedulerError::UnknownQueue("missing".to_string()))
/// );
/// assert_eq!(registry.active_name(), "default");
/// ```
#[derive(Debug)]
pub struct QueueRegistry {
    queues: HashMap<Id, Slot>,
    active: Id,
    timed_queues_tonight: Vec<Id>,
    grid: BlockGrid,
    next_seq: u64,
}

impl QueueRegistry {
    /// Builds a registry keyed by each queue's name, with `default` active.
    pub fn new<I>(queues: I) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = Box<dyn ObservationQueue>>,
    {
        let mut registry = Self {
            queues: HashMap::new(),
            active: DEFAULT_QUEUE.to_string(),
            timed_queues_tonight: Vec::new(),
            grid: BlockGrid::default(),
            next_seq: 0,
        };

        for queue in queues {
            let name = queue.name().to_string();
            registry.add(name, queue, false)?;
        }

        if registry.queues.is_empty() {
            return Err(SchedulerError::EmptyRegistry);
        }
        if !registry.contains(DEFAULT_QUEUE) {
            return Err(SchedulerError::MissingDefault);
        }
        Ok(registry)
    }

    /// Replaces the block grid used for window arithmetic.
    pub fn with_grid(mut self, grid: BlockGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn ObservationQueue> {
        self.queues.get(name).map(|slot| slot.queue.as_ref())
    }

    pub fn queue_mut(&mut self, name: &str) -> Result<&mut dyn ObservationQueue, SchedulerError> {
        let slot = self
            .queues
            .get_mut(name)
            .ok_or_else(|| SchedulerError::UnknownQueue(name.to_string()))?;
        Ok(slot.queue.as_mut())
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// The active queue. Always registered.
    pub fn active(&self) -> &dyn ObservationQueue {
        self.queues[&self.active].queue.as_ref()
    }

    /// Names of the queues in scan order.
    pub fn names(&self) -> Vec<Id> {
        let mut slots: Vec<(&Id, &Slot)> = self.queues.iter().collect();
        slots.sort_by(|(_, a), (_, b)| {
            b.queue
                .priority()
                .cmp(&a.queue.priority())
                .then(a.seq.cmp(&b.seq))
        });
        slots.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Timed queues overlapping the night of the last
    /// [`compute_excluded_blocks`](Self::compute_excluded_blocks) call.
    pub fn timed_queues_tonight(&self) -> &[Id] {
        &self.timed_queues_tonight
    }

    /// Makes `name` the active queue.
    pub fn set_active(&mut self, name: &str) -> Result<(), SchedulerError> {
        if !self.contains(name) {
            return Err(SchedulerError::UnknownQueue(name.to_string()));
        }
        if self.active != name {
            info!("Switching active queue '{}' -> '{}'", self.active, name);
            self.active = name.to_string();
        }
        Ok(())
    }

    /// Inserts a queue under `name`, returning the queue it replaced.
    ///
    /// Without `clobber` an existing name fails with
    /// [`SchedulerError::QueueExists`] and the registry is left untouched.
    pub fn add(
        &mut self,
        name: impl Into<Id>,
        queue: Box<dyn ObservationQueue>,
        clobber: bool,
    ) -> Result<Option<Box<dyn ObservationQueue>>, SchedulerError> {
        let name: Id = name.into();
        if let Some(slot) = self.queues.get_mut(&name) {
            if !clobber {
                return Err(SchedulerError::QueueExists(name));
            }
            debug!("Replacing queue '{}'", name);
            return Ok(Some(std::mem::replace(&mut slot.queue, queue)));
        }

        debug!("Adding {} queue '{}'", queue.kind(), name);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queues.insert(name, Slot { queue, seq });
        Ok(None)
    }

    /// Removes `name`, falling back to `default` if it was active.
    ///
    /// `default` and `fallback` are never removed: asking for them is a logged
    /// no-op returning `Ok(None)`.
    pub fn remove(
        &mut self,
        name: &str,
    ) -> Result<Option<Box<dyn ObservationQueue>>, SchedulerError> {
        if !self.contains(name) {
            return Err(SchedulerError::UnknownQueue(name.to_string()));
        }
        if is_reserved(name) {
            warn!("Refusing to remove reserved queue '{}'", name);
            return Ok(None);
        }

        if self.active == name {
            self.set_active(DEFAULT_QUEUE)?;
        }
        debug!("Removing queue '{}'", name);
        Ok(self.queues.remove(name).map(|slot| slot.queue))
    }

    /// Whether a queue has work, using the check appropriate to its kind.
    fn has_work(queue: &dyn ObservationQueue) -> bool {
        match queue.kind() {
            QueueKind::List => !queue.is_empty(),
            QueueKind::Greedy | QueueKind::Optimized => queue.has_pending_in_window(),
        }
    }

    /// Blocks of tonight fully committed to timed queues.
    ///
    /// Tonight is `[block(floor(now)), block(floor(now) + 1))`. Every timed
    /// queue overlapping tonight, even partially, is recorded in
    /// [`timed_queues_tonight`](Self::timed_queues_tonight), which is reset
    /// on each call.
    pub fn compute_excluded_blocks(&mut self, now: Mjd) -> BTreeSet<BlockIndex> {
        let night = self.grid.night_blocks(now);
        let mut excluded = BTreeSet::new();
        let mut tonight = Vec::new();

        for name in self.names() {
            if is_reserved(&name) {
                continue;
            }
            let queue = self.queues[&name].queue.as_ref();
            if queue.validity_window().is_none() {
                continue;
            }

            let touched = clamp_blocks(queue.valid_blocks(&self.grid, false), &night);
            if !touched.is_empty() {
                tonight.push(name.clone());
            }
            excluded.extend(clamp_blocks(queue.valid_blocks(&self.grid, true), &night));
        }

        debug!(
            "Night {}..{}: {} timed queue(s), {} excluded block(s)",
            night.start,
            night.end,
            tonight.len(),
            excluded.len()
        );
        self.timed_queues_tonight = tonight;
        excluded
    }

    /// Equivalent observations committed by tonight's timed queues, per program.
    ///
    /// Every program of `capacity` is present, at zero when nothing is
    /// committed. Queues removed since the last
    /// [`compute_excluded_blocks`](Self::compute_excluded_blocks) contribute nothing.
    pub fn tally_committed_capacity(&self, capacity: &CapacityModel) -> ProgramTally {
        let mut tally = capacity.empty_tally();
        for name in &self.timed_queues_tonight {
            let Some(queue) = self.get(name) else {
                continue;
            };
            for (program, count) in capacity.equivalent_observations(queue.requests()) {
                *tally.entry(program).or_insert(0) += count;
            }
        }
        tally
    }

    /// Switches to a valid, non-empty override queue unless one is already active.
    ///
    /// Returns whether the active queue changed.
    pub fn check_override_preemption(&mut self, now: Mjd) -> bool {
        if self.active().is_override() {
            return false;
        }

        let candidate = self.names().into_iter().find(|name| {
            let queue = self.queues[name].queue.as_ref();
            queue.is_override() && queue.is_valid(now) && Self::has_work(queue)
        });

        match candidate {
            Some(name) => {
                info!("Override queue '{}' preempts '{}'", name, self.active);
                self.active = name;
                true
            }
            None => false,
        }
    }

    /// Drops an expired active queue and picks up newly valid timed queues.
    ///
    /// Returns whether the active queue changed.
    pub fn check_timed_switch(&mut self, now: Mjd) -> bool {
        let before = self.active.clone();

        let active = self.active();
        if active.validity_window().is_some() && !active.is_valid(now) {
            info!("Queue '{}' is no longer valid", self.active);
            self.active = DEFAULT_QUEUE.to_string();
        }

        if is_reserved(&self.active) {
            let candidate = self.names().into_iter().find(|name| {
                if is_reserved(name) {
                    return false;
                }
                let queue = self.queues[name].queue.as_ref();
                queue.validity_window().is_some() && queue.is_valid(now) && Self::has_work(queue)
            });
            if let Some(name) = candidate {
                info!("Timed queue '{}' takes over from '{}'", name, self.active);
                self.active = name;
            }
        }

        self.active != before
    }

    /// Runs override preemption then timed switching.
    ///
    /// Returns whether the active queue changed.
    pub fn refresh(&mut self, now: Mjd) -> bool {
        let before = self.active.clone();
        self.check_override_preemption(now);
        self.check_timed_switch(now);
        self.active != before
    }

    /// Removes expired queues and exhausted list queues.
    ///
    /// A queue goes when its window has fully elapsed, or when it is an empty
    /// list queue. `default` and `fallback` always stay. Returns the removed
    /// names, sorted.
    pub fn prune_expired_and_empty(&mut self, now: Mjd) -> Vec<Id> {
        let doomed: BTreeSet<Id> = self
            .queues
            .iter()
            .filter(|(name, _)| !is_reserved(name))
            .filter(|(_, slot)| {
                let queue = slot.queue.as_ref();
                let expired = queue
                    .validity_window()
                    .is_some_and(|w| w.has_elapsed(now));
                let exhausted = queue.kind() == QueueKind::List && queue.is_empty();
                expired || exhausted
            })
            .map(|(name, _)| name.clone())
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for name in doomed {
            if let Ok(Some(_)) = self.remove(&name) {
                removed.push(name);
            }
        }
        if !removed.is_empty() {
            info!("Pruned {} queue(s): {}", removed.len(), removed.join(", "));
        }
        removed
    }

    /// Prepares the night containing `now`.
    ///
    /// Prunes dead queues, computes the excluded blocks and tallies the
    /// committed capacity.
    pub fn plan_night(&mut self, now: Mjd, capacity: &CapacityModel) -> NightPlan {
        let pruned = self.prune_expired_and_empty(now);
        let excluded_blocks = self.compute_excluded_blocks(now);
        let committed = self.tally_committed_capacity(capacity);
        NightPlan {
            night: self.grid.night_blocks(now),
            excluded_blocks,
            timed_queues: self.timed_queues_tonight.clone(),
            committed,
            pruned,
        }
    }
}
