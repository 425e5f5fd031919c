//! Nightly planning output handed to the whole-night optimizer.

use std::collections::BTreeSet;
use std::ops::Range;

use super::capacity::ProgramTally;
use crate::blocks::BlockIndex;
use crate::Id;

/// Capacity already committed for one night.
#[derive(Debug, Clone, PartialEq)]
pub struct NightPlan {
    /// Blocks making up the night.
    pub night: Range<BlockIndex>,
    /// Blocks fully spoken for by timed queues; the optimizer must not plan into them.
    pub excluded_blocks: BTreeSet<BlockIndex>,
    /// Timed queues that overlap the night, even partially.
    pub timed_queues: Vec<Id>,
    /// Equivalent observations already committed by those queues, per program.
    pub committed: ProgramTally,
    /// Queues pruned while preparing the plan.
    pub pruned: Vec<Id>,
}

impl NightPlan {
    /// Blocks of the night left for the optimizer.
    pub fn available_blocks(&self) -> impl Iterator<Item = BlockIndex> + '_ {
        self.night
            .clone()
            .filter(move |b| !self.excluded_blocks.contains(b))
    }
}

/// Whole-night optimizer collaborator.
///
/// Receives the excluded blocks and committed capacity as planning
/// constraints. Its own algorithm is opaque to the scheduler.
pub trait NightlyOptimizer {
    type Error: std::error::Error;

    fn assign_night(&mut self, plan: &NightPlan) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_blocks_skip_excluded() {
        let plan = NightPlan {
            night: 0..6,
            excluded_blocks: [1, 2, 4].into_iter().collect(),
            timed_queues: vec!["timed".to_string()],
            committed: ProgramTally::new(),
            pruned: Vec::new(),
        };
        assert_eq!(plan.available_blocks().collect::<Vec<_>>(), vec![0, 3, 5]);
    }
}
