//! Committed-capacity accounting in units of equivalent observations.

use std::collections::BTreeMap;

use super::errors::SchedulerError;
use crate::queue::{ProgramId, Request};
use crate::units::Seconds;

/// Equivalent-observation count per program.
pub type ProgramTally = BTreeMap<ProgramId, u64>;

/// Nominal cost of one observation slot and the programs being accounted.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityModel {
    exposure_time: Seconds,
    readout_time: Seconds,
    program_ids: Vec<ProgramId>,
}

impl Default for CapacityModel {
    /// 30 s exposures, 15 s readout, programs 1 to 3.
    fn default() -> Self {
        Self {
            exposure_time: Seconds::new(30.0),
            readout_time: Seconds::new(15.0),
            program_ids: vec![1, 2, 3],
        }
    }
}

impl CapacityModel {
    pub fn new(
        exposure_time: Seconds,
        readout_time: Seconds,
        program_ids: Vec<ProgramId>,
    ) -> Result<Self, SchedulerError> {
        if !(exposure_time.value().is_finite() && exposure_time.value() > 0.0) {
            return Err(SchedulerError::InvalidCapacityModel(format!(
                "nominal exposure time must be positive, got {} s",
                exposure_time.value()
            )));
        }
        if !(readout_time.value().is_finite() && readout_time.value() >= 0.0) {
            return Err(SchedulerError::InvalidCapacityModel(format!(
                "readout time must be non-negative, got {} s",
                readout_time.value()
            )));
        }
        Ok(Self {
            exposure_time,
            readout_time,
            program_ids,
        })
    }

    pub fn exposure_time(&self) -> Seconds {
        self.exposure_time
    }

    pub fn readout_time(&self) -> Seconds {
        self.readout_time
    }

    pub fn program_ids(&self) -> &[ProgramId] {
        &self.program_ids
    }

    /// Cost of one equivalent observation: nominal exposure plus readout.
    pub fn nominal_slot(&self) -> Seconds {
        self.exposure_time + self.readout_time
    }

    /// Tally with every configured program present at zero.
    pub fn empty_tally(&self) -> ProgramTally {
        self.program_ids.iter().map(|&p| (p, 0)).collect()
    }

    /// Equivalent observations consumed by one queue's requests, per program.
    ///
    /// Each request costs `(exposure_time + readout) * n_repeats`. Costs are
    /// summed per program and divided by [`nominal_slot`](Self::nominal_slot);
    /// the quotient is rounded half-to-even.
    pub fn equivalent_observations(&self, requests: &[Request]) -> ProgramTally {
        let mut seconds: BTreeMap<ProgramId, f64> = BTreeMap::new();
        for r in requests {
            let total = (r.exposure_time + self.readout_time).value() * f64::from(r.n_repeats);
            *seconds.entry(r.program_id).or_insert(0.0) += total;
        }

        let slot = self.nominal_slot().value();
        seconds
            .into_iter()
            .map(|(program, total)| (program, (total / slot).round_ties_even().max(0.0) as u64))
            .collect()
    }
}
