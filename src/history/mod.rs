//! Observation history collaborator.
//!
//! The runner appends one [`PointingRecord`] per completed observation. The
//! log also remembers the previous observation so consecutive pointings can
//! be related; a failed slew or exposure clears it.

mod error;
mod jsonl;

pub use error::HistoryError;
pub use jsonl::{read_records, JsonlHistory};

use serde::{Deserialize, Serialize};

use crate::queue::{ProgramId, RequestId, WorkItem};
use crate::resource::ResourceState;
use crate::Id;

/// One completed observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointingRecord {
    pub run_id: Id,
    /// Position of the record within the run, starting at 0.
    pub sequence: u64,
    pub obs_mjd: f64,
    pub request_id: RequestId,
    pub program_id: ProgramId,
    pub field_id: u64,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub exposure_time_s: f64,
    pub filter_id: Option<u32>,
    /// Request observed immediately before this one, if the chain was unbroken.
    pub prev_request_id: Option<RequestId>,
}

impl PointingRecord {
    fn new(
        run_id: &str,
        sequence: u64,
        state: &ResourceState,
        item: &WorkItem,
        prev: Option<&PointingRecord>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            sequence,
            obs_mjd: state.current_time.value(),
            request_id: item.request_id,
            program_id: item.program_id,
            field_id: item.field_id,
            ra_deg: item.target.ra_deg,
            dec_deg: item.target.dec_deg,
            exposure_time_s: item.exposure_time.value(),
            filter_id: item.filter_id.or(state.filter_id),
            prev_request_id: prev.map(|p| p.request_id),
        }
    }
}

/// Append-only store of completed observations.
pub trait ObservationLog {
    fn run_id(&self) -> &str;

    /// Appends one completed observation.
    fn log_pointing(&mut self, state: &ResourceState, item: &WorkItem) -> Result<(), HistoryError>;

    /// Last logged observation, unless cleared since.
    fn prev_obs(&self) -> Option<&PointingRecord>;

    /// Forgets the previous observation.
    fn clear_prev_obs(&mut self);
}

/// In-process history.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    run_id: Id,
    records: Vec<PointingRecord>,
    prev: Option<PointingRecord>,
}

impl Default for MemoryHistory {
    /// History under a freshly generated run id.
    fn default() -> Self {
        Self::new(crate::generate_id())
    }
}

impl MemoryHistory {
    pub fn new(run_id: impl Into<Id>) -> Self {
        Self {
            run_id: run_id.into(),
            records: Vec::new(),
            prev: None,
        }
    }

    pub fn records(&self) -> &[PointingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ObservationLog for MemoryHistory {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    fn log_pointing(&mut self, state: &ResourceState, item: &WorkItem) -> Result<(), HistoryError> {
        let record = PointingRecord::new(
            &self.run_id,
            self.records.len() as u64,
            state,
            item,
            self.prev.as_ref(),
        );
        self.prev = Some(record.clone());
        self.records.push(record);
        Ok(())
    }

    fn prev_obs(&self) -> Option<&PointingRecord> {
        self.prev.as_ref()
    }

    fn clear_prev_obs(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Request;
    use crate::resource::Target;
    use crate::units::{Mjd, Seconds};

    pub(super) fn item(id: RequestId) -> WorkItem {
        WorkItem::from(
            &Request::new(id, 1, Target::new(150.0, 2.0), Seconds::new(30.0)).with_field(700),
        )
    }

    #[test]
    fn test_records_are_sequenced_and_chained() {
        let mut log = MemoryHistory::new("run");
        let state = ResourceState::at(Mjd::new(59000.2)).with_filter(2);
        log.log_pointing(&state, &item(1)).unwrap();
        log.log_pointing(&state, &item(2)).unwrap();

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, 0);
        assert_eq!(records[0].prev_request_id, None);
        assert_eq!(records[1].prev_request_id, Some(1));
        assert_eq!(records[1].filter_id, Some(2));
        assert_eq!(records[1].field_id, 700);
    }

    #[test]
    fn test_clearing_prev_obs_breaks_the_chain() {
        let mut log = MemoryHistory::new("run");
        let state = ResourceState::at(Mjd::new(59000.2));
        log.log_pointing(&state, &item(1)).unwrap();
        assert_eq!(log.prev_obs().map(|p| p.request_id), Some(1));

        log.clear_prev_obs();
        assert!(log.prev_obs().is_none());

        log.log_pointing(&state, &item(2)).unwrap();
        assert_eq!(log.records()[1].prev_request_id, None);
    }

    #[test]
    fn test_default_history_gets_a_generated_run_id() {
        let a = MemoryHistory::default();
        let b = MemoryHistory::default();
        assert_ne!(a.run_id(), b.run_id());
        assert!(a.is_empty());
    }
}
