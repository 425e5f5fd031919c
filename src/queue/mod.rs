//! Queue capability interface.
//!
//! The meta-scheduler manages queues generically through [`ObservationQueue`].
//! It never looks inside a queue's selection logic: it dispatches on the
//! explicit [`QueueKind`] tag, the optional validity window and the override
//! flag, and asks the queue itself for the next work item.

mod error;
mod list;

pub use error::QueueError;
pub use list::ListQueue;

use std::fmt::{Debug, Display};
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blocks::{BlockGrid, BlockIndex};
use crate::resource::{ResourceState, Target};
use crate::units::{Mjd, Seconds};
use crate::window::ValidityWindow;

/// Name of the catch-all queue that always exists.
pub const DEFAULT_QUEUE: &str = "default";

/// Name of the queue used when nothing else can produce work.
pub const FALLBACK_QUEUE: &str = "fallback";

pub type RequestId = u64;
pub type ProgramId = u32;

/// True for the two reserved queue names.
pub fn is_reserved(name: &str) -> bool {
    name == DEFAULT_QUEUE || name == FALLBACK_QUEUE
}

/// How a queue produces its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    /// Finite, explicit, removable set of pending requests.
    List,
    /// Requests computed on demand by a heuristic.
    Greedy,
    /// Requests assigned by a whole-night optimizer.
    #[serde(alias = "gurobi")]
    Optimized,
}

impl QueueKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QueueKind::List => "list",
            QueueKind::Greedy => "greedy",
            QueueKind::Optimized => "optimized",
        }
    }
}

impl Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueKind {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(QueueKind::List),
            "greedy" => Ok(QueueKind::Greedy),
            "optimized" | "gurobi" => Ok(QueueKind::Optimized),
            other => Err(QueueError::UnknownKind(other.to_string())),
        }
    }
}

/// One pending observation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub request_id: RequestId,
    pub program_id: ProgramId,
    pub field_id: u64,
    pub target: Target,
    pub exposure_time: Seconds,
    /// Number of times the request must be observed. Defaults to 1.
    pub n_repeats: u32,
    pub filter_id: Option<u32>,
}

impl Request {
    pub fn new(
        request_id: RequestId,
        program_id: ProgramId,
        target: Target,
        exposure_time: Seconds,
    ) -> Self {
        Self {
            request_id,
            program_id,
            field_id: 0,
            target,
            exposure_time,
            n_repeats: 1,
            filter_id: None,
        }
    }

    pub fn with_field(mut self, field_id: u64) -> Self {
        self.field_id = field_id;
        self
    }

    pub fn with_repeats(mut self, n_repeats: u32) -> Self {
        self.n_repeats = n_repeats;
        self
    }

    pub fn with_filter(mut self, filter_id: u32) -> Self {
        self.filter_id = Some(filter_id);
        self
    }
}

/// A single unit of work dispatched to the resource.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub request_id: RequestId,
    pub program_id: ProgramId,
    pub field_id: u64,
    pub target: Target,
    pub exposure_time: Seconds,
    pub filter_id: Option<u32>,
}

impl From<&Request> for WorkItem {
    fn from(r: &Request) -> Self {
        Self {
            request_id: r.request_id,
            program_id: r.program_id,
            field_id: r.field_id,
            target: r.target,
            exposure_time: r.exposure_time,
            filter_id: r.filter_id,
        }
    }
}

/// A queue the meta-scheduler can manage.
///
/// # Invariants
///
/// - `name()` is stable for the lifetime of the queue
/// - `kind()` never changes
/// - for [`QueueKind::List`] queues, `requests()` is the full pending set
///
/// Greedy and optimized queues may return an empty `requests()` until their
/// nightly assignment has run; they report work through
/// [`has_pending_in_window`](ObservationQueue::has_pending_in_window) instead.
pub trait ObservationQueue: Send + Sync + Debug + 'static {
    fn name(&self) -> &str;

    fn kind(&self) -> QueueKind;

    /// Time range during which the queue may be active. `None` means always.
    fn validity_window(&self) -> Option<ValidityWindow> {
        None
    }

    /// Target-of-opportunity queues may preempt any non-override queue.
    fn is_override(&self) -> bool {
        false
    }

    /// Higher values are scanned first when several queues become eligible together.
    fn priority(&self) -> i32 {
        0
    }

    fn is_valid(&self, now: Mjd) -> bool {
        match self.validity_window() {
            Some(window) => window.contains(now),
            None => true,
        }
    }

    /// Blocks covered by the validity window on `grid`. Empty without a window.
    fn valid_blocks(&self, grid: &BlockGrid, complete_only: bool) -> Range<BlockIndex> {
        match self.validity_window() {
            Some(window) => grid.window_blocks(&window, complete_only),
            None => 0..0,
        }
    }

    /// Currently materialized request rows.
    fn requests(&self) -> &[Request];

    fn is_empty(&self) -> bool {
        self.requests().is_empty()
    }

    /// Cheap check for whether the queue has anything to do in its window.
    fn has_pending_in_window(&self) -> bool {
        !self.is_empty()
    }

    /// Selects the next work item for the given resource state.
    fn next_item(&mut self, state: &ResourceState) -> Result<WorkItem, QueueError>;

    /// Retires one completed observation of `request_id`.
    ///
    /// Returns the number of observations retired. Unknown ids are a no-op
    /// returning 0.
    fn remove_requests(&mut self, request_id: RequestId) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_case_insensitively() {
        assert_eq!("List".parse::<QueueKind>(), Ok(QueueKind::List));
        assert_eq!("greedy".parse::<QueueKind>(), Ok(QueueKind::Greedy));
        assert_eq!("gurobi".parse::<QueueKind>(), Ok(QueueKind::Optimized));
        assert_eq!(
            "fifo".parse::<QueueKind>(),
            Err(QueueError::UnknownKind("fifo".to_string()))
        );
    }

    #[test]
    fn test_kind_display_round_trips_through_from_str() {
        for kind in [QueueKind::List, QueueKind::Greedy, QueueKind::Optimized] {
            assert_eq!(kind.to_string().parse::<QueueKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("default"));
        assert!(is_reserved("fallback"));
        assert!(!is_reserved("too_1"));
    }

    #[test]
    fn test_work_item_from_request_copies_dispatch_fields() {
        let req = Request::new(7, 2, Target::new(120.0, 30.0), Seconds::new(30.0))
            .with_field(455)
            .with_filter(1)
            .with_repeats(3);
        let item = WorkItem::from(&req);
        assert_eq!(item.request_id, 7);
        assert_eq!(item.program_id, 2);
        assert_eq!(item.field_id, 455);
        assert_eq!(item.filter_id, Some(1));
        assert_eq!(item.exposure_time.value(), 30.0);
    }
}
