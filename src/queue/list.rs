//! List-kind queue: an explicit, finite set of pending requests.

use log::debug;

use super::{ObservationQueue, QueueError, QueueKind, Request, RequestId, WorkItem};
use crate::resource::ResourceState;
use crate::window::ValidityWindow;

/// Queue holding an explicit ordered list of requests.
///
/// Work is dispatched in list order. A request with `n_repeats > 1` stays at
/// the head of the list until it has been observed that many times.
///
/// # Examples
///
/// ```
/// use skyqueue::queue::{ListQueue, ObservationQueue, Request};
/// use skyqueue::resource::{ResourceState, Target};
/// use skyqueue::units::{Mjd, Seconds};
///
/// let mut q = ListQueue::new("too_grb")
///     .as_override()
///     .with_requests(vec![Request::new(1, 2, Target::new(10.0, 20.0), Seconds::new(30.0))]);
///
/// let item = q.next_item(&ResourceState::at(Mjd::new(59000.2))).unwrap();
/// assert_eq!(item.request_id, 1);
/// assert_eq!(q.remove_requests(1), 1);
/// assert!(q.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ListQueue {
    name: String,
    window: Option<ValidityWindow>,
    is_override: bool,
    priority: i32,
    requests: Vec<Request>,
}

impl ListQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window: None,
            is_override: false,
            priority: 0,
            requests: Vec::new(),
        }
    }

    pub fn with_window(mut self, window: ValidityWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn as_override(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_requests(mut self, requests: Vec<Request>) -> Self {
        self.requests = requests;
        self
    }

    pub fn push(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

impl ObservationQueue for ListQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> QueueKind {
        QueueKind::List
    }

    fn validity_window(&self) -> Option<ValidityWindow> {
        self.window
    }

    fn is_override(&self) -> bool {
        self.is_override
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requests(&self) -> &[Request] {
        &self.requests
    }

    fn next_item(&mut self, _state: &ResourceState) -> Result<WorkItem, QueueError> {
        self.requests
            .first()
            .map(WorkItem::from)
            .ok_or_else(|| QueueError::NoEligibleWork {
                queue: self.name.clone(),
            })
    }

    fn remove_requests(&mut self, request_id: RequestId) -> usize {
        let Some(pos) = self
            .requests
            .iter()
            .position(|r| r.request_id == request_id)
        else {
            return 0;
        };

        let request = &mut self.requests[pos];
        if request.n_repeats > 1 {
            request.n_repeats -= 1;
            debug!(
                "Queue '{}': request {} has {} repeats left",
                self.name, request_id, request.n_repeats
            );
        } else {
            self.requests.remove(pos);
            debug!("Queue '{}': request {} completed", self.name, request_id);
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockGrid;
    use crate::resource::Target;
    use crate::units::{Mjd, Seconds};

    fn req(id: RequestId) -> Request {
        Request::new(id, 1, Target::new(id as f64, 0.0), Seconds::new(30.0))
    }

    fn state() -> ResourceState {
        ResourceState::at(Mjd::new(59000.2))
    }

    #[test]
    fn test_empty_queue_has_no_eligible_work() {
        let mut q = ListQueue::new("timed");
        assert_eq!(
            q.next_item(&state()),
            Err(QueueError::NoEligibleWork {
                queue: "timed".to_string()
            })
        );
    }

    #[test]
    fn test_dispatches_in_list_order() {
        let mut q = ListQueue::new("timed").with_requests(vec![req(3), req(1), req(2)]);
        assert_eq!(q.next_item(&state()).unwrap().request_id, 3);
        q.remove_requests(3);
        assert_eq!(q.next_item(&state()).unwrap().request_id, 1);
    }

    #[test]
    fn test_next_item_does_not_consume() {
        let mut q = ListQueue::new("timed").with_requests(vec![req(1)]);
        q.next_item(&state()).unwrap();
        q.next_item(&state()).unwrap();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut q = ListQueue::new("timed").with_requests(vec![req(1)]);
        assert_eq!(q.remove_requests(99), 0);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_repeats_are_decremented_before_removal() {
        let mut q = ListQueue::new("timed").with_requests(vec![req(1).with_repeats(2)]);
        assert_eq!(q.remove_requests(1), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.requests()[0].n_repeats, 1);
        assert_eq!(q.remove_requests(1), 1);
        assert!(q.is_empty());
        assert_eq!(q.remove_requests(1), 0);
    }

    #[test]
    fn test_window_drives_validity_and_blocks() {
        let window = ValidityWindow::from_mjd(59000.25, 59000.5).unwrap();
        let q = ListQueue::new("timed").with_window(window);
        assert!(!q.is_valid(Mjd::new(59000.2)));
        assert!(q.is_valid(Mjd::new(59000.3)));
        assert!(!q.is_valid(Mjd::new(59000.5)));

        let grid = BlockGrid::default();
        let blocks = q.valid_blocks(&grid, true);
        assert_eq!(blocks.clone().count(), 18);
        assert_eq!(blocks.start, 59000 * 72 + 18);
    }

    #[test]
    fn test_windowless_queue_is_always_valid() {
        let q = ListQueue::new("default");
        assert!(q.is_valid(Mjd::new(0.0)));
        assert!(q.valid_blocks(&BlockGrid::default(), false).is_empty());
    }

    #[test]
    fn test_pending_check_follows_contents() {
        let mut q = ListQueue::new("timed");
        assert!(!q.has_pending_in_window());
        q.push(req(5));
        assert!(q.has_pending_in_window());
    }
}
