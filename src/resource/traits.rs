//! Resource state-machine trait definition.

use std::fmt::Debug;

use super::state::{ResourceState, Target};
use crate::units::Mjd;

/// The physical resource stepped by the night runner.
///
/// Implementations own their clock. Every method that takes time (slewing,
/// exposing, waiting) advances `current_time` as a side effect.
///
/// # Example
///
/// ```ignore
/// use skyqueue::resource::{ResourceState, ResourceStateMachine, Target};
///
/// #[derive(Debug)]
/// struct Telescope { now: Mjd, ready: bool }
///
/// impl ResourceStateMachine for Telescope {
///     fn current_time(&self) -> Mjd { self.now }
///     fn check_if_ready(&mut self) -> bool { self.ready }
///     fn start_slew(&mut self, _target: Target) -> bool { true }
///     fn start_exposing(&mut self) -> bool { true }
///     fn set_cant_observe(&mut self) {}
///     fn wait(&mut self) { self.now = advance(self.now, Seconds::new(60.0)) }
///     fn current_state(&self) -> ResourceState { ResourceState::at(self.now) }
/// }
/// ```
pub trait ResourceStateMachine: Debug {
    /// Current time on the resource clock.
    fn current_time(&self) -> Mjd;

    /// Whether the resource can accept a new observation right now.
    fn check_if_ready(&mut self) -> bool;

    /// Slews to `target`. Returns `false` if the slew could not be performed.
    fn start_slew(&mut self, target: Target) -> bool;

    /// Takes the exposure at the current pointing. Returns `false` on failure.
    fn start_exposing(&mut self) -> bool;

    /// Marks the resource as unable to observe.
    fn set_cant_observe(&mut self);

    /// Advances the clock without observing.
    fn wait(&mut self);

    /// Snapshot used to select the next work item.
    fn current_state(&self) -> ResourceState;
}
