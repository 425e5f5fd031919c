//! The exclusive resource (telescope) driven through the night.
//!
//! The scheduler never simulates the instrument itself. It talks to a
//! [`ResourceStateMachine`] collaborator that reports readiness, performs
//! slews and exposures, and advances its own clock when asked to wait.

mod state;
mod traits;

pub use state::{ResourceState, Target};
pub use traits::ResourceStateMachine;
