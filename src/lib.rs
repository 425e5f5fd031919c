//! skyqueue - meta-scheduling of competing observation queues
//!
//! A telescope night is served by several queues at once: a catch-all
//! `default` queue, optional timed queues with validity windows, and
//! target-of-opportunity override queues. The [`scheduler::QueueRegistry`]
//! keeps exactly one of them active, handles preemption and timed switching,
//! prunes dead queues, and accounts the capacity already committed to timed
//! queues. The [`runner::NightRunner`] drives a resource through the night
//! with whatever the active queue hands out.

pub mod blocks;
pub mod config;
pub mod history;
pub mod queue;
pub mod resource;
pub mod runner;
pub mod scheduler;
pub mod units;
pub mod window;

pub use units::{convert, Mjd, SameDim, Seconds};

/// Identifier type used for queues and runs.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
