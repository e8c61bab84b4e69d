//! The Cohort contact-grouping engine.
//!
//! Every grouper is a pure, synchronous function over an in-memory contact
//! list. [`generate_groups`] runs the enabled ones, deduplicates their output,
//! and caps the result; [`GroupingService`] wraps that with the contact fetch
//! and the transactional merge into a [`cohort_core::store::GroupStore`].

pub mod burst;
pub mod company;
pub mod dedup;
pub mod domain;
pub mod engine;
pub mod error;
pub mod geo;
pub mod location;
pub mod service;
pub mod temporal;

pub use engine::{GroupingOutcome, GroupingStats, generate_groups};
pub use error::ServiceError;
pub use service::{GroupingRun, GroupingService};
