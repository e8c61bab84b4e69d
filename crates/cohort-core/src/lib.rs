//! Core types and trait definitions for the Cohort grouping engine.
//!
//! No HTTP or database dependencies live here; every other crate in the
//! workspace builds on these types.

pub mod contact;
pub mod error;
pub mod group;
pub mod merge;
pub mod options;
pub mod store;

pub use error::{Error, Result};
