//! Weekly room allocation for class sections.
//!
//! Sections that share a subject and offering period are packed into one room when
//! possible; proposals stay pending until a reviewer approves or rejects them, and
//! approved placements survive later runs untouched.

pub mod config;
pub mod conflicts;
pub mod data;
pub mod error;
pub mod grouping;
pub mod ledger;
pub mod materializer;
pub mod server;
pub mod service;
pub mod solver;
pub mod store;
pub mod workflow;

pub use error::{Result, SchedulingError};
