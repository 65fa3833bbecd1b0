//! State module for tracking crawl run progress
//!
//! # Components
//!
//! - `RunPhase`: The phase a crawl run is in (seeding, dispatching, draining, ...)
//! - `StopReason`: Why the dispatch loop stopped issuing new work

mod run_phase;

// Re-export main types
pub use run_phase::{RunPhase, StopReason};
