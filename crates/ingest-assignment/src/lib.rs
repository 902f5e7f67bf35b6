//! `ingest-assignment` — the balanced chat-to-identity solver (C4) and the
//! human-readable redistribution summary used by the reassign job.

pub mod solver;
pub mod summary;

pub use solver::{assign_balanced, Assignment};
pub use summary::{compute_loads, diff_assignments, format_assignment_summary};
