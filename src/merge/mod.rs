//! Data merge engine
//!
//! Produces the record to persist from an incoming candidate record and the
//! previously persisted baseline, honoring `readOnly` and composition rules
//! declared by the schema.

mod engine;
mod options;

pub use engine::{merge, MergeEngine};
pub use options::MergeOptions;
