//! Data models for the Warehouse Seal Tracker.
//!
//! Serialized in camelCase to match the intake form's field names.

mod seal;

pub use seal::*;
