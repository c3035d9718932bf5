//! Domain logic for the stockline tools.
//!
//! Record and domain types, typed inventory shapes with their field
//! whitelists, bulk-update planning, and post-write comparison. Nothing
//! here performs I/O; the `stockline-rpc` crate feeds it server data.

pub mod error;
pub mod relation;
pub mod report;
pub mod stock;
pub mod types;
pub mod update_batch;
pub mod verification;
