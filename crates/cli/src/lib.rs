//! `stockline-cli` library crate.
//!
//! Holds configuration, the workflows, and report rendering so they can be
//! tested without a process. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod output;
pub mod workflows;
