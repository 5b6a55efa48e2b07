//! Domain models for OrderDesk.
//!
//! These are the core types shared across all crates.

pub mod order;
pub mod user;
