//! Repository layer for the task table.
//!
//! # Responsibility
//! - Define the storage contract the controller and notifier depend on.
//! - Keep SQL inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate the title before SQL mutations.
//! - Missing ids are skipped silently by update/mark-done/delete.

pub mod task_repo;
