//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted entity (`Task`) and the list filter.
//! - Own field-level validation shared by controller and repository.
//!
//! # Invariants
//! - Every stored task is identified by a store-assigned `TaskId`.
//! - `done` only moves from `false` to `true`.

pub mod task;
